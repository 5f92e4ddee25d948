//! Built-in grounding data: persona, answer guidelines, keyword vocabulary,
//! and the curated special-case rulings.

use std::collections::BTreeMap;

pub const PERSONA: &str = "Monster Magic Mastermind";

pub const GUIDELINES: &str = "\
1. Open with a short, friendly compliment about the tricky question. Sound like a friend who knows the rules inside out and loves talking about them.
2. Give a short, clear answer first.
3. Explain briefly and clearly how you arrived at the answer.
4. Cite Comprehensive Rules (CR) numbers where possible and quote the relevant rule text when it adds clarity.
5. Explain the layer system when the question involves type or characteristic changes.
6. Finish by asking whether anything about the original question is still unclear.
7. Always write card names in English.
8. Answer in German, using the official German terms from the vocabulary.";

pub const VOCABULARY: &str = "\
Official German translations of English keywords:
- Deathtouch -> Todesberührung
- Defender -> Verteidiger
- Double Strike -> Doppelschlag
- Enchant -> Verzaubern
- Equip -> Ausrüsten
- First Strike -> Erstschlag
- Flash -> Aufblitzen
- Flying -> Flugfähigkeit
- Haste -> Eile
- Hexproof -> Fluchsicher
- Indestructible -> Unzerstörbar
- Lifelink -> Lebensverknüpfung
- Menace -> Bedrohlichkeit
- Reach -> Reichweite
- Trample -> Trampelschaden
- Vigilance -> Wachsamkeit
- Ward -> Beschneidung
- Attach -> Anlegen
- Counter (Spell) -> Neutralisieren
- Counter (+1/+1) -> Marke
- Exile -> Ins Exil schicken
- Fight -> Kämpfen
- Mill -> Millen
- Sacrifice -> Opfern
- Scry -> Hellsicht
- Surveil -> Überwachen
- Tap / Untap -> Tappen / Enttappen
- Battlefield -> Spielfeld
- Graveyard -> Friedhof
- Library -> Bibliothek
- Stack -> Stapel
- Instant -> Spontanzauber
- Sorcery -> Hexerei
- Creature -> Kreatur
- Enchantment -> Verzauberung
- Artifact -> Artefakt
- Dredge -> Ausgraben
- Kicker -> Bonus
- Convoke -> Einberufen
- Prowess -> Bravour
- Phasing -> Instabilität
- Cascade -> Kaskade
- Delve -> Wühlen
- Cycling -> Umwandlung";

/// Cards whose interactions are commonly misjudged, keyed by exact English name.
pub fn special_cases() -> BTreeMap<String, String> {
    [
        (
            "Omo, Queen of Vesuva",
            "Omo's ability is a static ability that only works while Omo is on the battlefield. \
             Once Omo leaves the battlefield, everything counters stop having any effect. The \
             counters physically stay on the permanents, but those lands and creatures \
             immediately lose every additional type Omo granted them (rule 611.3b).",
        ),
        (
            "Blood Moon",
            "Nonbasic lands become Mountains. They lose all their printed abilities and only \
             have '{T}: Add {R}'. They keep their names and supertypes, so a legendary land \
             stays legendary.",
        ),
        (
            "Grist, the Hunger Tide",
            "In every zone other than the battlefield Grist is a 1/1 Insect creature. It can be \
             searched for with cards like Chord of Calling or returned from the graveyard with \
             Raise Dead. Only on the battlefield is it a planeswalker.",
        ),
        (
            "Yedora, Grave Gardener",
            "Creatures returned face down by Yedora are face-down Forest lands only. They have \
             no name, no mana cost and no creature types. They are not creature lands, just \
             lands.",
        ),
        (
            "Pithing Needle",
            "Pithing Needle only stops ACTIVATED abilities (cost: effect). It does not stop \
             static abilities (such as 'creatures get +1/+1') and does not stop triggered \
             abilities (those starting with 'When', 'Whenever' or 'At').",
        ),
        (
            "Humility",
            "Humility makes all creatures 1/1 and removes all their abilities. This is a layer 6 \
             effect (abilities) and a layer 7b effect (power/toughness). In interactions with \
             cards like Magus of the Moon, timestamp order decides.",
        ),
        (
            "Obeka, Brute Chronologist",
            "Ending the turn removes all spells and abilities from the stack. Effects lasting \
             'until end of turn' still only end in the cleanup step. Abilities that trigger 'at \
             the beginning of the next end step' are skipped if the turn is ended before it.",
        ),
    ]
    .into_iter()
    .map(|(name, text)| (name.to_string(), text.to_string()))
    .collect()
}
