//! `mastermind card`: Card lookup without asking a question.

use mastermind_agent::context::rulings::format_rulings;
use mastermind_config::AppConfig;
use mastermind_core::card::CardDataProvider;
use mastermind_providers::ScryfallClient;

pub async fn run(name: String, suggest: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let client = ScryfallClient::from_config(&config.card_data);

    if suggest {
        let names = client.autocomplete(&name).await?;
        if names.is_empty() {
            println!("  No suggestions (queries need at least 3 characters).");
        }
        for name in names {
            println!("  - {name}");
        }
        return Ok(());
    }

    let card = client.card_by_name(&name).await?;
    let rulings = client.rulings(&card.id).await?;

    println!();
    println!("  {}", card.name);
    println!("  {}", "─".repeat(card.name.chars().count()));
    for line in card.oracle_text.lines() {
        println!("  {line}");
    }
    if !card.canonical_url.is_empty() {
        println!();
        println!("  {}", card.canonical_url);
    }
    println!();
    println!("  Rulings:");
    for line in format_rulings(&rulings).lines() {
        println!("  {line}");
    }
    if let Some(text) = config.grounding.special_cases.get(&card.name) {
        println!();
        println!("  Special rule:");
        println!("  {text}");
    }
    println!();

    Ok(())
}
