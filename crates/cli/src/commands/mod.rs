//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod card;
pub mod chat;
pub mod doctor;
pub mod onboard;

use mastermind_agent::{
    ContextAssembler, JudgeSession, RuleCorpusIndex, RulingsCache, SpecialCaseRegistry,
    StreamingResponder, StyleGuide,
};
use mastermind_config::AppConfig;
use mastermind_core::card::CardDataProvider;
use mastermind_providers::ScryfallClient;
use std::io::Write;
use std::sync::Arc;

/// A ready session plus the card database it grounds against.
pub struct Judge {
    pub session: JudgeSession,
    pub cards: Arc<dyn CardDataProvider>,
}

/// Load config and fail early, with setup instructions, if no key is set.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Local servers accept any key
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    MASTERMIND_API_KEY = 'sk-...'   (generic)");
        eprintln!("    DEEPSEEK_API_KEY   = 'sk-...'   (default provider)");
        eprintln!("    OPENAI_API_KEY     = 'sk-...'   (with MASTERMIND_PROVIDER=openai)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}

/// Wire the grounding sources and the provider from config.
pub fn build_judge(config: &AppConfig) -> Result<Judge, Box<dyn std::error::Error>> {
    let router = mastermind_providers::router::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;

    let cards: Arc<dyn CardDataProvider> = Arc::new(ScryfallClient::from_config(&config.card_data));
    let rulings = Arc::new(RulingsCache::new(cards.clone(), config.card_data.rulings_ttl()));
    let corpus = Arc::new(RuleCorpusIndex::load(&config.grounding.rules_path));
    let special_cases = Arc::new(SpecialCaseRegistry::from_pairs(
        config.grounding.special_cases.clone(),
    ));

    let assembler = ContextAssembler::new(rulings, corpus, special_cases)
        .with_style(StyleGuide::from_config(&config.grounding))
        .with_snippet_limit(config.grounding.snippet_limit);
    let responder = StreamingResponder::new(provider, &config.default_model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);

    Ok(Judge {
        session: JudgeSession::new(Arc::new(assembler), Arc::new(responder)),
        cards,
    })
}

/// Select each named card, reporting lookups that fail.
pub async fn select_cards(judge: &mut Judge, names: &[String]) {
    for name in names {
        match judge
            .session
            .selection_mut()
            .add_by_name(judge.cards.as_ref(), name)
            .await
        {
            Ok(true) => println!("  ✅ Selected {name}"),
            Ok(false) => println!("  ℹ️  {name} is already selected"),
            Err(e) => eprintln!("  ⚠️  Could not select {name}: {e}"),
        }
    }
}

/// Print a streamed fragment immediately.
pub fn print_fragment(fragment: &str) {
    print!("{fragment}");
    let _ = std::io::stdout().flush();
}
