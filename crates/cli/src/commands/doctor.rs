//! `mastermind doctor`: Diagnose configuration and connectivity.

use mastermind_agent::RuleCorpusIndex;
use mastermind_config::AppConfig;
use mastermind_core::card::CardDataProvider;
use mastermind_core::provider::Provider;
use mastermind_providers::ScryfallClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Mastermind Doctor — System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `mastermind onboard`)");
        issues += 1;
    }
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config loaded");
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  Fix the config file and run doctor again.");
            return Ok(());
        }
    };

    // Check API key
    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured — set MASTERMIND_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    // Check rules corpus
    match RuleCorpusIndex::try_load(&config.grounding.rules_path) {
        Ok(corpus) if corpus.is_empty() => {
            println!("  ⚠️  Rules corpus is empty: {}", config.grounding.rules_path.display());
            issues += 1;
        }
        Ok(corpus) => println!("  ✅ Rules corpus loaded ({} lines)", corpus.len()),
        Err(e) => {
            println!("  ⚠️  {e}");
            println!("      Answers will have no Comprehensive Rules excerpts.");
            issues += 1;
        }
    }

    // Check card database
    let client = ScryfallClient::from_config(&config.card_data);
    match client.card_by_name("Blood Moon").await {
        Ok(_) => println!("  ✅ Card database reachable ({})", config.card_data.base_url),
        Err(e) => {
            println!("  ❌ Card database: {e}");
            issues += 1;
        }
    }

    // Check completion provider
    let router = mastermind_providers::router::build_from_config(&config);
    match router.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ❌ Provider '{}' is not responding", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}': {e}", provider.name());
                issues += 1;
            }
        },
        None => {
            println!("  ❌ No default provider configured");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
