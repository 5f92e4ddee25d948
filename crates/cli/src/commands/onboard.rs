//! `mastermind onboard`: First-time setup.

use mastermind_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🧙 Mastermind — First-Time Setup");
    println!("================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !config_path.exists() {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config file: {}", config_path.display());
    } else {
        println!("  Config file exists: {}", config_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  1. Set your API key: export DEEPSEEK_API_KEY='sk-...'");
    println!("  2. Download the Comprehensive Rules as plain text from");
    println!("     https://magic.wizards.com/en/rules and save it as rules.txt");
    println!("     (or set grounding.rules_path in the config file)");
    println!("  3. Check the setup: mastermind doctor");
    println!("  4. Ask away: mastermind ask \"Does Blood Moon affect Urborg?\" -c \"Blood Moon\"");
    println!();

    Ok(())
}
