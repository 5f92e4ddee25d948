//! `mastermind ask`: Answer a single question and exit.

use super::{build_judge, load_config, print_fragment, select_cards};

pub async fn run(question: String, cards: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let question = question.trim();
    if question.is_empty() {
        return Err("The question is empty.".into());
    }

    let config = load_config()?;
    let mut judge = build_judge(&config)?;
    select_cards(&mut judge, &cards).await;

    println!();
    let outcome = judge.session.handle_question(question, print_fragment).await;
    println!();
    println!();

    if outcome.is_completed() {
        Ok(())
    } else {
        Err(format!("Answer {}", outcome.status()).into())
    }
}
