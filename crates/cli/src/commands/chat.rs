//! `mastermind chat`: Interactive judge session.
//!
//! Lines starting with `/` manage the card selection; everything else is a
//! question. Ctrl+C while an answer is requested or streaming stops that
//! answer only.

use super::{Judge, build_judge, load_config, print_fragment, select_cards};
use futures::StreamExt;
use mastermind_core::card::CardDataProvider;
use mastermind_core::message::Role;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(cards: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let mut judge = build_judge(&config)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       Monster Magic Mastermind — Judge       ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Rules:     {}", config.grounding.rules_path.display());
    println!();
    println!("  Ask a rules question and press Enter.");
    println!("  /add <card>, /remove <n>, /cards, /search <text>, /history");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    select_cards(&mut judge, &cards).await;

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        if let Some(command) = line.strip_prefix('/') {
            run_command(&mut judge, command).await;
        } else {
            answer(&mut judge, line).await;
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

async fn answer(judge: &mut Judge, question: &str) {
    println!();
    let mut stream = tokio::select! {
        stream = judge.session.ask(question) => stream,
        _ = tokio::signal::ctrl_c() => {
            // Dropping the request commits the interrupted answer
            println!();
            eprintln!("  [cancelled]");
            println!();
            return;
        }
    };
    loop {
        tokio::select! {
            fragment = stream.next() => match fragment {
                Some(fragment) => print_fragment(&fragment),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    // Commits the partial answer if Ctrl+C ended the loop
    let outcome = stream.cancel();
    println!();
    if !outcome.is_completed() {
        eprintln!("  [{}]", outcome.status());
    }
    println!();
}

async fn run_command(judge: &mut Judge, command: &str) {
    let (name, arg) = command
        .split_once(' ')
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    match name {
        "add" if !arg.is_empty() => select_cards(judge, &[arg.to_string()]).await,
        "remove" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => match judge.session.selection_mut().remove(n - 1) {
                Some(card) => println!("  Removed {}", card.name),
                None => println!("  No card #{n}"),
            },
            _ => println!("  Usage: /remove <number from /cards>"),
        },
        "cards" => {
            let cards = judge.session.selected_cards();
            if cards.is_empty() {
                println!("  No cards selected.");
            }
            for (i, card) in cards.iter().enumerate() {
                println!("  {}. {}", i + 1, card.name);
            }
        }
        "search" if !arg.is_empty() => match judge.cards.autocomplete(arg).await {
            Ok(names) if names.is_empty() => println!("  No suggestions."),
            Ok(names) => {
                for name in names {
                    println!("  - {name}");
                }
            }
            Err(e) => eprintln!("  ⚠️  Search failed: {e}"),
        },
        "history" => {
            for message in judge.session.current_history() {
                let who = match message.role {
                    Role::User => "You",
                    Role::Assistant => "Mastermind",
                    Role::System => "System",
                };
                let first_line = message.content.lines().next().unwrap_or_default();
                println!("  #{} {who}: {first_line}", message.sequence);
            }
        }
        _ => println!("  Unknown command. Try /add, /remove, /cards, /search or /history."),
    }
}
