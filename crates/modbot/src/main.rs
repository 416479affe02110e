//! `modbot` - chat moderation bot driven from the terminal.
//!
//! Reads one message per line from stdin, runs it through the report and
//! review dialogues and prints the bot's replies.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod console;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::{Console, Input, USAGE, parse_line};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modbot=debug,modbot_core=debug,modbot_scoring=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting modbot");

    let path = config::path_from_args(std::env::args().skip(1));
    let config = config::load(path.as_deref()).await?;
    let classifiers = config.classifiers()?;
    info!(
        guild = config.guild_id,
        mod_channel = %config.mod_channel,
        classifiers = classifiers.len(),
        "Configuration loaded"
    );

    let mut console = Console::new(&config, classifiers);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{USAGE}");

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(input) = parse_line(&line) else {
            println!("{USAGE}");
            continue;
        };
        if input == Input::Quit {
            break;
        }
        for out in console.handle(input).await {
            println!("{out}");
        }
    }

    info!("Shutting down");
    Ok(())
}
