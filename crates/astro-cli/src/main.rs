//! AstroGuide CLI - terminal client for the AstroGuide API
//!
//! Usage:
//!   astroguide ask <question> [--level beginner|advanced]
//!   astroguide chat [--level beginner|advanced] [--history-file <path>]

mod client;
mod history;

use astro_core::AnswerResult;
use clap::{Parser, Subcommand, ValueEnum};
use client::{display_domain, ApiClient, Conversation};
use history::{default_history_path, HistoryFile};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "astroguide")]
#[command(about = "Ask AstroGuide about space and astronomy")]
#[command(version)]
struct Cli {
    /// AstroGuide server base URL
    #[arg(
        long,
        global = true,
        env = "ASTROGUIDE_SERVER",
        default_value = "http://127.0.0.1:8000"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// Question to ask
        question: String,
        #[arg(long, value_enum, default_value_t = Level::Beginner)]
        level: Level,
    },
    /// Start an interactive conversation
    Chat {
        #[arg(long, value_enum, default_value_t = Level::Beginner)]
        level: Level,

        /// Where the conversation is saved between sessions
        #[arg(long, env = "ASTROGUIDE_HISTORY")]
        history_file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Level {
    Beginner,
    Advanced,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Advanced => "advanced",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new(cli.server);

    match cli.command {
        Commands::Ask { question, level } => {
            let request = Conversation::default().request(&question, level.as_str());
            let result = api.send_chat(&request).await?;
            print_answer(&result);
        }
        Commands::Chat {
            level,
            history_file,
        } => {
            let history = HistoryFile::new(history_file.unwrap_or_else(default_history_path));
            run_chat(&api, level, &history).await?
        }
    }

    Ok(())
}

async fn run_chat(
    api: &ApiClient,
    mut level: Level,
    history: &HistoryFile,
) -> anyhow::Result<()> {
    let mut conversation = history.load().unwrap_or_else(|e| {
        tracing::warn!("failed to load chat history: {e:#}");
        Conversation::default()
    });
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("AstroGuide ({}). /level <beginner|advanced>, /clear, /quit", level.as_str());
    if !conversation.is_empty() {
        println!(
            "Restored {} turns from {}.",
            conversation.len(),
            history.path().display()
        );
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                println!("Cleared {} turns.", conversation.len());
                conversation.clear();
                if let Err(e) = history.remove() {
                    tracing::warn!("failed to clear chat history: {e:#}");
                }
                continue;
            }
            _ => {}
        }

        if let Some(arg) = input.strip_prefix("/level") {
            match Level::from_str(arg.trim(), true) {
                Ok(new_level) => {
                    level = new_level;
                    println!("Level set to {}.", level.as_str());
                }
                Err(_) => println!("Unknown level, use beginner or advanced."),
            }
            continue;
        }

        let request = conversation.request(input, level.as_str());
        match api.send_chat(&request).await {
            Ok(result) => {
                print_answer(&result);
                conversation.record(input, &result.answer);
                if let Err(e) = history.save(&conversation) {
                    tracing::warn!("failed to save chat history: {e:#}");
                }
            }
            Err(e) => eprintln!("Error contacting AstroGuide backend: {e:#}"),
        }
    }

    Ok(())
}

fn print_answer(result: &AnswerResult) {
    println!("\n{}\n", result.answer);

    if !result.sources.is_empty() {
        println!("Sources:");
        for source in &result.sources {
            println!("  - {} ({})", display_domain(source), source);
        }
        println!();
    }
}
