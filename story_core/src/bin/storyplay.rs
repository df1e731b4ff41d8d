//! Terminal front end: play a scripted story, saving progress on exit.
//!
//! ```text
//! storyplay <story.toml|story.json> [--config <player.toml>]
//! ```
//!
//! Enter a choice number to choose, `r` to restart, `q` to save and quit.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use story_core::{
    FileEngineProvider, Phase, PlayerConfig, PlayerError, StoryEvent, StorySession,
};
use story_model::StoryEntry;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Play a scripted story in the terminal.
#[derive(Parser, Debug)]
#[command(name = "storyplay", version)]
struct Args {
    /// Story script (.toml or .json)
    story_file: PathBuf,

    /// Player configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

enum Command {
    Choose(usize),
    Restart,
    Quit,
    Unknown,
}

fn parse_command(input: &str) -> Command {
    match input.trim() {
        "q" | "quit" => Command::Quit,
        "r" | "restart" => Command::Restart,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Command::Choose(n - 1),
            _ => Command::Unknown,
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "storyplay failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), PlayerError> {
    let config = match &args.config {
        Some(path) => PlayerConfig::from_file(path)?,
        None => PlayerConfig::default(),
    };
    let entry = StoryEntry::new(args.story_file);
    let session = StorySession::new(entry, config, Arc::new(FileEngineProvider::new()));

    session.load().await?;
    for line in &session.snapshot().await.lines {
        println!("{}", line);
    }

    session.events().subscribe(|event| match event {
        StoryEvent::LineAdded(line) => println!("{}", line),
        StoryEvent::LinesCleared => println!("\n* * *\n"),
        _ => {}
    });

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let snapshot = session.snapshot().await;
        match snapshot.phase {
            Phase::Choosing => {
                println!();
                for choice in &snapshot.choices {
                    println!("  {}. {}", choice.index + 1, choice.text);
                }
            }
            _ => println!("\n(The End. r to restart, q to quit.)"),
        }

        let Some(text) = input
            .next_line()
            .await
            .map_err(|e| PlayerError::io("<stdin>", e))?
        else {
            break;
        };

        let result = match parse_command(&text) {
            Command::Quit => break,
            Command::Restart => session.restart(),
            Command::Choose(index) => session.choose(index),
            Command::Unknown => {
                println!("Enter a choice number, r, or q.");
                Ok(())
            }
        };
        if let Err(e) = result {
            match e {
                PlayerError::InvalidChoice { .. } | PlayerError::NotChoosing => {
                    println!("{}", e)
                }
                other => return Err(other),
            }
        }
    }

    session.close().await
}
