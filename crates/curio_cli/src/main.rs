//! Command-line replay of batch list edits.

mod replay;
mod script;
mod store;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use curio_core::constants::DEFAULT_LOG_FILTER;
use curio_core::Config;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "curio", about = "Curio list editing CLI", version)]
struct Cli {
    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Apply an edit script (select/move/delete/clear/reset/commit) to a JSON list
    Replay {
        /// JSON array of objects; rewritten in place on commit
        #[arg(short, long)]
        list: PathBuf,
        /// Script file, one operation per line; stdin when omitted
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Commit after the last scripted step
        #[arg(long)]
        commit: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_script(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read script from stdin")?;
            Ok(buffer)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let Cli { json, command } = Cli::parse();

    match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
        Commands::Replay {
            list,
            script,
            commit,
        } => {
            let script = read_script(script.as_deref())?;
            let config = Config::from_env();
            let report = replay::replay(&list, &script, commit, &config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            } else {
                print!("{}", report.to_text());
            }
        }
    }
    Ok(())
}
