mod cli;

use clap::Parser;
use cli::{Cli, Command};
use rollcall::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never land in the middle of a prompt
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let dir = Config::data_dir()?;
    let cfg = Config::load_from(&dir)?;

    match cli.command {
        None | Some(Command::Run) => cli::run::run(&dir, &cfg),
        Some(Command::Init) => cli::init::run(&dir, &cfg),
        Some(Command::Status) => cli::status::run(&dir, &cfg),
    }
}
