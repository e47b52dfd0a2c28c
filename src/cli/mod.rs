pub mod init;
pub mod run;
pub mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rollcall::config::Config;
use rollcall::term::{ConsoleTerminal, PlainTerminal, Terminal};

#[derive(Parser)]
#[command(name = "rollcall", about = "Menu-driven record keeping in the terminal.")]
#[command(version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open the interactive menu (default)
    Run,

    /// Walk through the first-run setup guide now
    Init,

    /// Show where data lives, how many accounts exist, and setup progress
    Status,
}

/// Run `f` against the best terminal available: interactive prompts on a
/// TTY, plain line reads when input or output is redirected.
pub fn with_terminal<T>(
    cfg: &Config,
    f: impl FnOnce(&mut dyn Terminal) -> Result<T>,
) -> Result<T> {
    if atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stdin) {
        let mut term = ConsoleTerminal::new(cfg.clear_screen);
        f(&mut term)
    } else {
        let mut term = PlainTerminal::stdio();
        f(&mut term)
    }
}
