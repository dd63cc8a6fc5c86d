use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "grabbot")]
#[command(author, version, about = "Telegram bot that downloads videos from links and keeps its download folder clean", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Sweep the download folder once and exit
    Sweep {
        /// Only show what would be deleted without actually deleting it
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run; no subcommand means `run`
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Run)
    }
}
