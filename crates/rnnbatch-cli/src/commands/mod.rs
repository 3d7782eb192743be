use crate::commands::{batches::BatchesArgs, windows::WindowsArgs};

pub mod batches;
pub mod windows;

/// Subcommands for rnnbatch
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Stream training batches, writing one JSON summary line per batch.
    Batches(BatchesArgs),

    /// Report the window index of a corpus, and its train/validation split.
    Windows(WindowsArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Batches(cmd) => cmd.run(),
            Commands::Windows(cmd) => cmd.run(),
        }
    }
}
