use stderrlog::{LogLevelNum, Timestamp};

/// Logging arg group, shared by every subcommand.
///
/// Progress is logged at `info` by default; each `-v` raises the level.
#[derive(clap::Args, Debug, Default)]
pub struct LogArgs {
    /// Silence all log output.
    #[clap(short, long)]
    pub quiet: bool,

    /// More detail: -v for epoch summaries, -vv for every skipped example.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prefix log lines with a timestamp.
    #[clap(short, long)]
    pub ts: bool,
}

impl LogArgs {
    /// The stderr log level selected by `-v`.
    pub fn level(&self) -> LogLevelNum {
        match self.verbose {
            0 => LogLevelNum::Info,
            1 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        }
    }

    /// Install the stderr logger.
    pub fn init(&self) -> Result<(), Box<dyn std::error::Error>> {
        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(self.level())
            .show_module_names(self.verbose > 0)
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;
        Ok(())
    }
}
