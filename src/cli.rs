use clap::Parser;
use std::path::PathBuf;

use zipline::humanize::HumanDuration;

#[derive(Parser, Debug)]
#[command(name = "zipline")]
#[command(version, about = "Expand .zip directives into file and URL excerpts", long_about = None)]
pub struct Cli {
    /// Document to process (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to $ZIPLINE_CONFIG, then zipline.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum simultaneous remote fetches (0 = unlimited)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Minimum delay after each remote admission, e.g. 200ms or 1s
    #[arg(long)]
    pub min_interval: Option<HumanDuration>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Name used in diagnostics and as the base for relative targets.
    pub fn source_name(&self) -> String {
        match &self.input {
            Some(path) => path.to_string_lossy().into_owned(),
            None => "<stdin>".to_string(),
        }
    }
}
