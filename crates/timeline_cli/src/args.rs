use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "timeline-harvester",
    version,
    about = "Collect the public posts of one or more users into CSV"
)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["username", "users_file"])
))]
pub struct Args {
    /// Username whose posts are collected.
    #[arg(long)]
    pub username: Option<String>,

    /// File with one username per line.
    #[arg(long, value_name = "FILE")]
    pub users_file: Option<PathBuf>,

    /// CSV destination; written to stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// RON file overriding the default harvest configuration.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pause between two usernames.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub delay_secs: u64,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
