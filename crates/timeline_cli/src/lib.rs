//! Command-line collaborator: username batch, fixed delay, CSV export.
mod args;
mod batch;
mod config;
mod output;

use std::io;
use std::time::Duration;

use engine_logging::{engine_warn, LogDestination};
use log::LevelFilter;
use timeline_engine::LogProgressSink;

pub use args::Args;
pub use batch::{read_usernames, run_batch, BatchReport};
pub use config::load_config;
pub use output::{write_csv, write_csv_file, OutputError};

pub async fn run(args: Args) -> anyhow::Result<()> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level);

    let config = load_config(args.config.as_deref())?;
    let usernames = match (&args.username, &args.users_file) {
        (Some(username), _) => vec![username.clone()],
        (None, Some(path)) => read_usernames(path)?,
        (None, None) => anyhow::bail!("either --username or --users-file is required"),
    };

    let report = run_batch(
        &config,
        &usernames,
        Duration::from_secs(args.delay_secs),
        &LogProgressSink,
    )
    .await;

    if report.posts.is_empty() {
        engine_warn!(
            "No posts collected ({} of {} usernames failed)",
            report.failures.len(),
            usernames.len()
        );
        return Ok(());
    }

    match &args.output {
        Some(path) => write_csv_file(path, &report.posts)?,
        None => write_csv(io::stdout().lock(), &report.posts)?,
    }
    Ok(())
}
