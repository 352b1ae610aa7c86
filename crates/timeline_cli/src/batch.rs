use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use timeline_core::NormalizedPost;
use timeline_engine::{harvest_user, HarvestConfig, HarvestError, ProgressSink, ReqwestTransport};

#[derive(Debug, Default)]
pub struct BatchReport {
    pub posts: Vec<NormalizedPost>,
    pub failures: Vec<(String, HarvestError)>,
}

/// Usernames from a file, one per line; blank lines are skipped.
pub fn read_usernames(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}

/// Harvest each username in turn, sleeping `delay` between them.
///
/// Every username gets its own transport. A failure is logged and recorded,
/// and the batch moves on to the next username.
pub async fn run_batch(
    config: &HarvestConfig,
    usernames: &[String],
    delay: Duration,
    sink: &dyn ProgressSink,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, username) in usernames.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            engine_info!("Sleeping {}s to avoid rate limit", delay.as_secs());
            tokio::time::sleep(delay).await;
        }

        engine_info!("Getting posts for {}", username);
        let result = match ReqwestTransport::new(config.transport.clone()) {
            Ok(transport) => harvest_user(&transport, config, username, sink).await,
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(posts) => {
                engine_info!("{}: collected {} posts", username, posts.len());
                report.posts.extend(posts);
            }
            Err(err) => {
                engine_error!("Failed to get posts for {}: {}", username, err);
                report.failures.push((username.clone(), err));
            }
        }
    }

    report
}
