use engine_logging::engine_warn;
use timeline_core::{NormalizedPost, Normalizer};

use crate::{
    Discoverer, Harvester, HarvestConfig, HarvestError, HarvestEvent, ProgressSink,
    TimelinePages, Transport,
};

/// Discover credentials for `username`, crawl the timeline and normalize the result.
///
/// `transport` should be fresh for this username; sessions are never shared.
/// Records that fail normalization are logged and dropped; every other failure
/// aborts this username and nothing partial is returned.
pub async fn harvest_user(
    transport: &dyn Transport,
    config: &HarvestConfig,
    username: &str,
    sink: &dyn ProgressSink,
) -> Result<Vec<NormalizedPost>, HarvestError> {
    config.validate()?;

    let bundle = Discoverer::new(transport, config).discover(username).await?;
    sink.emit(HarvestEvent::CredentialsDiscovered {
        username: username.to_string(),
        user_id: bundle.user_id.clone(),
        declared_posts: bundle.declared_post_count,
    });

    let pages = TimelinePages::new(transport, config, &bundle);
    let records = Harvester::new(&pages, sink)
        .with_page_limit(config.page_limit)
        .harvest(username, &bundle)
        .await?;

    let normalizer = Normalizer::new(&config.endpoints.site_base, username);
    let posts = records
        .iter()
        .filter_map(|record| match normalizer.normalize(record) {
            Ok(post) => Some(post),
            Err(err) => {
                engine_warn!("{}: dropping record: {}", username, err);
                None
            }
        })
        .collect();
    Ok(posts)
}
