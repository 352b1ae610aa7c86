use engine_logging::{engine_debug, engine_warn};
use timeline_core::{update, CrawlState, Effect, FinishReason, Msg, RawRecord};

use crate::{
    exactly_one, extract, page_records, ApiRequest, CredentialBundle, HarvestConfig,
    HarvestError, HarvestEvent, Pattern, ProgressSink, Transport, TransportError,
};

/// Source of raw timeline pages; `None` asks for the first page.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<String, TransportError>;
}

/// Timeline pages of one user, fetched through the discovered operation.
pub struct TimelinePages<'a> {
    transport: &'a dyn Transport,
    config: &'a HarvestConfig,
    bundle: &'a CredentialBundle,
}

impl<'a> TimelinePages<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        config: &'a HarvestConfig,
        bundle: &'a CredentialBundle,
    ) -> Self {
        Self {
            transport,
            config,
            bundle,
        }
    }
}

#[async_trait::async_trait]
impl PageSource for TimelinePages<'_> {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<String, TransportError> {
        let url = self.config.endpoints.operation_url(
            &self.bundle.timeline_operation_id,
            &self.config.operations.timeline,
        );
        let query = &self.config.query;
        let request = ApiRequest::get(url)
            .headers(self.bundle.session_headers())
            .query(
                "variables",
                query.timeline_variables_json(&self.bundle.user_id, cursor),
            )
            .query("features", query.features_json());
        self.transport.call(&request).await
    }
}

/// Drives the crawl state machine over a [`PageSource`] until it converges.
pub struct Harvester<'a> {
    source: &'a dyn PageSource,
    sink: &'a dyn ProgressSink,
    page_limit: Option<usize>,
}

impl<'a> Harvester<'a> {
    pub fn new(source: &'a dyn PageSource, sink: &'a dyn ProgressSink) -> Self {
        Self {
            source,
            sink,
            page_limit: None,
        }
    }

    pub fn with_page_limit(mut self, limit: Option<usize>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Records authored by `bundle.user_id` that carry full text.
    ///
    /// Each request after the first uses the bottom cursor of the page before
    /// it. Transport failures abort the harvest; nothing is retried.
    pub async fn harvest(
        &self,
        username: &str,
        bundle: &CredentialBundle,
    ) -> Result<Vec<RawRecord>, HarvestError> {
        let mut state = match self.page_limit {
            Some(limit) => CrawlState::with_page_limit(limit),
            None => CrawlState::new(),
        };
        let mut text = self.source.fetch_page(None).await?;

        loop {
            let page = state.pages_loaded() + 1;
            let records = page_records(&text).map_err(|err| HarvestError::InvalidPage {
                page,
                message: err.to_string(),
            })?;
            engine_debug!("{}: page {} carried {} records", username, page, records.len());

            let (next, effect) = update(state, Msg::PageLoaded { records });
            state = next;
            self.sink.emit(HarvestEvent::PageFetched {
                username: username.to_string(),
                page,
                accumulated: state.records().len(),
                declared_posts: bundle.declared_post_count,
            });

            match effect {
                Effect::RequestNextPage => {
                    let cursor = exactly_one(extract(Pattern::Cursor, &text))
                        .map_err(|matches| HarvestError::MissingCursor { page, matches })?;
                    text = self.source.fetch_page(Some(&cursor)).await?;
                }
                Effect::Finish { reason } => {
                    if reason == FinishReason::PageLimit {
                        engine_warn!(
                            "{}: stopped at page limit {} before the timeline converged",
                            username,
                            page
                        );
                    }
                    break;
                }
            }
        }

        let pages = state.pages_loaded();
        let kept = state.into_records().into_authored_by(&bundle.user_id);
        self.sink.emit(HarvestEvent::Finished {
            username: username.to_string(),
            pages,
            kept: kept.len(),
        });
        Ok(kept)
    }
}
