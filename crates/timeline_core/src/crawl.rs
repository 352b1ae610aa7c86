use crate::{RawRecord, RecordSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Fetching,
    Converged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// A page added no identifiers that were not already collected.
    Converged,
    /// The configured page limit was reached before convergence.
    PageLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Records found on the page that was just fetched.
    PageLoaded { records: Vec<RawRecord> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the page after the one just loaded, using its bottom cursor.
    RequestNextPage,
    Finish { reason: FinishReason },
}

/// Accumulated state of one timeline crawl.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlState {
    phase: Phase,
    records: RecordSet,
    pages_loaded: usize,
    page_limit: Option<usize>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A crawl that stops after `limit` pages even if it has not converged.
    pub fn with_page_limit(limit: usize) -> Self {
        Self {
            page_limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn into_records(self) -> RecordSet {
        self.records
    }
}

/// Pure update function: applies a loaded page to the crawl and returns what to do next.
///
/// The first page always seeds the set and asks for a second page. From then
/// on a page that contributes no unseen identifier ends the crawl; repeating a
/// page therefore converges instead of looping.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Effect) {
    if state.phase == Phase::Converged {
        return (
            state,
            Effect::Finish {
                reason: FinishReason::Converged,
            },
        );
    }

    let effect = match msg {
        Msg::PageLoaded { records } => {
            let first_page = state.pages_loaded == 0;
            state.pages_loaded += 1;

            if !first_page && state.records.count_new(&records) == 0 {
                state.phase = Phase::Converged;
                return (
                    state,
                    Effect::Finish {
                        reason: FinishReason::Converged,
                    },
                );
            }

            for record in records {
                state.records.insert(record);
            }

            match state.page_limit {
                Some(limit) if state.pages_loaded >= limit => {
                    state.phase = Phase::Converged;
                    Effect::Finish {
                        reason: FinishReason::PageLimit,
                    }
                }
                _ => Effect::RequestNextPage,
            }
        }
    };

    (state, effect)
}
