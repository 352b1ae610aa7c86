//! Timeline core: pure record bookkeeping, crawl state machine and normalization.
mod crawl;
mod normalize;
mod record;

pub use crawl::{update, CrawlState, Effect, FinishReason, Msg, Phase};
pub use normalize::{MalformedRecordError, NormalizedPost, Normalizer, Sensitivity};
pub use record::{RawRecord, RecordSet, AUTHOR_ID_FIELD, ID_FIELD, TEXT_FIELD};
