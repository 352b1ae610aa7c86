//! Timeline engine: credential discovery, session transport and the paginated harvest.
mod config;
mod decode;
mod discover;
mod envelope;
mod extract;
mod harvest;
mod pipeline;
mod progress;
mod transport;
mod types;

pub use config::{ConfigError, Endpoints, HarvestConfig, Operations, QueryConfig, TransportSettings};
pub use decode::{decode_body, DecodeError};
pub use discover::Discoverer;
pub use envelope::page_records;
pub use extract::{exactly_one, extract, script_bundle_urls, Pattern};
pub use harvest::{Harvester, PageSource, TimelinePages};
pub use pipeline::harvest_user;
pub use progress::{HarvestEvent, LogProgressSink, NullProgressSink, ProgressSink};
pub use transport::{ApiRequest, Method, ReqwestTransport, Transport};
pub use types::{
    CredentialBundle, DiscoveryError, DiscoveryReason, FailureKind, HarvestError, TransportError,
};
