use engine_logging::{engine_debug, engine_info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    CredentialsDiscovered {
        username: String,
        user_id: String,
        declared_posts: u64,
    },
    PageFetched {
        username: String,
        page: usize,
        accumulated: usize,
        declared_posts: u64,
    },
    Finished {
        username: String,
        pages: usize,
        kept: usize,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: HarvestEvent) {}
}

/// Writes events to the global logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::CredentialsDiscovered {
                username,
                user_id,
                declared_posts,
            } => {
                engine_info!(
                    "Discovered credentials for {} (user id {}, {} posts declared)",
                    username,
                    user_id,
                    declared_posts
                );
            }
            HarvestEvent::PageFetched {
                username,
                page,
                accumulated,
                declared_posts,
            } => {
                engine_debug!(
                    "{}: page {} -> {} / {}",
                    username,
                    page,
                    accumulated,
                    declared_posts
                );
            }
            HarvestEvent::Finished {
                username,
                pages,
                kept,
            } => {
                engine_info!("{}: {} posts kept after {} pages", username, kept, pages);
            }
        }
    }
}
