use std::fmt;

use thiserror::Error;

use crate::ConfigError;

/// Everything needed to call the timeline operation anonymously for one user.
///
/// Assembled once per username and never shared between usernames.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_token: String,
    pub timeline_operation_id: String,
    pub profile_operation_id: String,
    pub user_id: String,
    pub declared_post_count: u64,
    pub guest_token: String,
}

impl CredentialBundle {
    /// Headers for calls that need both the access token and the guest session.
    pub fn session_headers(&self) -> Vec<(String, String)> {
        vec![
            bearer_header(&self.access_token),
            ("x-guest-token".to_string(), self.guest_token.clone()),
        ]
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("access_token", &"<redacted>")
            .field("timeline_operation_id", &self.timeline_operation_id)
            .field("profile_operation_id", &self.profile_operation_id)
            .field("user_id", &self.user_id)
            .field("declared_post_count", &self.declared_post_count)
            .field("guest_token", &"<redacted>")
            .finish()
    }
}

pub(crate) fn bearer_header(token: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {token}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A single failed call. The transport never retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("request to {url} failed: {kind}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub url: String,
    /// Response body when the server answered, otherwise the client's error message.
    pub body: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryReason {
    NoBearerToken,
    NoTimelineOperationId,
    NoProfileOperationId,
    NoUserId,
    NoPostCount,
    NoGuestToken,
}

impl fmt::Display for DiscoveryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiscoveryReason::NoBearerToken => "no bearer token",
            DiscoveryReason::NoTimelineOperationId => "no timeline operation id",
            DiscoveryReason::NoProfileOperationId => "no profile operation id",
            DiscoveryReason::NoUserId => "no user id",
            DiscoveryReason::NoPostCount => "no post count",
            DiscoveryReason::NoGuestToken => "no guest token",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("credential discovery for {username} failed: {reason} ({candidates} candidates)")]
pub struct DiscoveryError {
    pub username: String,
    pub reason: DiscoveryReason,
    /// How many candidate values were seen where exactly one was required.
    pub candidates: usize,
}

impl DiscoveryError {
    pub(crate) fn missing(username: &str, reason: DiscoveryReason) -> Self {
        Self::with_candidates(username, reason, 0)
    }

    pub(crate) fn with_candidates(username: &str, reason: DiscoveryReason, candidates: usize) -> Self {
        Self {
            username: username.to_string(),
            reason,
            candidates,
        }
    }

    /// Several candidates were found and none was picked.
    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }
}

/// Failure of one username's harvest.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("timeline page {page} has {matches} bottom cursors, expected exactly one")]
    MissingCursor { page: usize, matches: usize },
    #[error("timeline page {page} is not valid JSON: {message}")]
    InvalidPage { page: usize, message: String },
}
