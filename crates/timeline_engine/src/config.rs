use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Timeline variables that must stay present however callers extend the query.
const REQUIRED_TIMELINE_VARIABLES: &[&str] = &["withTweetQuoteCount", "includePromotedContent"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required timeline variable `{0}` was removed")]
    MissingVariable(String),
    #[error("page size must be positive")]
    ZeroPageSize,
}

/// Caller-supplied configuration for one or more harvests.
///
/// Nothing here is global; each harvest reads the value it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarvestConfig {
    pub endpoints: Endpoints,
    pub operations: Operations,
    pub query: QueryConfig,
    pub transport: TransportSettings,
    /// Upper bound on timeline requests per user; `None` runs until convergence.
    pub page_limit: Option<usize>,
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.query.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Host of profile pages and of the post links handed to callers.
    pub site_base: String,
    pub guest_activate_url: String,
    pub graphql_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            site_base: "https://twitter.com".to_string(),
            guest_activate_url: "https://api.twitter.com/1.1/guest/activate.json".to_string(),
            graphql_base: "https://twitter.com/i/api/graphql/".to_string(),
        }
    }
}

impl Endpoints {
    pub fn profile_page_url(&self, username: &str) -> String {
        format!("{}/{}", self.site_base.trim_end_matches('/'), username)
    }

    pub fn operation_url(&self, operation_id: &str, operation_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.graphql_base.trim_end_matches('/'),
            operation_id,
            operation_name
        )
    }
}

/// Names of the backend operations whose identifiers are discovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operations {
    pub timeline: String,
    pub profile: String,
}

impl Default for Operations {
    fn default() -> Self {
        Self {
            timeline: "UserTweetsAndReplies".to_string(),
            profile: "UserByScreenName".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Sent as the `count` variable of every timeline request.
    pub page_size: u32,
    pub timeline_variables: BTreeMap<String, bool>,
    pub profile_variables: BTreeMap<String, bool>,
    pub features: BTreeMap<String, bool>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            timeline_variables: flags(&[
                ("withTweetQuoteCount", true),
                ("includePromotedContent", true),
                ("withQuickPromoteEligibilityTweetFields", false),
                ("withSuperFollowsUserFields", true),
                ("withUserResults", true),
                ("withBirdwatchPivots", false),
                ("withDownvotePerspective", false),
                ("withReactionsMetadata", false),
                ("withReactionsPerspective", false),
                ("withSuperFollowsTweetFields", true),
                ("withVoice", true),
                ("withV2Timeline", false),
            ]),
            profile_variables: flags(&[
                ("withSafetyModeUserFields", true),
                ("withSuperFollowsUserFields", true),
            ]),
            features: flags(&[
                ("standardized_nudges_misinfo", true),
                ("dont_mention_me_view_api_enabled", true),
                ("responsive_web_edit_tweet_api_enabled", true),
                ("interactive_text_enabled", true),
                ("responsive_web_enhance_cards_enabled", true),
                ("responsive_web_uc_gql_enabled", true),
                ("vibe_tweet_context_enabled", true),
            ]),
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        for key in REQUIRED_TIMELINE_VARIABLES {
            if !self.timeline_variables.contains_key(*key) {
                return Err(ConfigError::MissingVariable((*key).to_string()));
            }
        }
        Ok(())
    }

    /// JSON `variables` parameter of a timeline request.
    pub fn timeline_variables_json(&self, user_id: &str, cursor: Option<&str>) -> String {
        let mut variables = flag_object(&self.timeline_variables);
        variables.insert("count".to_string(), Value::from(self.page_size));
        variables.insert("userId".to_string(), Value::from(user_id));
        if let Some(cursor) = cursor {
            variables.insert("cursor".to_string(), Value::from(cursor));
        }
        Value::Object(variables).to_string()
    }

    /// JSON `variables` parameter of the profile lookup.
    pub fn profile_variables_json(&self, username: &str) -> String {
        let mut variables = flag_object(&self.profile_variables);
        variables.insert("screen_name".to_string(), Value::from(username));
        Value::Object(variables).to_string()
    }

    pub fn features_json(&self) -> String {
        Value::Object(flag_object(&self.features)).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            redirect_limit: 5,
            max_bytes: 32 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
        }
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn flags(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), *value))
        .collect()
}

fn flag_object(flags: &BTreeMap<String, bool>) -> Map<String, Value> {
    flags
        .iter()
        .map(|(key, value)| (key.clone(), Value::Bool(*value)))
        .collect()
}
