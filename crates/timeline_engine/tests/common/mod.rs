#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use timeline_engine::{
    CredentialBundle, Endpoints, FailureKind, HarvestConfig, HarvestEvent, PageSource,
    ProgressSink, TransportError,
};
use wiremock::{Match, Request};

pub const ACCESS_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAAFakeToken%2Fabc%3Ddef";

pub fn post(id: &str, author: &str) -> Value {
    json!({
        "id_str": id,
        "full_text": format!("post {id}"),
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "retweet_count": 1,
        "favorite_count": 2,
        "reply_count": 3,
        "quote_count": 4,
        "retweeted": false,
        "is_quote_status": false,
        "user_id_str": author,
    })
}

/// A timeline page in the backend's envelope. Cursor entries are written by
/// hand because the cursor pattern depends on the backend's key order.
pub fn timeline_page(posts: &[Value], bottom_cursor: Option<&str>) -> String {
    let mut entries: Vec<String> = posts
        .iter()
        .map(|legacy| {
            json!({
                "entryId": "tweet",
                "content": {
                    "itemContent": {
                        "tweet_results": { "result": { "legacy": legacy } }
                    }
                }
            })
            .to_string()
        })
        .collect();
    entries.push(
        r#"{"entryId":"cursor-top","content":{"__typename":"TimelineTimelineCursor","value":"top-cursor","cursorType":"Top"}}"#
            .to_string(),
    );
    if let Some(cursor) = bottom_cursor {
        entries.push(format!(
            r#"{{"entryId":"cursor-bottom","content":{{"__typename":"TimelineTimelineCursor","value":"{cursor}","cursorType":"Bottom"}}}}"#
        ));
    }
    format!(
        r#"{{"data":{{"user":{{"result":{{"timeline_v2":{{"timeline":{{"instructions":[{{"type":"TimelineAddEntries","entries":[{}]}}]}}}}}}}}}}}}"#,
        entries.join(",")
    )
}

/// A timeline page whose `module_posts` arrive in a `TimelineAddToModule`
/// instruction after the regular entries.
pub fn module_page(posts: &[Value], module_posts: &[Value], bottom_cursor: Option<&str>) -> String {
    let page = timeline_page(posts, bottom_cursor);
    let items: Vec<Value> = module_posts
        .iter()
        .map(|legacy| {
            json!({
                "entryId": "conversation-item",
                "item": {
                    "itemContent": {
                        "tweet_results": { "result": { "legacy": legacy } }
                    }
                }
            })
        })
        .collect();
    let module = json!({
        "type": "TimelineAddToModule",
        "moduleEntryId": "conversation",
        "moduleItems": items,
    });
    let entries_end = page.rfind("]}]").expect("page has an instruction list");
    format!(
        "{}]}},{}]{}",
        &page[..entries_end],
        module,
        &page[entries_end + 3..]
    )
}

pub fn bundle() -> CredentialBundle {
    CredentialBundle {
        access_token: ACCESS_TOKEN.to_string(),
        timeline_operation_id: "tl123".to_string(),
        profile_operation_id: "pr456".to_string(),
        user_id: "42".to_string(),
        declared_post_count: 4,
        guest_token: "guest-1".to_string(),
    }
}

pub fn config_for(server_uri: &str) -> HarvestConfig {
    HarvestConfig {
        endpoints: Endpoints {
            site_base: server_uri.to_string(),
            guest_activate_url: format!("{server_uri}/1.1/guest/activate.json"),
            graphql_base: format!("{server_uri}/graphql/"),
        },
        ..HarvestConfig::default()
    }
}

/// Replays a fixed sequence of pages and records every cursor asked for.
#[derive(Default)]
pub struct ScriptedPages {
    pages: Mutex<VecDeque<String>>,
    requested: Mutex<Vec<Option<String>>>,
}

impl ScriptedPages {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<Option<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedPages {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<String, TransportError> {
        self.requested
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));
        self.pages.lock().unwrap().pop_front().ok_or(TransportError {
            kind: FailureKind::HttpStatus(404),
            url: "scripted".to_string(),
            body: "no more pages".to_string(),
        })
    }
}

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<HarvestEvent>>>,
}

impl TestSink {
    pub fn take(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn variables(request: &Request) -> Option<Value> {
    let (_, raw) = request
        .url
        .query_pairs()
        .find(|(name, _)| name == "variables")?;
    serde_json::from_str(&raw).ok()
}

/// Matches a timeline request by the `cursor` inside its JSON variables.
pub struct CursorIs(pub Option<&'static str>);

impl Match for CursorIs {
    fn matches(&self, request: &Request) -> bool {
        variables(request)
            .is_some_and(|vars| vars.get("cursor").and_then(Value::as_str) == self.0)
    }
}

/// Matches a request whose JSON variables contain `key` with `value`.
pub struct VariableIs(pub &'static str, pub Value);

impl Match for VariableIs {
    fn matches(&self, request: &Request) -> bool {
        variables(request).is_some_and(|vars| vars.get(self.0) == Some(&self.1))
    }
}
