//! Text extraction over raw pages, script bundles and API responses.
//!
//! Every pattern the platform's markup can break lives here. Functions never
//! fail: no match is an empty result, and callers decide whether that is fatal.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

static ACCESS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["'](AAA[a-zA-Z0-9%-]+%[a-zA-Z0-9%-]+)["']"#).expect("access token pattern")
});
static OPERATION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{queryId:"([a-zA-Z0-9_-]+)"([^}]*)"#).expect("operation pattern")
});
static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""rest_id":"([0-9]+)""#).expect("numeric id pattern"));
static POST_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""statuses_count":([0-9]+)"#).expect("post count pattern"));
static BOTTOM_CURSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"TimelineCursor","value":"([^"]+)"[^}]+Bottom""#).expect("cursor pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<'a> {
    /// Bearer-style token embedded in a script bundle.
    AccessToken,
    /// `queryId` of the operation descriptor block naming this operation.
    OperationId(&'a str),
    /// Quoted numeric `rest_id` of a profile.
    NumericId,
    /// Declared number of posts on a profile.
    PostCount,
    /// Value of the bottom pagination cursor.
    Cursor,
}

/// Returns every match of `pattern` in `text`, in order of appearance.
pub fn extract(pattern: Pattern<'_>, text: &str) -> Vec<String> {
    match pattern {
        Pattern::AccessToken => captures(&ACCESS_TOKEN, text),
        Pattern::OperationId(operation) => {
            let quoted = format!("\"{operation}\"");
            OPERATION_BLOCK
                .captures_iter(text)
                .filter(|caps| caps.get(2).is_some_and(|rest| rest.as_str().contains(&quoted)))
                .filter_map(|caps| caps.get(1).map(|id| id.as_str().to_string()))
                .collect()
        }
        Pattern::NumericId => captures(&NUMERIC_ID, text),
        Pattern::PostCount => captures(&POST_COUNT, text),
        Pattern::Cursor => captures(&BOTTOM_CURSOR, text),
    }
}

/// The single match, or the number of matches when there is not exactly one.
pub fn exactly_one(mut matches: Vec<String>) -> Result<String, usize> {
    match matches.len() {
        1 => Ok(matches.remove(0)),
        n => Err(n),
    }
}

/// Absolute URLs of the `.js` bundles a page loads through `<script src>`.
pub fn script_bundle_urls(html: &str, page_url: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("script[src]") else {
        return Vec::new();
    };
    let base = Url::parse(page_url).ok();
    let document = Html::parse_document(html);

    let mut urls: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        let Some(url) = resolve_url(src, base.as_ref()) else {
            continue;
        };
        if !url.path().ends_with(".js") {
            continue;
        }
        let url = String::from(url);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

fn captures(regex: &Regex, text: &str) -> Vec<String> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
