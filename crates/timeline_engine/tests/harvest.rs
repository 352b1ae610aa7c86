mod common;

use common::{bundle, module_page, post, timeline_page, ScriptedPages, TestSink};
use pretty_assertions::assert_eq;
use serde_json::json;
use timeline_engine::{page_records, Harvester, HarvestError, HarvestEvent, NullProgressSink};

fn ids(records: &[timeline_core::RawRecord]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

#[tokio::test]
async fn harvest_stops_on_the_first_page_without_new_ids() {
    let pages = ScriptedPages::new(vec![
        timeline_page(&[post("1", "42"), post("2", "42"), post("3", "42")], Some("c1")),
        timeline_page(&[post("3", "42"), post("4", "42")], Some("c2")),
        timeline_page(&[post("4", "42")], Some("c3")),
        timeline_page(&[post("5", "42")], Some("c4")),
    ]);

    let records = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(ids(&records), vec!["1", "2", "3", "4"]);
    assert_eq!(
        pages.requested(),
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
}

#[tokio::test]
async fn repeated_cursor_page_converges() {
    let page = timeline_page(&[post("1", "42"), post("2", "42")], Some("same"));
    let pages = ScriptedPages::new(vec![page.clone(), page]);

    let records = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(records.len(), 2);
    assert_eq!(pages.requested().len(), 2);
}

#[tokio::test]
async fn textless_and_foreign_records_are_filtered_from_output() {
    let mut textless = post("5", "42");
    textless.as_object_mut().unwrap().remove("full_text");
    let pages = ScriptedPages::new(vec![
        timeline_page(&[post("1", "42"), textless, post("9", "99")], Some("c1")),
        timeline_page(&[post("1", "42")], Some("c2")),
    ]);

    let records = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(ids(&records), vec!["1"]);
}

#[tokio::test]
async fn nested_quoted_posts_are_collected_but_filtered_by_author() {
    let mut quoting = post("10", "42");
    quoting.as_object_mut().unwrap().insert(
        "quoted_status_result".to_string(),
        json!({ "result": { "legacy": post("11", "99") } }),
    );
    let pages = ScriptedPages::new(vec![
        timeline_page(&[quoting], Some("c1")),
        timeline_page(&[], Some("c2")),
    ]);

    let sink = TestSink::default();
    let records = Harvester::new(&pages, &sink)
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(ids(&records), vec!["10"]);
    let accumulated: Vec<usize> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            HarvestEvent::PageFetched { accumulated, .. } => Some(accumulated),
            _ => None,
        })
        .collect();
    assert_eq!(accumulated, vec![2, 2]);
}

#[tokio::test]
async fn missing_bottom_cursor_is_an_error() {
    let pages = ScriptedPages::new(vec![timeline_page(&[post("1", "42")], None)]);

    let err = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HarvestError::MissingCursor {
            page: 1,
            matches: 0
        }
    ));
}

#[tokio::test]
async fn non_json_page_is_an_error() {
    let pages = ScriptedPages::new(vec!["<html>rate limited</html>".to_string()]);

    let err = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::InvalidPage { page: 1, .. }));
}

#[tokio::test]
async fn transport_failure_mid_crawl_propagates() {
    let pages = ScriptedPages::new(vec![timeline_page(&[post("1", "42")], Some("c1"))]);

    let err = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .unwrap_err();

    match err {
        HarvestError::Transport(err) => assert_eq!(err.status(), Some(404)),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn page_limit_ends_crawl_early() {
    let pages = ScriptedPages::new(vec![
        timeline_page(&[post("1", "42")], Some("c1")),
        timeline_page(&[post("2", "42")], Some("c2")),
        timeline_page(&[post("3", "42")], Some("c3")),
    ]);

    let sink = TestSink::default();
    let records = Harvester::new(&pages, &sink)
        .with_page_limit(Some(2))
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(ids(&records), vec!["1", "2"]);
    assert_eq!(pages.requested().len(), 2);
    assert!(sink.take().contains(&HarvestEvent::Finished {
        username: "alice".to_string(),
        pages: 2,
        kept: 2,
    }));
}

#[tokio::test]
async fn unrecognised_envelope_falls_back_to_whole_page_search() {
    let odd = format!(
        r#"{{"data":{{"somethingNew":{{"items":[{{"legacy":{}}}]}}}},"x":{{"__typename":"TimelineTimelineCursor","value":"c1","cursorType":"Bottom"}}}}"#,
        post("1", "42")
    );
    let pages = ScriptedPages::new(vec![odd.clone(), odd]);

    let records = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(ids(&records), vec!["1"]);
}

#[test]
fn module_items_are_read_alongside_entries() {
    let page = module_page(&[post("1", "42")], &[post("2", "42")], Some("c1"));

    let records = page_records(&page).expect("page parses");

    assert_eq!(ids(&records), vec!["1", "2"]);
}

#[tokio::test]
async fn new_ids_only_in_module_items_keep_the_crawl_going() {
    let pages = ScriptedPages::new(vec![
        timeline_page(&[post("1", "42")], Some("c1")),
        module_page(&[post("1", "42")], &[post("2", "42")], Some("c2")),
        module_page(&[post("1", "42")], &[post("2", "42")], Some("c3")),
    ]);

    let records = Harvester::new(&pages, &NullProgressSink)
        .harvest("alice", &bundle())
        .await
        .expect("harvest ok");

    assert_eq!(ids(&records), vec!["1", "2"]);
    assert_eq!(
        pages.requested(),
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
}
