use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use timeline_cli::{read_usernames, run_batch};
use timeline_engine::{Endpoints, HarvestConfig, HarvestError, NullProgressSink};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn usernames_file_skips_blank_lines() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("users.txt");
    fs::write(&path, "alice\n\n  bob  \n   \ncarol").unwrap();

    assert_eq!(read_usernames(&path).unwrap(), vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn failing_usernames_are_recorded_and_the_batch_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let config = HarvestConfig {
        endpoints: Endpoints {
            site_base: server.uri(),
            guest_activate_url: format!("{}/activate", server.uri()),
            graphql_base: format!("{}/graphql/", server.uri()),
        },
        ..HarvestConfig::default()
    };
    let usernames = vec!["alice".to_string(), "bob".to_string()];

    let report = run_batch(&config, &usernames, Duration::ZERO, &NullProgressSink).await;

    assert!(report.posts.is_empty());
    let failed: Vec<&str> = report.failures.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(failed, vec!["alice", "bob"]);
    assert!(report
        .failures
        .iter()
        .all(|(_, err)| matches!(err, HarvestError::Transport(e) if e.status() == Some(404))));
}
