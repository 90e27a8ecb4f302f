//! CLI integration tests against a mock table service.
//!
//! Each test starts a wiremock server, points the built `aztable` binary at
//! it through `AZTABLE_ENDPOINT`, and checks both the requests the CLI
//! makes and what it prints.

mod common;

use std::io::Write;

use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{entity_entry, feed, run_cli, run_cli_success, run_cli_with_endpoint, table_entry};

fn endpoint(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}", server.address().port())
}

fn json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_missing_account_fails_before_any_request() {
    let output = run_cli(&["table", "list"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AZTABLE_ACCOUNT"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_malformed_key_is_rejected() {
    let output = run_cli(&["--account", "devaccount", "--key", "%%%", "table", "list"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to create client"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_version_flag() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("aztable"));
}

// ============================================================================
// Tables
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_table_add_with_pass_thru() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Tables"))
        .and(body_string_contains("<d:TableName>Orders</d:TableName>"))
        .and(body_string_contains("<name>Ann</name>"))
        .respond_with(ResponseTemplate::new(201).set_body_string(feed(&[table_entry("Orders")])))
        .expect(1)
        .mount(&server)
        .await;

    let (stdout, stderr) = run_cli_success(
        &["table", "add", "Orders", "--author", "Ann", "--pass-thru"],
        &endpoint(&server),
    );

    assert!(stderr.contains("Created table Orders"));
    let descriptor: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(descriptor["name"], "Orders");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_table_add_existing_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Tables"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let (stdout, stderr) = run_cli_success(&["table", "add", "Orders"], &endpoint(&server));

    assert!(stdout.is_empty());
    assert!(stderr.contains("already exists"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_table_list_matches_wildcards() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Tables"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[
            table_entry("Customers"),
            table_entry("Orders"),
            table_entry("OrderLines"),
        ])))
        .mount(&server)
        .await;

    let (stdout, _) = run_cli_success(&["table", "list", "ord*"], &endpoint(&server));
    let names: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["name"].clone())
        .collect();
    assert_eq!(names, ["Orders", "OrderLines"]);

    let (stdout, _) = run_cli_success(&["table", "list", "CUSTOMERS"], &endpoint(&server));
    assert_eq!(stdout.lines().count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_table_remove_requires_confirmation() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/Tables('Orders')"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // stdin is closed, so the prompt is declined
    let (_, stderr) = run_cli_success(&["table", "remove", "Orders"], &endpoint(&server));
    assert!(stderr.contains("Aborted."));

    let (_, stderr) = run_cli_success(&["table", "remove", "Orders", "--force"], &endpoint(&server));
    assert!(stderr.contains("Table Orders removed"));
}

// ============================================================================
// Entities
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_set_numbers_rows() {
    let server = MockServer::start().await;

    for row in ["5", "6"] {
        Mock::given(method("POST"))
            .and(path("/Orders"))
            .and(body_string_contains("<d:PartitionKey>Default</d:PartitionKey>"))
            .and(body_string_contains(format!("<d:RowKey>{row}</d:RowKey>")))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_string(feed(&[entity_entry("Default", row, &[("Amount", "1")])])),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let input = json_file(r#"[{"Amount": 1.5}, {"Amount": 2, "Paid": true}]"#);
    let (_, stderr) = run_cli_success(
        &[
            "entity",
            "set",
            "Orders",
            "--start-at-row",
            "5",
            "--json",
            input.path().to_str().unwrap(),
        ],
        &endpoint(&server),
    );

    assert!(stderr.contains("Inserted entity Default/5"));
    assert!(stderr.contains("Inserted entity Default/6"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_set_row_with_many_objects_fails() {
    let server = MockServer::start().await;
    let input = json_file(r#"[{"A": "1"}, {"A": "2"}]"#);

    let output = run_cli_with_endpoint(
        &["entity", "set", "Orders", "--row", "1", "--json", input.path().to_str().unwrap()],
        &endpoint(&server),
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--row"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_get_prints_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Orders(PartitionKey='P1',RowKey='1')"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(feed(&[entity_entry("P1", "1", &[("Amount", "9.99")])])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Orders(PartitionKey='P1',RowKey='2')"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (stdout, _) = run_cli_success(&["entity", "get", "Orders", "P1", "1"], &endpoint(&server));
    let record: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["Amount"], "9.99");
    assert_eq!(record["TableName"], "Orders");

    let (stdout, stderr) = run_cli_success(&["entity", "get", "Orders", "P1", "2"], &endpoint(&server));
    assert!(stdout.is_empty());
    assert!(stderr.contains("No entity"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_search_prints_residual_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Orders()"))
        .and(query_param("$filter", "Amount gt '5'"))
        .and(query_param("$top", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-continuation-NextPartitionKey", "P1")
                .insert_header("x-ms-continuation-NextRowKey", "3")
                .set_body_string(feed(&[
                    entity_entry("P1", "1", &[("Amount", "6")]),
                    entity_entry("P1", "2", &[("Amount", "7")]),
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (stdout, stderr) = run_cli_success(
        &[
            "entity",
            "search",
            "Orders",
            "--where",
            "$_.Amount -gt 5",
            "--first",
            "2",
        ],
        &endpoint(&server),
    );

    assert_eq!(stdout.lines().count(), 2);
    assert!(stderr.contains("Next cursor"));
    assert!(stderr.contains(r#""next_partition":"P1""#));
    assert!(stderr.contains(r#""next_row":"3""#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_search_rejects_bad_clause() {
    let server = MockServer::start().await;

    let output = run_cli_with_endpoint(
        &["entity", "search", "Orders", "--where", "Name -like 'A*'"],
        &endpoint(&server),
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid filter clause"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_update_merge() {
    let server = MockServer::start().await;

    Mock::given(method("MERGE"))
        .and(path("/Orders(PartitionKey='P1',RowKey='1')"))
        .and(body_string_contains("<d:Paid>true</d:Paid>"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let input = json_file(r#"{"Paid": true}"#);
    let (_, stderr) = run_cli_success(
        &[
            "entity",
            "update",
            "Orders",
            "P1",
            "1",
            "--merge",
            "--json",
            input.path().to_str().unwrap(),
        ],
        &endpoint(&server),
    );

    assert!(stderr.contains("Merged entity"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entity_remove_missing_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/Orders(PartitionKey='P1',RowKey='9')"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (_, stderr) = run_cli_success(
        &["entity", "remove", "Orders", "P1", "9", "--force"],
        &endpoint(&server),
    );
    assert!(stderr.contains("not found"));
}
