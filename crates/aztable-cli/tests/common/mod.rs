use std::process::{Command, Output};

/// Test account credentials accepted by the signer.
pub const TEST_ACCOUNT: &str = "devaccount";
pub const TEST_KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM=";

/// Run the CLI binary with no connection settings from the environment.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aztable"));
    cmd.args(args);
    cmd.env_remove("AZTABLE_ACCOUNT");
    cmd.env_remove("AZTABLE_KEY");
    cmd.env_remove("AZTABLE_ENDPOINT");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI against `endpoint` with the test account.
pub fn run_cli_with_endpoint(args: &[&str], endpoint: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aztable"));
    cmd.args(args);
    cmd.env("AZTABLE_ACCOUNT", TEST_ACCOUNT);
    cmd.env("AZTABLE_KEY", TEST_KEY);
    cmd.env("AZTABLE_ENDPOINT", endpoint);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI against `endpoint` and expect success.
pub fn run_cli_success(args: &[&str], endpoint: &str) -> (String, String) {
    let output = run_cli_with_endpoint(args, endpoint);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Atom feed wrapping `entries`.
pub fn feed(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?><feed xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns="http://www.w3.org/2005/Atom">{}</feed>"#,
        entries.concat()
    )
}

/// A feed entry describing a table.
pub fn table_entry(name: &str) -> String {
    format!(
        "<entry><id>http://127.0.0.1/Tables('{name}')</id>\
         <content type=\"application/xml\"><m:properties><d:TableName>{name}</d:TableName></m:properties></content></entry>"
    )
}

/// A feed entry describing an entity.
pub fn entity_entry(pk: &str, rk: &str, props: &[(&str, &str)]) -> String {
    let mut properties = format!(
        "<d:PartitionKey>{pk}</d:PartitionKey><d:RowKey>{rk}</d:RowKey>\
         <d:Timestamp m:type=\"Edm.DateTime\">2024-01-01T12:00:00Z</d:Timestamp>"
    );
    for (name, value) in props {
        properties.push_str(&format!("<d:{name}>{value}</d:{name}>"));
    }
    format!(
        "<entry><id>http://127.0.0.1/Orders(PartitionKey='{pk}',RowKey='{rk}')</id>\
         <content type=\"application/xml\"><m:properties>{properties}</m:properties></content></entry>"
    )
}
