//! Commands against a mock Box API

use clap::Parser;
use metafill_cli::commands::{collect_files, connect, execute_apply, execute_extract, execute_login};
use metafill_cli::config::{OutputFormat, Profile};
use metafill_cli::{AuthOverrides, Cli, CliError, Command, Config, Formatter};
use metafill_sdk::AuthMethod;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, dir: &tempfile::TempDir) -> Config {
    let mut config = Config::load_from(&dir.path().join("config.toml")).unwrap();
    config.set_profile(
        "default".to_string(),
        Profile::new(format!("{}/2.0", server.uri()), format!("{}/oauth2/token", server.uri())),
    );
    config.settings.max_retries = 1;
    config
}

fn developer_token() -> AuthOverrides {
    AuthOverrides {
        developer_token: Some("dev-token".to_string()),
        client_secret: None,
    }
}

fn formatter() -> Formatter {
    Formatter::new(OutputFormat::Json, false)
}

fn command(argv: &[&str]) -> Command {
    Cli::parse_from(argv).command
}

async fn mount_account(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2.0/users/me"))
        .and(header("authorization", "Bearer dev-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "user", "id": "11", "name": "Ada", "login": "ada@example.com"
        })))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, id: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/2.0/files/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file", "id": id, "name": name, "size": 1000
        })))
        .mount(server)
        .await;
}

async fn mount_invoice_template(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2.0/metadata_templates/enterprise_12345/invoice/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "templateKey": "invoice",
            "scope": "enterprise_12345",
            "displayName": "Invoice",
            "fields": [
                {"type": "string", "key": "vendor", "displayName": "Vendor"},
                {"type": "float", "key": "amount", "displayName": "Amount"},
                {"type": "date", "key": "invoiceDate", "displayName": "Invoice Date"},
                {"type": "enum", "key": "documentType", "displayName": "Type",
                 "options": [{"key": "Invoice"}, {"key": "Receipt"}]}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_apply_plan_with_mixed_modes() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;
    mount_file(&server, "42", "invoice.pdf").await;
    mount_file(&server, "43", "lease.pdf").await;
    mount_invoice_template(&server).await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract_structured"))
        .and(body_partial_json(json!({"items": [{"type": "file", "id": "42"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": {
                "vendor": "Acme",
                "amount": "USD 1,234.50",
                "invoiceDate": "March 3rd, 2024",
                "documentType": "INVOICE"
            },
            "completion_reason": "done"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract"))
        .and(body_partial_json(json!({"prompt": "Who are the parties?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "{\"Landlord\": \"Jane\", \"Term Months\": 12}",
            "completion_reason": "done"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/2.0/files/42/metadata/enterprise_12345/invoice"))
        .and(body_json(json!({
            "vendor": "Acme",
            "amount": 1234.5,
            "invoiceDate": "2024-03-03T00:00:00.000Z",
            "documentType": "Invoice"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$parent": "file_42",
            "vendor": "Acme",
            "amount": 1234.5,
            "invoiceDate": "2024-03-03T00:00:00.000Z",
            "documentType": "Invoice"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.0/files/43/metadata/global/properties"))
        .and(body_json(json!({"landlord": "Jane", "term_months": "12"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$parent": "file_43", "landlord": "Jane", "term_months": "12"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut plan = tempfile::NamedTempFile::new().unwrap();
    write!(
        plan,
        "[[file]]\nid = \"42\"\ntemplate = \"enterprise_12345/invoice\"\n\n[[file]]\nid = \"43\"\nprompt = \"Who are the parties?\"\n"
    )
    .unwrap();
    let plan_path = plan.path().to_str().unwrap().to_string();

    let Command::Apply(args) = command(&["metafill", "apply", "--plan", &plan_path, "--normalize-keys", "--yes"]) else {
        panic!("Expected Apply command");
    };

    let config = config_for(&server, &dir);
    execute_apply(args, &config, &developer_token(), &formatter()).await.unwrap();
}

#[tokio::test]
async fn test_apply_reports_failed_files() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;
    mount_file(&server, "42", "invoice.pdf").await;
    mount_file(&server, "44", "scan.tiff").await;
    mount_invoice_template(&server).await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract_structured"))
        .and(body_partial_json(json!({"items": [{"type": "file", "id": "44"}]})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "error", "status": 404, "code": "not_found", "message": "Item not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract_structured"))
        .and(body_partial_json(json!({"items": [{"type": "file", "id": "42"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": {"vendor": "Acme", "amount": "not stated"}
        })))
        .mount(&server)
        .await;

    // Nothing may be written: 44 fails extraction, 42 has a field error
    Mock::given(method("POST"))
        .and(path("/2.0/files/42/metadata/enterprise_12345/invoice"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let Command::Apply(args) = command(&[
        "metafill",
        "apply",
        "44",
        "42",
        "--template",
        "enterprise_12345/invoice",
        "--policy",
        "block",
        "-y",
    ]) else {
        panic!("Expected Apply command");
    };

    let config = config_for(&server, &dir);
    let result = execute_apply(args, &config, &developer_token(), &formatter()).await;
    assert!(matches!(result, Err(CliError::Incomplete(ref m)) if m == "2 of 2 file(s) failed"));
}

#[tokio::test]
async fn test_extract_writes_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;

    Mock::given(method("GET"))
        .and(path("/2.0/folders/7/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "entries": [
                {"type": "file", "id": "42", "name": "invoice.pdf"},
                {"type": "folder", "id": "8", "name": "Old"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Jane Doe"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.0/files/42/metadata/global/properties"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let Command::Extract(args) = command(&["metafill", "extract", "--folder", "7", "--freeform"]) else {
        panic!("Expected Extract command");
    };

    let config = config_for(&server, &dir);
    execute_extract(args, &config, &developer_token(), &formatter()).await.unwrap();
}

#[tokio::test]
async fn test_files_need_extraction_settings() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;
    mount_file(&server, "42", "invoice.pdf").await;

    let Command::Extract(args) = command(&["metafill", "extract", "42"]) else {
        panic!("Expected Extract command");
    };

    let config = config_for(&server, &dir);
    let result = execute_extract(args, &config, &developer_token(), &formatter()).await;
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[tokio::test]
async fn test_login_saves_credentials() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;

    let Command::Login(args) = command(&["metafill", "login", "--save"]) else {
        panic!("Expected Login command");
    };

    let mut config = config_for(&server, &dir);
    execute_login(args, &mut config, &developer_token(), &formatter()).await.unwrap();

    let reloaded = Config::load_from(&dir.path().join("config.toml")).unwrap();
    assert_eq!(
        reloaded.get_active_profile().unwrap().auth,
        Some(AuthMethod::DeveloperToken { token: "dev-token".to_string() })
    );
}

#[tokio::test]
async fn test_login_without_credentials() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let Command::Login(args) = command(&["metafill", "login"]) else {
        panic!("Expected Login command");
    };

    let mut config = config_for(&server, &dir);
    let result = execute_login(args, &mut config, &AuthOverrides::default(), &formatter()).await;
    assert!(matches!(result, Err(CliError::Auth(_))));
}

async fn mount_missing_file(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/2.0/files/{}", id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "error", "status": 404, "code": "not_found", "message": "Not Found"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_unknown_file_id_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;
    mount_file(&server, "1", "a.pdf").await;
    mount_missing_file(&server, "2").await;
    mount_file(&server, "3", "c.pdf").await;

    let Command::Extract(args) = command(&["metafill", "extract", "1", "2", "3", "--freeform"]) else {
        panic!("Expected Extract command");
    };

    let config = config_for(&server, &dir);
    let (client, _) = connect(&config, &developer_token()).await.unwrap();
    let selection = collect_files(&client, &args.target).await.unwrap();

    let ids: Vec<_> = selection.files.iter().map(|(file, _)| file.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(selection.unavailable.len(), 1);
    assert_eq!(selection.unavailable[0].0, "2");
    assert_eq!(selection.total(), 3);
}

#[tokio::test]
async fn test_apply_continues_past_unknown_file_id() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_account(&server).await;
    mount_file(&server, "1", "a.pdf").await;
    mount_missing_file(&server, "2").await;
    mount_file(&server, "3", "c.pdf").await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "{\"Party\": \"Jane\"}"
        })))
        .expect(2)
        .mount(&server)
        .await;
    for id in ["1", "3"] {
        Mock::given(method("POST"))
            .and(path(format!("/2.0/files/{}/metadata/global/properties", id)))
            .and(body_json(json!({"Party": "Jane"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$parent": format!("file_{}", id), "Party": "Jane"
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let Command::Apply(args) = command(&["metafill", "apply", "1", "2", "3", "--freeform", "--yes"]) else {
        panic!("Expected Apply command");
    };

    let config = config_for(&server, &dir);
    let result = execute_apply(args, &config, &developer_token(), &formatter()).await;
    assert!(matches!(result, Err(CliError::Incomplete(ref m)) if m == "1 of 3 file(s) failed"));
}
