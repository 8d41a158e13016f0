//! Box AI extraction against a mock API

use metafill_domain::traits::MetadataExtractor;
use metafill_domain::{Credentials, ExtractionConfig, FileHandle, ItemKind, TemplateRef};
use metafill_extractor::{BoxAiExtractor, ExtractorConfig, ExtractorError, DEFAULT_FREEFORM_PROMPT};
use metafill_sdk::{BoxClient, SdkConfig};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn extractor(server: &MockServer) -> BoxAiExtractor {
    let config = SdkConfig::for_host(&server.uri()).with_retry_base_delay_ms(0);
    let client = BoxClient::new(config, &Credentials::new("t")).unwrap();
    BoxAiExtractor::new(Arc::new(client), ExtractorConfig::default()).unwrap()
}

#[tokio::test]
async fn test_structured_extraction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract_structured"))
        .and(body_partial_json(json!({
            "metadata_template": {"template_key": "invoice", "scope": "enterprise_12345"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": {"vendor": "Acme", "amount": "$1,234.50", "tags": "['A', 'b']"},
            "created_at": "2024-03-03T10:00:00Z",
            "completion_reason": "done",
            "ai_agent_info": {"processor": "basic_text"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ExtractionConfig::structured(TemplateRef::new("enterprise_12345", "invoice"));
    let values = extractor(&server)
        .extract(&FileHandle::file("42", "inv.pdf"), &config)
        .await
        .unwrap();

    let keys: Vec<_> = values.keys().cloned().collect();
    assert_eq!(keys, vec!["vendor", "amount", "tags"]);
    assert_eq!(values["tags"], "['A', 'b']");
}

#[tokio::test]
async fn test_freeform_extraction_uses_default_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract"))
        .and(body_partial_json(json!({"prompt": DEFAULT_FREEFORM_PROMPT})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "```json\n{\"Vendor Name\": \"Acme\", \"Total\": \"99\"}\n```",
            "completion_reason": "done"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let values = extractor(&server)
        .extract(&FileHandle::file("42", "inv.pdf"), &ExtractionConfig::freeform(None))
        .await
        .unwrap();

    assert_eq!(values["Vendor Name"], "Acme");
    assert_eq!(values.len(), 2);
}

#[tokio::test]
async fn test_freeform_extraction_uses_custom_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract"))
        .and(body_partial_json(json!({"prompt": "Who signed?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Jane Doe"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let values = extractor(&server)
        .extract(
            &FileHandle::file("42", "lease.pdf"),
            &ExtractionConfig::freeform(Some("Who signed?".into())),
        )
        .await
        .unwrap();

    assert_eq!(values["answer"], "Jane Doe");
}

#[tokio::test]
async fn test_missing_file_fails_extraction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2.0/ai/extract_structured"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "not_found", "message": "Could not find the specified resource"
        })))
        .mount(&server)
        .await;

    let config = ExtractionConfig::structured(TemplateRef::new("enterprise_12345", "invoice"));
    let result = extractor(&server)
        .extract(&FileHandle::file("404", "gone.pdf"), &config)
        .await;

    assert!(matches!(result, Err(ExtractorError::ExtractionFailed(_))));
}

#[tokio::test]
async fn test_folders_are_rejected_without_a_call() {
    let server = MockServer::start().await;

    let folder = FileHandle {
        id: "7".into(),
        name: "Archive".into(),
        kind: ItemKind::Folder,
        size: None,
    };
    let result = extractor(&server)
        .extract(&folder, &ExtractionConfig::freeform(None))
        .await;

    assert!(matches!(result, Err(ExtractorError::ExtractionFailed(_))));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
