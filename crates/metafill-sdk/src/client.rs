//! Box REST client implementation.

use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::models::{
    AiExtractRequest, AiExtractStructuredRequest, AiItem, AiTemplateRef, ItemsPage, PatchOp,
    TemplateSchema,
};
use crate::transport::{http_client, send_with_retry};
use async_trait::async_trait;
use metafill_domain::traits::{FileSource, MetadataApplier, TemplateSource};
use metafill_domain::{
    AppliedMetadata, Credentials, FileHandle, MetadataPayload, MetadataTarget, MetadataTemplate,
    TemplateRef, UserInfo,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

const ITEM_FIELDS: &str = "id,name,type,size";
const JSON_PATCH: &str = "application/json-patch+json";

/// Box REST client
///
/// Holds one access token obtained from [`crate::BoxAuthenticator`]. All
/// requests are retried on 429/5xx per [`SdkConfig::max_retries`].
pub struct BoxClient {
    config: SdkConfig,
    http: reqwest::Client,
    access_token: String,
}

impl BoxClient {
    /// Create a client for already-obtained credentials
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: SdkConfig, credentials: &Credentials) -> Result<Self, SdkError> {
        config.validate()?;
        Ok(Self {
            http: http_client(&config)?,
            access_token: credentials.access_token.clone(),
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, SdkError> {
        let url = self.url(path);
        let response = send_with_retry(&self.config, || {
            self.http.get(&url).bearer_auth(&self.access_token).query(query)
        })
        .await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, SdkError> {
        let url = self.url(path);
        let response = send_with_retry(&self.config, || {
            self.http.post(&url).bearer_auth(&self.access_token).json(body)
        })
        .await?;
        Ok(response.json::<Value>().await?)
    }

    /// The user the token acts as
    pub async fn current_user(&self) -> Result<UserInfo, SdkError> {
        self.get_json("/users/me", &[("fields", "id,name,login".to_string())]).await
    }

    /// One item by id
    pub async fn file_info(&self, file_id: &str) -> Result<FileHandle, SdkError> {
        let path = format!("/files/{}", file_id);
        self.get_json(&path, &[("fields", ITEM_FIELDS.to_string())]).await
    }

    /// All items of a folder, following pagination
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<FileHandle>, SdkError> {
        let path = format!("/folders/{}/items", folder_id);
        let limit = self.config.page_size;
        let mut items: Vec<FileHandle> = Vec::new();

        loop {
            let query = [
                ("fields", ITEM_FIELDS.to_string()),
                ("offset", items.len().to_string()),
                ("limit", limit.to_string()),
            ];
            let page: ItemsPage = self.get_json(&path, &query).await?;
            let received = page.entries.len();
            items.extend(page.entries);

            debug!("Folder {}: {} of {} items", folder_id, items.len(), page.total_count);
            if received == 0 || items.len() as u64 >= page.total_count {
                break;
            }
        }

        Ok(items)
    }

    /// Fetch a template schema
    pub async fn template_schema(&self, template: &TemplateRef) -> Result<MetadataTemplate, SdkError> {
        let path = format!("/metadata_templates/{}/{}/schema", template.scope, template.template_key);
        let schema: TemplateSchema = self.get_json(&path, &[]).await?;
        schema.into_template().map_err(SdkError::Decode)
    }

    /// Freeform AI extraction; returns the raw response body
    pub async fn ai_extract(&self, file_id: &str, prompt: &str) -> Result<Value, SdkError> {
        let body = AiExtractRequest {
            prompt,
            items: vec![AiItem::file(file_id)],
        };
        debug!("AI extract (freeform) for file {}", file_id);
        self.post_json("/ai/extract", &body).await
    }

    /// Template-driven AI extraction; returns the raw response body
    pub async fn ai_extract_structured(&self, file_id: &str, template: &TemplateRef) -> Result<Value, SdkError> {
        let body = AiExtractStructuredRequest {
            items: vec![AiItem::file(file_id)],
            metadata_template: AiTemplateRef {
                template_key: &template.template_key,
                scope: &template.scope,
                kind: "metadata_template",
            },
        };
        debug!("AI extract (structured, {}) for file {}", template, file_id);
        self.post_json("/ai/extract_structured", &body).await
    }

    fn metadata_path(file_id: &str, target: &MetadataTarget) -> String {
        format!("/files/{}/metadata/{}/{}", file_id, target.scope(), target.template_key())
    }

    /// Read a file's metadata instance
    pub async fn get_metadata(&self, file_id: &str, target: &MetadataTarget) -> Result<Value, SdkError> {
        self.get_json(&Self::metadata_path(file_id, target), &[]).await
    }

    /// Create a metadata instance; fails with [`SdkError::Conflict`] if one exists
    pub async fn create_metadata(
        &self,
        file_id: &str,
        target: &MetadataTarget,
        payload: &MetadataPayload,
    ) -> Result<Value, SdkError> {
        self.post_json(&Self::metadata_path(file_id, target), &payload.to_json())
            .await
    }

    /// Update an existing instance with one `add` operation per field
    pub async fn update_metadata(
        &self,
        file_id: &str,
        target: &MetadataTarget,
        payload: &MetadataPayload,
    ) -> Result<Value, SdkError> {
        let ops: Vec<PatchOp> = payload
            .iter()
            .map(|(key, value)| PatchOp::add(key, value.to_json()))
            .collect();
        let body = serde_json::to_vec(&ops)?;

        let url = self.url(&Self::metadata_path(file_id, target));
        let response = send_with_retry(&self.config, || {
            self.http
                .put(&url)
                .bearer_auth(&self.access_token)
                .header(reqwest::header::CONTENT_TYPE, JSON_PATCH)
                .body(body.clone())
        })
        .await?;
        Ok(response.json::<Value>().await?)
    }

    /// Create the instance, or update it if it already exists
    pub async fn apply_metadata(
        &self,
        file: &FileHandle,
        target: &MetadataTarget,
        payload: &MetadataPayload,
    ) -> Result<AppliedMetadata, SdkError> {
        let (stored, updated) = match self.create_metadata(&file.id, target, payload).await {
            Ok(stored) => (stored, false),
            Err(SdkError::Conflict(_)) => {
                info!("{} already has {}; updating existing instance", file, target);
                let stored = if payload.is_empty() {
                    self.get_metadata(&file.id, target).await?
                } else {
                    self.update_metadata(&file.id, target, payload).await?
                };
                (stored, true)
            }
            Err(e) => return Err(e),
        };

        info!("Applied {} field(s) of {} to {}", payload.len(), target, file);
        Ok(AppliedMetadata {
            file_id: file.id.clone(),
            target: target.clone(),
            stored,
            updated,
        })
    }
}

#[async_trait]
impl FileSource for BoxClient {
    type Error = SdkError;

    /// Files only; folders and web links are not extractable
    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileHandle>, Self::Error> {
        Ok(self
            .list_folder(folder_id)
            .await?
            .into_iter()
            .filter(FileHandle::is_file)
            .collect())
    }
}

#[async_trait]
impl TemplateSource for BoxClient {
    type Error = SdkError;

    async fn get_template(&self, template: &TemplateRef) -> Result<MetadataTemplate, Self::Error> {
        self.template_schema(template).await
    }
}

#[async_trait]
impl MetadataApplier for BoxClient {
    type Error = SdkError;

    async fn apply(
        &self,
        file: &FileHandle,
        target: &MetadataTarget,
        payload: &MetadataPayload,
    ) -> Result<AppliedMetadata, Self::Error> {
        self.apply_metadata(file, target, payload).await
    }
}
