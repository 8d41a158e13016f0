//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the workflow and the storage
//! provider. Implementations live in `metafill-sdk` (auth, listing, templates,
//! apply) and `metafill-extractor` (AI extraction).

use crate::{
    AppliedMetadata, Credentials, ExtractionConfig, FileHandle, MetadataPayload, MetadataTarget,
    MetadataTemplate, RawValues, TemplateRef,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for logging in to the provider
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Error type for auth operations; shown to the user verbatim
    type Error: std::error::Error + Send + Sync + 'static;

    /// Obtain credentials
    async fn login(&self) -> Result<Credentials, Self::Error>;
}

/// Trait for listing files
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Error type for listing operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// List the items of a folder (`"0"` is the root)
    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileHandle>, Self::Error>;
}

/// Trait for fetching template schemas
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Error type for template lookups
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a template's fields
    async fn get_template(&self, template: &TemplateRef) -> Result<MetadataTemplate, Self::Error>;
}

/// Trait for AI extraction of metadata values
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Error type for extraction operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract raw field values for one file using its configuration
    async fn extract(
        &self,
        file: &FileHandle,
        config: &ExtractionConfig,
    ) -> Result<RawValues, Self::Error>;
}

/// Trait for writing metadata to a file
#[async_trait]
pub trait MetadataApplier: Send + Sync {
    /// Error type for apply operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write a payload to the file's metadata instance for `target`
    async fn apply(
        &self,
        file: &FileHandle,
        target: &MetadataTarget,
        payload: &MetadataPayload,
    ) -> Result<AppliedMetadata, Self::Error>;
}

// Shared clients: one `Arc<BoxClient>` serves several roles.

#[async_trait]
impl<T: FileSource + ?Sized> FileSource for Arc<T> {
    type Error = T::Error;

    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileHandle>, Self::Error> {
        (**self).list_files(folder_id).await
    }
}

#[async_trait]
impl<T: TemplateSource + ?Sized> TemplateSource for Arc<T> {
    type Error = T::Error;

    async fn get_template(&self, template: &TemplateRef) -> Result<MetadataTemplate, Self::Error> {
        (**self).get_template(template).await
    }
}

#[async_trait]
impl<T: MetadataExtractor + ?Sized> MetadataExtractor for Arc<T> {
    type Error = T::Error;

    async fn extract(
        &self,
        file: &FileHandle,
        config: &ExtractionConfig,
    ) -> Result<RawValues, Self::Error> {
        (**self).extract(file, config).await
    }
}

#[async_trait]
impl<T: MetadataApplier + ?Sized> MetadataApplier for Arc<T> {
    type Error = T::Error;

    async fn apply(
        &self,
        file: &FileHandle,
        target: &MetadataTarget,
        payload: &MetadataPayload,
    ) -> Result<AppliedMetadata, Self::Error> {
        (**self).apply(file, target, payload).await
    }
}
