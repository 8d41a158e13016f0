//! The set of files a session works on

use crate::error::SessionError;
use crate::item::{FileWorkItem, WorkState};
use indexmap::IndexMap;
use metafill_domain::{ExtractionConfig, FileHandle};

/// Work items keyed by file id, in selection order
#[derive(Debug, Clone, Default)]
pub struct Batch {
    items: IndexMap<String, FileWorkItem>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; returns false if it was already selected
    pub fn add(&mut self, file: FileHandle) -> bool {
        if self.items.contains_key(&file.id) {
            return false;
        }
        self.items.insert(file.id.clone(), FileWorkItem::new(file));
        true
    }

    /// Add a file with its configuration
    ///
    /// A file already in the batch is configured instead, which fails if its
    /// configuration is locked.
    pub fn add_configured(&mut self, file: FileHandle, config: ExtractionConfig) -> Result<(), SessionError> {
        match self.items.get_mut(&file.id) {
            Some(item) => item.configure(config),
            None => {
                self.items
                    .insert(file.id.clone(), FileWorkItem::with_config(file, config));
                Ok(())
            }
        }
    }

    /// Remove a file from the batch
    pub fn remove(&mut self, file_id: &str) -> Option<FileWorkItem> {
        self.items.shift_remove(file_id)
    }

    /// Configure a file
    pub fn configure(&mut self, file_id: &str, config: ExtractionConfig) -> Result<(), SessionError> {
        self.get_mut(file_id)?.configure(config)
    }

    /// Configure every file that is not locked yet
    ///
    /// Returns the ids of files whose configuration was locked.
    pub fn configure_all(&mut self, config: &ExtractionConfig) -> Vec<String> {
        self.items
            .values_mut()
            .filter_map(|item| item.configure(config.clone()).err().map(|_| item.file().id.clone()))
            .collect()
    }

    /// Replace a file's configuration, discarding its extracted values
    pub fn reconfigure(&mut self, file_id: &str, config: ExtractionConfig) -> Result<(), SessionError> {
        self.get_mut(file_id)?.reconfigure(config);
        Ok(())
    }

    /// Get an item
    pub fn get(&self, file_id: &str) -> Result<&FileWorkItem, SessionError> {
        self.items
            .get(file_id)
            .ok_or_else(|| SessionError::UnknownFile(file_id.to_string()))
    }

    /// Get an item mutably
    pub fn get_mut(&mut self, file_id: &str) -> Result<&mut FileWorkItem, SessionError> {
        self.items
            .get_mut(file_id)
            .ok_or_else(|| SessionError::UnknownFile(file_id.to_string()))
    }

    /// Items in selection order
    pub fn items(&self) -> impl Iterator<Item = &FileWorkItem> {
        self.items.values()
    }

    /// File ids in selection order
    pub fn file_ids(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of files in `state`
    pub fn count(&self, state: WorkState) -> usize {
        self.items.values().filter(|i| i.state() == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metafill_domain::TemplateRef;

    #[test]
    fn test_selection_order_and_duplicates() {
        let mut batch = Batch::new();
        assert!(batch.add(FileHandle::file("2", "b.pdf")));
        assert!(batch.add(FileHandle::file("1", "a.pdf")));
        assert!(!batch.add(FileHandle::file("2", "b.pdf")));

        assert_eq!(batch.file_ids(), vec!["2", "1"]);
        assert_eq!(batch.count(WorkState::Unconfigured), 2);
    }

    #[test]
    fn test_per_file_configuration() {
        let mut batch = Batch::new();
        batch.add(FileHandle::file("1", "a.pdf"));
        batch.add(FileHandle::file("2", "b.pdf"));

        let invoice = ExtractionConfig::structured(TemplateRef::new("enterprise_1", "invoice"));
        batch.configure("1", invoice.clone()).unwrap();
        batch.configure("2", ExtractionConfig::freeform(None)).unwrap();

        assert_eq!(batch.get("1").unwrap().config(), Some(&invoice));
        assert!(!batch.get("2").unwrap().config().unwrap().is_structured());
    }

    #[test]
    fn test_configure_all_skips_locked() {
        let mut batch = Batch::new();
        batch.add(FileHandle::file("1", "a.pdf"));
        batch.add(FileHandle::file("2", "b.pdf"));
        batch.configure_all(&ExtractionConfig::freeform(None));
        batch.get_mut("1").unwrap().begin_extraction().unwrap();

        let locked = batch.configure_all(&ExtractionConfig::freeform(Some("x".into())));
        assert_eq!(locked, vec!["1"]);
    }

    #[test]
    fn test_unknown_file() {
        let mut batch = Batch::new();
        assert_eq!(
            batch.configure("9", ExtractionConfig::freeform(None)),
            Err(SessionError::UnknownFile("9".into()))
        );
    }
}
