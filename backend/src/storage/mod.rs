//! Persistence collaborators.
//!
//! `TemplateStore` keeps template records and their Word documents;
//! `DraftStore` keeps scoped key-value drafts (such as half-filled manual
//! forms) until they are explicitly cleared. Both are synchronous and are
//! backed by SQLite in [`sqlite`].

pub mod sqlite;

use crate::error::StorageError;
use common::model::template::Template;

pub trait TemplateStore: Send + Sync {
    /// Inserts or updates `template`. When `document` is given it is stored
    /// and the returned template references it through `storage_path`.
    fn save(&self, template: &Template, document: Option<&[u8]>) -> Result<Template, StorageError>;

    /// All templates, most recently updated first.
    fn list(&self) -> Result<Vec<Template>, StorageError>;

    fn get(&self, id: &str) -> Result<Option<Template>, StorageError>;

    /// Removes the template and its stored document. Unknown ids are ignored.
    fn delete(&self, id: &str) -> Result<(), StorageError>;

    fn fetch_binary(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError>;
}

pub trait DraftStore: Send + Sync {
    fn load(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError>;

    fn store(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Drops every draft of `scope`.
    fn clear(&self, scope: &str) -> Result<(), StorageError>;
}
