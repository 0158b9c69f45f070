use crate::error::StorageError;
use crate::storage::{DraftStore, TemplateStore};
use chrono::{DateTime, SecondsFormat, Utc};
use common::model::template::Template;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS templates (
    id               TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    content          TEXT NOT NULL DEFAULT '',
    placeholders     TEXT NOT NULL DEFAULT '[]',
    is_word_template INTEGER NOT NULL DEFAULT 0,
    storage_path     TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS drafts (
    scope      TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (scope, key)
);
";

const TEMPLATE_COLUMNS: &str =
    "id, name, content, placeholders, is_word_template, storage_path, created_at, updated_at";

/// Opens the database file, creating the tables on first use.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Accepts only plain relative paths, so stored references cannot leave the
/// storage directory.
fn checked_relative(path: &str) -> Result<&Path, StorageError> {
    let candidate = Path::new(path);
    let plain = candidate
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if path.is_empty() || !plain {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(candidate)
}

/// A `templates` row before conversion into the model type.
struct TemplateRecord {
    id: String,
    name: String,
    content: String,
    placeholders: String,
    is_word_template: bool,
    storage_path: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TemplateRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            content: row.get(2)?,
            placeholders: row.get(3)?,
            is_word_template: row.get(4)?,
            storage_path: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_template(self) -> Result<Template, StorageError> {
        Ok(Template {
            id: self.id,
            name: self.name,
            content: self.content,
            placeholders: serde_json::from_str(&self.placeholders)?,
            is_word_template: self.is_word_template,
            storage_path: self.storage_path,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn find_template(conn: &Connection, id: &str) -> Result<Option<Template>, StorageError> {
    let record = conn
        .query_row(
            &format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1"),
            params![id],
            TemplateRecord::from_row,
        )
        .optional()?;
    record.map(TemplateRecord::into_template).transpose()
}

/// Template records in SQLite, Word documents as `{id}.docx` files in a
/// storage directory.
pub struct SqliteTemplateStore {
    database_path: PathBuf,
    storage_dir: PathBuf,
}

impl SqliteTemplateStore {
    pub fn new(database_path: impl Into<PathBuf>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            storage_dir: storage_dir.into(),
        }
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        open_database(&self.database_path)
    }

    fn store_document(&self, id: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let file_name = format!("{}.docx", id);
        let relative = checked_relative(&file_name)?;
        fs::create_dir_all(&self.storage_dir)?;
        fs::write(self.storage_dir.join(relative), bytes)?;
        debug!("Stored {} bytes as {}", bytes.len(), file_name);
        Ok(file_name)
    }

    /// Removes a stored document. A file that is already gone is not an error.
    fn remove_document(&self, path: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.storage_dir.join(checked_relative(path)?)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TemplateStore for SqliteTemplateStore {
    fn save(&self, template: &Template, document: Option<&[u8]>) -> Result<Template, StorageError> {
        let mut record = template.clone();
        if let Some(bytes) = document {
            record.storage_path = Some(self.store_document(&record.id, bytes)?);
        }

        let conn = self.connect()?;
        let previous_path = find_template(&conn, &record.id)?.and_then(|t| t.storage_path);
        // created_at is only written on insert.
        conn.execute(
            &format!(
                "INSERT INTO templates ({TEMPLATE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     content = excluded.content,
                     placeholders = excluded.placeholders,
                     is_word_template = excluded.is_word_template,
                     storage_path = excluded.storage_path,
                     updated_at = excluded.updated_at"
            ),
            params![
                record.id,
                record.name,
                record.content,
                serde_json::to_string(&record.placeholders)?,
                record.is_word_template,
                record.storage_path,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
            ],
        )?;
        info!("Saved template {} ('{}')", record.id, record.name);

        if let Some(previous) = previous_path {
            if record.storage_path.as_deref() != Some(previous.as_str()) {
                self.remove_document(&previous)?;
                debug!("Removed document {} no longer referenced", previous);
            }
        }

        Ok(find_template(&conn, &record.id)?.unwrap_or(record))
    }

    fn list(&self) -> Result<Vec<Template>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY updated_at DESC"
        ))?;
        let records = stmt
            .query_map([], TemplateRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        records.into_iter().map(TemplateRecord::into_template).collect()
    }

    fn get(&self, id: &str) -> Result<Option<Template>, StorageError> {
        find_template(&self.connect()?, id)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let conn = self.connect()?;
        if let Some(path) = find_template(&conn, id)?.and_then(|t| t.storage_path) {
            self.remove_document(&path)?;
        }
        conn.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
        info!("Deleted template {}", id);
        Ok(())
    }

    fn fetch_binary(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.storage_dir.join(checked_relative(path)?)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Drafts in the `drafts` table, keyed by (scope, key).
pub struct SqliteDraftStore {
    database_path: PathBuf,
}

impl SqliteDraftStore {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }
}

impl DraftStore for SqliteDraftStore {
    fn load(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError> {
        let conn = open_database(&self.database_path)?;
        Ok(conn
            .query_row(
                "SELECT value FROM drafts WHERE scope = ?1 AND key = ?2",
                params![scope, key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn store(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = open_database(&self.database_path)?;
        conn.execute(
            "INSERT INTO drafts (scope, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scope, key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![scope, key, value, format_timestamp(&Utc::now())],
        )?;
        Ok(())
    }

    fn clear(&self, scope: &str) -> Result<(), StorageError> {
        let conn = open_database(&self.database_path)?;
        conn.execute("DELETE FROM drafts WHERE scope = ?1", params![scope])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, SqliteTemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store =
            SqliteTemplateStore::new(dir.path().join("test.sqlite"), dir.path().join("docs"));
        (dir, store)
    }

    fn template(id: &str, name: &str, updated_at: DateTime<Utc>) -> Template {
        Template {
            id: id.into(),
            name: name.into(),
            content: "Hi {{Name}}".into(),
            placeholders: vec!["Name".into()],
            is_word_template: false,
            storage_path: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn saved_templates_can_be_read_back() {
        let (_dir, store) = store();
        let now = parse_timestamp("2026-01-02T03:04:05.678Z").unwrap();
        let saved = store.save(&template("t1", "Letter", now), None).unwrap();

        assert_eq!(saved, template("t1", "Letter", now));
        assert_eq!(store.get("t1").unwrap(), Some(saved));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn updates_keep_creation_time() {
        let (_dir, store) = store();
        let created = parse_timestamp("2026-01-01T00:00:00.000Z").unwrap();
        store.save(&template("t1", "Letter", created), None).unwrap();

        let later = created + Duration::hours(1);
        let mut renamed = template("t1", "Renamed", later);
        renamed.created_at = later;
        let saved = store.save(&renamed, None).unwrap();

        assert_eq!(saved.name, "Renamed");
        assert_eq!(saved.created_at, created);
        assert_eq!(saved.updated_at, later);
    }

    #[test]
    fn list_is_most_recent_first() {
        let (_dir, store) = store();
        let base = parse_timestamp("2026-01-01T00:00:00.000Z").unwrap();
        store.save(&template("old", "Old", base), None).unwrap();
        store.save(&template("new", "New", base + Duration::days(1)), None).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn documents_are_stored_fetched_and_deleted() {
        let (dir, store) = store();
        let mut word = template("w1", "Contract", Utc::now());
        word.is_word_template = true;
        let saved = store.save(&word, Some(b"docx bytes")).unwrap();

        let path = saved.storage_path.clone().unwrap();
        assert_eq!(path, "w1.docx");
        assert_eq!(store.fetch_binary(&path).unwrap(), Some(b"docx bytes".to_vec()));

        store.delete("w1").unwrap();
        assert_eq!(store.get("w1").unwrap(), None);
        assert_eq!(store.fetch_binary(&path).unwrap(), None);
        assert!(!dir.path().join("docs").join("w1.docx").exists());
    }

    #[test]
    fn paths_outside_the_storage_directory_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.fetch_binary("../test.sqlite"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            store.fetch_binary("/etc/passwd"),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn drafts_are_scoped_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let drafts = SqliteDraftStore::new(dir.path().join("drafts.sqlite"));

        drafts.store("s1", "form", r#"{"Name":"A"}"#).unwrap();
        drafts.store("s1", "form", r#"{"Name":"Ann"}"#).unwrap();
        drafts.store("s2", "form", r#"{"Name":"Bob"}"#).unwrap();
        assert_eq!(drafts.load("s1", "form").unwrap().as_deref(), Some(r#"{"Name":"Ann"}"#));

        drafts.clear("s1").unwrap();
        assert_eq!(drafts.load("s1", "form").unwrap(), None);
        assert_eq!(drafts.load("s2", "form").unwrap().as_deref(), Some(r#"{"Name":"Bob"}"#));
    }
}
