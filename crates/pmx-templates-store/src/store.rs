use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use pmx_templates::{BuildError, Template, TemplateBuilder, parse_template};
use tracing::debug;

use crate::schema;

/// Listing row for a stored template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub name: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub template_type: Option<String>,
    pub image_count: u64,
}

/// A SQLite-backed template store.
///
/// Templates are keyed by name: saving a template whose name already exists
/// replaces the stored copy.
pub struct TemplateStore {
    conn: Mutex<rusqlite::Connection>,
}

impl TemplateStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            rusqlite::Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: rusqlite::Connection) -> Result<Self, StoreError> {
        schema::migrations()
            .to_latest(&mut conn)
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))
    }

    /// Insert or replace a template by name.
    pub fn save_template(&self, template: &Template) -> Result<(), StoreError> {
        let template_json = serde_json::to_string(template)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO templates
                (name, description, keywords, template_type, image_count, template_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                template.name,
                template.description,
                template.keywords,
                template.template_type,
                template.image_count() as i64,
                template_json,
                now_epoch_secs(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(template = %template.name, "stored template");
        Ok(())
    }

    pub fn find_by_name(&self, name: &str) -> Result<Template, StoreError> {
        let conn = self.conn()?;

        let json: String = conn
            .query_row(
                "SELECT template_json FROM templates WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(name.to_owned()),
                other => StoreError::Database(other.to_string()),
            })?;

        serde_json::from_str(&json).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// All stored templates, ordered by name.
    pub fn list(&self) -> Result<Vec<TemplateSummary>, StoreError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT name, description, keywords, template_type, image_count
                 FROM templates
                 ORDER BY name",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let image_count: i64 = row.get(4)?;
                Ok(TemplateSummary {
                    name: row.get(0)?,
                    description: row.get(1)?,
                    keywords: row.get(2)?,
                    template_type: row.get(3)?,
                    image_count: image_count.max(0) as u64,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Remove a template. Returns whether anything was deleted.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM templates WHERE name = ?1", [name])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(removed > 0)
    }
}

/// Parses `.pmx` content and persists the result.
#[async_trait::async_trait]
impl TemplateBuilder for TemplateStore {
    async fn build(&self, raw_content: &str) -> Result<Template, BuildError> {
        let template = parse_template(raw_content)?;
        self.save_template(&template)
            .map_err(|e| BuildError::Storage(e.to_string()))?;
        Ok(template)
    }
}

/// Errors specific to store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

fn now_epoch_secs() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now.to_string()
}
