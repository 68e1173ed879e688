//! Embedded document store.
//!
//! Each database is one `SQLite` file. Documents are JSON bodies grouped by
//! collection name and keyed by a store-generated identifier.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::{migrations, Deletion, RecordStore};
use crate::error::{Error, Result};
use crate::record::{RecordId, StoredStudent, StudentRecord};

/// Hex characters in a generated identifier (12 bytes).
const ID_HEX_LEN: usize = 24;

/// Process-local sequence mixed into every identifier.
static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A connection to one collection of one document database.
///
/// The connection is opened once and held until [`DocumentStore::close`]
/// or drop.
#[derive(Debug)]
pub struct DocumentStore {
    /// Path to the database file.
    path: PathBuf,
    /// Collection all operations are scoped to.
    collection: String,
    /// Database connection.
    conn: Connection,
}

impl DocumentStore {
    /// Open or create the database at `path` and bind to `collection`.
    ///
    /// Creates parent directories and initializes the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created, or
    /// schema initialization fails.
    pub fn open(path: impl AsRef<Path>, collection: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening document store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        let collection = collection.into();
        info!(
            "Document store opened at {} (collection '{}')",
            path.display(),
            collection
        );
        Ok(Self {
            path,
            collection,
            conn,
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(collection: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            collection: collection.into(),
            conn,
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the bound collection.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of documents in the bound collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [&self.collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Statistics about the bound collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_records = self.count()?;

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT inserted_at FROM documents WHERE collection = ?1 ORDER BY seq ASC LIMIT 1",
                [&self.collection],
                |row| row.get(0),
            )
            .optional()?;
        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT inserted_at FROM documents WHERE collection = ?1 ORDER BY seq DESC LIMIT 1",
                [&self.collection],
                |row| row.get(0),
            )
            .optional()?;

        let parse = |s: String| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            path: self.path.clone(),
            collection: self.collection.clone(),
            total_records,
            oldest_insert: oldest.and_then(parse),
            newest_insert: newest.and_then(parse),
            db_size_bytes,
        })
    }

    /// Release the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` refuses to close, e.g. with unfinished
    /// statements outstanding.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, err)| Error::from(err))?;
        info!("Document store at {} closed", path.display());
        Ok(())
    }

    fn generate_id() -> RecordId {
        let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let mut hasher = blake3::Hasher::new();
        hasher.update(&nanos.to_le_bytes());
        hasher.update(&std::process::id().to_le_bytes());
        hasher.update(&sequence.to_le_bytes());
        let hex = hasher.finalize().to_hex();

        RecordId::from_token(&hex.as_str()[..ID_HEX_LEN])
    }
}

impl RecordStore for DocumentStore {
    fn insert(&self, record: &StudentRecord) -> Result<RecordId> {
        let id = Self::generate_id();
        let body = serde_json::to_string(record)?;
        let inserted_at = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            INSERT INTO documents (collection, id, body, inserted_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![self.collection, id.as_str(), body, inserted_at],
        )?;

        info!("Inserted document {} into '{}'", id, self.collection);
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<StoredStudent>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, body FROM documents
            WHERE collection = ?1 ORDER BY seq ASC
            ",
        )?;

        let rows = stmt
            .query_map([&self.collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Undecodable bodies are skipped so the rest of the collection stays visible.
        let students: Vec<_> = rows
            .into_iter()
            .filter_map(|(id, body)| match serde_json::from_str::<StudentRecord>(&body) {
                Ok(record) => Some(StoredStudent::new(RecordId::from_token(id), record)),
                Err(err) => {
                    warn!(
                        "Skipping malformed document {} in '{}': {}",
                        id, self.collection, err
                    );
                    None
                }
            })
            .collect();

        debug!(
            "Listed {} documents from '{}'",
            students.len(),
            self.collection
        );
        Ok(students)
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<Deletion> {
        let affected = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![self.collection, id.as_str()],
        )?;

        if affected > 0 {
            info!("Deleted document {} from '{}'", id, self.collection);
            Ok(Deletion::Deleted)
        } else {
            debug!("No document {} in '{}' to delete", id, self.collection);
            Ok(Deletion::NotFound)
        }
    }
}

/// Statistics about one collection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Path to the database file.
    pub path: PathBuf,
    /// Collection name.
    pub collection: String,
    /// Number of records in the collection.
    pub total_records: i64,
    /// Insertion time of the oldest record.
    pub oldest_insert: Option<DateTime<Utc>>,
    /// Insertion time of the newest record.
    pub newest_insert: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
