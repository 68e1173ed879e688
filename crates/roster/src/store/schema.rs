//! `SQLite` schema definitions for the document store.

/// SQL statement to create the documents table.
///
/// Every collection shares this table; `collection` scopes the documents and
/// `id` is unique within a collection.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    inserted_at TEXT NOT NULL,
    UNIQUE (collection, id)
)
";

/// SQL statement to create an index for per-collection scans.
pub const CREATE_COLLECTION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DOCUMENTS_TABLE,
    CREATE_COLLECTION_INDEX,
    CREATE_METADATA_TABLE,
];
