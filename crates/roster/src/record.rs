//! Core record types for roster.
//!
//! A [`StudentRecord`] is the document body written to the store. The
//! store pairs it with a [`RecordId`] once persisted.

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the record store.
///
/// Layers above the store only compare and echo identifiers back; they never
/// build or parse one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a store-issued identifier token.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, as handed out by the store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A student, as entered through the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Full name.
    pub name: String,
    /// Age in years. No range is enforced.
    pub age: i64,
    /// Contact email. Only non-emptiness is enforced.
    pub email: String,
    /// Enrolled course.
    pub course: String,
}

/// A persisted record together with its store identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStudent {
    /// Identifier assigned on insert.
    pub id: RecordId,
    /// The stored document.
    #[serde(flatten)]
    pub record: StudentRecord,
}

impl StoredStudent {
    /// Pair a record with its identifier.
    #[must_use]
    pub fn new(id: RecordId, record: StudentRecord) -> Self {
        Self { id, record }
    }
}
