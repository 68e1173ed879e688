//! Record store gateway.
//!
//! [`RecordStore`] is the only boundary between the shell and persistence.
//! [`DocumentStore`] implements it on an embedded `SQLite` file that holds
//! JSON documents grouped into named collections.

mod document;
pub mod migrations;
pub mod schema;

pub use document::{DocumentStore, StoreStats};

use crate::error::Result;
use crate::record::{RecordId, StoredStudent, StudentRecord};

/// Result of a delete-by-identifier call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// A record with the identifier existed and was removed.
    Deleted,
    /// No record had the identifier.
    NotFound,
}

/// Persistence operations the shell relies on.
///
/// Implementations issue identifiers; callers treat them as opaque.
pub trait RecordStore {
    /// Persist a new record and return its freshly assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be reached.
    fn insert(&self, record: &StudentRecord) -> Result<RecordId>;

    /// Every stored record, in store-defined order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be reached.
    fn list_all(&self) -> Result<Vec<StoredStudent>>;

    /// Remove the record with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be reached. A missing
    /// identifier is not an error; it yields [`Deletion::NotFound`].
    fn delete_by_id(&self, id: &RecordId) -> Result<Deletion>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn insert(&self, record: &StudentRecord) -> Result<RecordId> {
        (**self).insert(record)
    }

    fn list_all(&self) -> Result<Vec<StoredStudent>> {
        (**self).list_all()
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<Deletion> {
        (**self).delete_by_id(id)
    }
}
