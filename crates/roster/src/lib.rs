//! `roster` - Student records backed by an embedded document store
//!
//! This library provides the entry form, the record table, the record store
//! gateway, and the shell that wires the add, refresh and delete actions
//! between them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod logging;
pub mod record;
pub mod shell;
pub mod store;
pub mod table;

pub use config::Config;
pub use error::{Error, Result, ValidationError};
pub use form::{Field, Form};
pub use logging::init_logging;
pub use record::{RecordId, StoredStudent, StudentRecord};
pub use shell::{Feedback, Notice, Outcome, Shell};
pub use store::{Deletion, DocumentStore, RecordStore};
pub use table::TableView;
