//! Visit record identifiers and the sharded storage layout derived from them.
//!
//! Visit records are stored one directory per record. Identifiers used for storage always take
//! the *canonical* form: **32 lowercase hexadecimal characters**, no hyphens, which is what
//! `Uuid::new_v4().simple().to_string()` produces.
//!
//! Identifiers coming from outside (REST paths, CLI arguments) must already be canonical;
//! [`RecordId::parse`] rejects hyphenated, uppercase or otherwise malformed input rather than
//! normalising it, so a record has exactly one spelling on disk and in URLs.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, a record lives under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `visit_data/records/55/0e/550e8400e29b41d4a716446655440000/visit.json`
//!
//! Two levels of two hex characters keep any single directory to at most 256 entries until the
//! leaf level.

mod record_id;

pub use record_id::{RecordId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// The supplied identifier is not in canonical form.
    #[error("invalid record id: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
