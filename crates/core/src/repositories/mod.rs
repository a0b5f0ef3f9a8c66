//! Visit record persistence.
//!
//! [`VisitRecordStore`] is the seam between the generation flow and storage. The file-backed
//! implementation in [`records`] is what the service runs with.

pub mod records;

pub use records::FileVisitRecordStore;

use crate::error::NoteResult;
use crate::visit::{NewVisitRecord, VisitRecord, VisitRecordSummary};
use nursenote_uuid::RecordId;

pub trait VisitRecordStore: Send + Sync {
    /// Persists a new record, assigning its id and creation time.
    fn save(&self, record: NewVisitRecord) -> NoteResult<VisitRecord>;

    /// Summaries of all stored records, newest visit first.
    fn list(&self) -> NoteResult<Vec<VisitRecordSummary>>;

    /// # Errors
    ///
    /// Returns `NoteError::RecordNotFound` when no record has this id.
    fn read(&self, id: &RecordId) -> NoteResult<VisitRecord>;
}
