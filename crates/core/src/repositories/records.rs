//! File-backed visit record store.
//!
//! ```text
//! <visit_data_dir>/records/<s1>/<s2>/<id>/visit.json
//! ```
//! where `s1`/`s2` are the first four hex characters of the record id.

use super::VisitRecordStore;
use crate::config::CoreConfig;
use crate::constants::VISIT_JSON_FILENAME;
use crate::error::{NoteError, NoteResult};
use crate::visit::{NewVisitRecord, VisitRecord, VisitRecordSummary};
use chrono::Utc;
use nursenote_uuid::RecordId;
use std::cmp::Reverse;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Attempts at allocating an unused record directory before giving up.
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Stores each visit as pretty-printed JSON in its own sharded directory.
#[derive(Debug, Clone)]
pub struct FileVisitRecordStore {
    records_dir: PathBuf,
}

impl FileVisitRecordStore {
    pub fn new(records_dir: PathBuf) -> Self {
        Self { records_dir }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.records_dir())
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Creates a fresh sharded directory for a new record.
    ///
    /// Guards against id collisions and directories created behind our back by retrying with a
    /// new id.
    fn allocate_record_dir(&self) -> NoteResult<(RecordId, PathBuf)> {
        for _attempt in 0..MAX_ALLOCATION_ATTEMPTS {
            let id = RecordId::new();
            let candidate = id.sharded_dir(&self.records_dir);

            if candidate.exists() {
                continue;
            }

            if let Some(parent) = candidate.parent() {
                fs::create_dir_all(parent).map_err(NoteError::RecordDirCreation)?;
            }

            match fs::create_dir(&candidate) {
                Ok(()) => return Ok((id, candidate)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(NoteError::RecordDirCreation(e)),
            }
        }

        Err(NoteError::RecordDirCreation(io::Error::new(
            ErrorKind::AlreadyExists,
            "failed to allocate a unique record directory after 5 attempts",
        )))
    }

    fn read_record_file(path: &Path) -> NoteResult<VisitRecord> {
        let contents = fs::read_to_string(path).map_err(NoteError::FileRead)?;
        serde_json::from_str(&contents).map_err(NoteError::Deserialization)
    }

    /// Every `visit.json` path in the shard tree. Missing or unreadable directories are skipped.
    fn record_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let s1_iter = match fs::read_dir(&self.records_dir) {
            Ok(it) => it,
            Err(_) => return files,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let visit_path = id_ent.path().join(VISIT_JSON_FILENAME);
                    if visit_path.is_file() {
                        files.push(visit_path);
                    }
                }
            }
        }

        files
    }
}

impl VisitRecordStore for FileVisitRecordStore {
    /// Writes a new record and returns it with its allocated id and creation time.
    ///
    /// If the write fails after the record directory was created, the directory is removed
    /// again. Should that removal fail too, [`NoteError::CleanupAfterSaveFailed`] carries both
    /// errors.
    fn save(&self, record: NewVisitRecord) -> NoteResult<VisitRecord> {
        fs::create_dir_all(&self.records_dir).map_err(NoteError::StorageDirCreation)?;

        let (id, record_dir) = self.allocate_record_dir()?;
        let record = record.into_record(id, Utc::now());

        let write_result = serde_json::to_string_pretty(&record)
            .map_err(NoteError::Serialization)
            .and_then(|json| {
                fs::write(record_dir.join(VISIT_JSON_FILENAME), json).map_err(NoteError::FileWrite)
            });

        match write_result {
            Ok(()) => {
                tracing::debug!("saved visit record {}", id);
                Ok(record)
            }
            Err(save_error) => match fs::remove_dir_all(&record_dir) {
                Ok(()) => Err(save_error),
                Err(cleanup_error) => Err(NoteError::CleanupAfterSaveFailed {
                    path: record_dir,
                    save_error: Box::new(save_error),
                    cleanup_error,
                }),
            },
        }
    }

    /// Lists every readable record, newest visit first.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    fn list(&self) -> NoteResult<Vec<VisitRecordSummary>> {
        let mut summaries: Vec<VisitRecordSummary> = self
            .record_files()
            .into_iter()
            .filter_map(|path| match Self::read_record_file(&path) {
                Ok(record) => Some(VisitRecordSummary::from(&record)),
                Err(e) => {
                    tracing::warn!("skipping visit record {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        summaries.sort_by_key(|s| {
            Reverse((s.visit_date, s.start_time.clone(), s.created_at))
        });
        Ok(summaries)
    }

    fn read(&self, id: &RecordId) -> NoteResult<VisitRecord> {
        let path = id.sharded_dir(&self.records_dir).join(VISIT_JSON_FILENAME);
        match Self::read_record_file(&path) {
            Err(NoteError::FileRead(e)) if e.kind() == ErrorKind::NotFound => {
                Err(NoteError::RecordNotFound(id.to_string()))
            }
            other => other,
        }
    }
}
