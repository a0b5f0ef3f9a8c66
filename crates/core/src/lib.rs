//! # NurseNote Core
//!
//! Core logic for turning psychiatric home-visit notes into structured records:
//! - parsing model output into a SOAP note and a care-plan draft ([`parser`])
//! - building the generation prompt from validated visit input ([`prompt`])
//! - calling the language model ([`ai`])
//! - storing visit records as sharded JSON files ([`repositories`])
//!
//! **No API concerns**: HTTP servers and command-line handling belong in `api-rest` and
//! `nursenote-cli`.

pub mod ai;
pub mod config;
pub mod constants;
pub mod error;
pub mod generation;
pub mod parser;
pub mod prompt;
pub mod records;
pub mod repositories;
pub mod visit;

pub use ai::{AiError, OpenAiClient, TextGenerator};
pub use config::{AiConfig, CoreConfig};
pub use error::{NoteError, NoteResult};
pub use generation::{GeneratedNote, GenerationService};
pub use parser::parse_response;
pub use prompt::{build_prompt, VisitContext, VisitNoteRequest};
pub use records::{Assessment, CarePlanDraft, ParsedResponse, PlanOfCare, SoapNote};
pub use repositories::{FileVisitRecordStore, VisitRecordStore};
pub use visit::{NewVisitRecord, VisitRecord, VisitRecordSummary};

pub use nursenote_uuid::RecordId;
