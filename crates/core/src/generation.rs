//! Visit-note generation flow.

use crate::ai::TextGenerator;
use crate::error::NoteResult;
use crate::parser::parse_response;
use crate::prompt::{build_prompt, VisitContext, VisitNoteRequest};
use crate::records::ParsedResponse;
use crate::repositories::VisitRecordStore;
use crate::visit::NewVisitRecord;
use nursenote_uuid::RecordId;
use std::sync::Arc;

/// Result of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedNote {
    /// Trimmed model output, exactly as returned to the caller.
    pub output: String,
    pub parsed: ParsedResponse,
    /// `None` when the record could not be stored.
    pub record_id: Option<RecordId>,
}

/// Validates a visit, asks the model for a note, parses it and stores the result.
#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn VisitRecordStore>,
}

impl GenerationService {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<dyn VisitRecordStore>) -> Self {
        Self { generator, store }
    }

    pub fn store(&self) -> &Arc<dyn VisitRecordStore> {
        &self.store
    }

    /// Runs the full flow for one visit.
    ///
    /// A storage failure does not fail the call: the nurse still gets the generated text, and
    /// the failure is logged.
    ///
    /// # Errors
    ///
    /// - `NoteError::InvalidInput` / `NoteError::Types` for an invalid request,
    /// - `NoteError::Ai` when generation fails.
    pub async fn generate(&self, request: VisitNoteRequest) -> NoteResult<GeneratedNote> {
        let context = VisitContext::from_request(request)?;
        let prompt = build_prompt(&context);

        let output = self.generator.generate(&prompt).await?;
        let parsed = parse_response(&output);

        let missing = parsed.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "generated note is missing fields");
        }

        let new_record = NewVisitRecord::new(&context, output.clone(), parsed.clone());
        let store = Arc::clone(&self.store);
        let record_id = match tokio::task::spawn_blocking(move || store.save(new_record)).await {
            Ok(Ok(record)) => Some(record.id),
            Ok(Err(e)) => {
                tracing::error!("failed to save visit record: {}", e);
                None
            }
            Err(e) => {
                tracing::error!("visit record save task failed: {}", e);
                None
            }
        };

        Ok(GeneratedNote {
            output,
            parsed,
            record_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::repositories::FileVisitRecordStore;
    use crate::visit::{VisitRecord, VisitRecordSummary};
    use crate::NoteError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const OUTPUT: &str = "S（主観）\n眠れない\n\nO（客観）\n表情硬い\n\n【看護計画書】\n長期目標：\n安定した生活";

    struct FakeGenerator {
        reply: Result<&'static str, ()>,
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.contains("【入力情報】"));
            match self.reply {
                Ok(text) => Ok(text.to_owned()),
                Err(()) => Err(AiError::EmptyResponse),
            }
        }
    }

    struct BrokenStore;

    impl VisitRecordStore for BrokenStore {
        fn save(&self, _record: NewVisitRecord) -> NoteResult<VisitRecord> {
            Err(NoteError::FileWrite(std::io::Error::other("disk full")))
        }

        fn list(&self) -> NoteResult<Vec<VisitRecordSummary>> {
            Ok(Vec::new())
        }

        fn read(&self, id: &RecordId) -> NoteResult<VisitRecord> {
            Err(NoteError::RecordNotFound(id.to_string()))
        }
    }

    /// Fails unless called off the async worker threads.
    struct BlockingOnlyStore {
        inner: FileVisitRecordStore,
    }

    impl VisitRecordStore for BlockingOnlyStore {
        fn save(&self, record: NewVisitRecord) -> NoteResult<VisitRecord> {
            tokio::runtime::Handle::current().block_on(async {});
            self.inner.save(record)
        }

        fn list(&self) -> NoteResult<Vec<VisitRecordSummary>> {
            self.inner.list()
        }

        fn read(&self, id: &RecordId) -> NoteResult<VisitRecord> {
            self.inner.read(id)
        }
    }

    fn request() -> VisitNoteRequest {
        VisitNoteRequest {
            patient_name: "山田 太郎".into(),
            diagnosis: "統合失調症".into(),
            visit_date: "2024-01-15".into(),
            start_time: "14:00".into(),
            end_time: "15:00".into(),
            s_text: "眠れない".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generate_parses_and_stores() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileVisitRecordStore::new(temp_dir.path().to_path_buf()));
        let service = GenerationService::new(FakeGenerator::replying(OUTPUT), store.clone());

        let note = service.generate(request()).await.unwrap();
        assert_eq!(note.output, OUTPUT);
        assert_eq!(note.parsed.soap.subjective, "眠れない");
        assert_eq!(note.parsed.soap.objective, "表情硬い");
        assert_eq!(note.parsed.plan.long_term_goal, "安定した生活");

        let id = note.record_id.expect("record should be stored");
        let stored = store.read(&id).unwrap();
        assert_eq!(stored.patient_name, "山田 太郎");
        assert_eq!(stored.output, OUTPUT);
        assert_eq!(stored.soap_output, note.parsed.soap);
        assert_eq!(stored.plan_output, note.parsed.plan);
    }

    #[tokio::test]
    async fn test_generate_survives_storage_failure() {
        let service =
            GenerationService::new(FakeGenerator::replying(OUTPUT), Arc::new(BrokenStore));
        let note = service.generate(request()).await.unwrap();
        assert_eq!(note.record_id, None);
        assert_eq!(note.parsed.soap.subjective, "眠れない");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_runs_on_blocking_thread() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(BlockingOnlyStore {
            inner: FileVisitRecordStore::new(temp_dir.path().to_path_buf()),
        });
        let service = GenerationService::new(FakeGenerator::replying(OUTPUT), store.clone());

        let note = service.generate(request()).await.unwrap();
        let id = note.record_id.expect("record should be stored");
        assert_eq!(store.read(&id).unwrap().output, OUTPUT);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_generator() {
        let generator = FakeGenerator::replying(OUTPUT);
        let service = GenerationService::new(generator.clone(), Arc::new(BrokenStore));

        let mut req = request();
        req.s_text.clear();
        let err = service.generate(req).await.unwrap_err();
        assert!(matches!(err, NoteError::InvalidInput(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generator_error_is_returned() {
        let service = GenerationService::new(FakeGenerator::failing(), Arc::new(BrokenStore));
        let err = service.generate(request()).await.unwrap_err();
        assert!(matches!(err, NoteError::Ai(AiError::EmptyResponse)));
    }
}
