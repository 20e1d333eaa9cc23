//! Synthesis Port — the narrow interface over the generative backend.
//!
//! One method per pipeline use case (document extraction, rolling-summary
//! merge, overall synthesis) so tests substitute a deterministic fake and
//! the fallback/invariant logic never depends on real model output.
//! `OllamaSynthesisPort` is the shipped local-inference adapter.

pub mod error;
pub mod ollama;
pub mod parser;
pub mod prompt;

pub use error::SynthesisError;
pub use ollama::OllamaSynthesisPort;

use crate::intake::DocumentExtraction;
use crate::store::{SummaryStream, UserProfileSnapshot};

/// Input for the multimodal document-extraction call.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractionRequest {
    /// Declared MIME type of the source upload.
    pub media_type: String,
    /// Extracted plain text, when the upload is text-bearing.
    pub text: Option<String>,
    /// Raw page/frame images for vision-capable backends.
    pub pages: Vec<Vec<u8>>,
}

/// Input for one rolling-summary merge call.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub stream: SummaryStream,
    /// Prior narrative; None on the first merge of a stream.
    pub previous: Option<String>,
    /// Rendered delta block (one document's findings or one chat conclusion).
    pub delta: String,
    /// Rendered profile context block; may be empty.
    pub profile: String,
}

/// Input for the overall-summary synthesis call.
///
/// The summary fields carry either real narrative text or the stream's
/// exact placeholder constant — the prompt instructs the backend to
/// distinguish the two by string equality, never by length heuristics.
#[derive(Debug, Clone)]
pub struct OverallRequest {
    pub profile: UserProfileSnapshot,
    pub document_summary: String,
    pub chat_summary: String,
}

/// Opaque, fallible generative backend.
///
/// Single attempt per call; no retry loop lives at this layer. Timeout
/// enforcement is the implementation's responsibility.
pub trait SynthesisPort: Send + Sync {
    /// Extract structured medical content from one uploaded document.
    fn extract_from_document(
        &self,
        request: &DocumentExtractionRequest,
    ) -> Result<DocumentExtraction, SynthesisError>;

    /// Weave one delta into a stream's running narrative.
    fn merge_summary(&self, request: &MergeRequest) -> Result<String, SynthesisError>;

    /// Produce one patient-facing narrative from profile + both streams.
    fn synthesize_overall(&self, request: &OverallRequest) -> Result<String, SynthesisError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Programmable fake port for merge/overall tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// What the fake should do on its next text-producing call.
    #[derive(Debug, Clone)]
    pub(crate) enum PortBehavior {
        Reply(String),
        /// Successful call, whitespace-only payload.
        Blank,
        /// Transport-style failure.
        Fail,
    }

    #[derive(Debug)]
    pub(crate) struct FakeSynthesisPort {
        pub behavior: PortBehavior,
        pub merge_calls: AtomicUsize,
        pub overall_calls: AtomicUsize,
        pub last_merge_request: Mutex<Option<MergeRequest>>,
        pub last_overall_request: Mutex<Option<OverallRequest>>,
    }

    impl FakeSynthesisPort {
        pub fn replying(text: &str) -> Self {
            Self::with_behavior(PortBehavior::Reply(text.to_string()))
        }

        pub fn failing() -> Self {
            Self::with_behavior(PortBehavior::Fail)
        }

        pub fn blank() -> Self {
            Self::with_behavior(PortBehavior::Blank)
        }

        pub fn with_behavior(behavior: PortBehavior) -> Self {
            Self {
                behavior,
                merge_calls: AtomicUsize::new(0),
                overall_calls: AtomicUsize::new(0),
                last_merge_request: Mutex::new(None),
                last_overall_request: Mutex::new(None),
            }
        }

        pub fn merge_call_count(&self) -> usize {
            self.merge_calls.load(Ordering::SeqCst)
        }

        pub fn overall_call_count(&self) -> usize {
            self.overall_calls.load(Ordering::SeqCst)
        }

        fn respond(&self) -> Result<String, SynthesisError> {
            match &self.behavior {
                PortBehavior::Reply(text) => Ok(text.clone()),
                PortBehavior::Blank => Ok("   \n  ".to_string()),
                PortBehavior::Fail => {
                    Err(SynthesisError::Connection("http://fake:11434".into()))
                }
            }
        }
    }

    impl SynthesisPort for FakeSynthesisPort {
        fn extract_from_document(
            &self,
            _request: &DocumentExtractionRequest,
        ) -> Result<DocumentExtraction, SynthesisError> {
            Err(SynthesisError::Empty)
        }

        fn merge_summary(&self, request: &MergeRequest) -> Result<String, SynthesisError> {
            self.merge_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_merge_request.lock().unwrap() = Some(request.clone());
            self.respond()
        }

        fn synthesize_overall(&self, request: &OverallRequest) -> Result<String, SynthesisError> {
            self.overall_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_overall_request.lock().unwrap() = Some(request.clone());
            self.respond()
        }
    }

    #[test]
    fn port_trait_is_object_safe() {
        fn _assert_port(_: &dyn SynthesisPort) {}
    }
}
