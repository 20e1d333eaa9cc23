//! Wire-contract string constants shared across the pipeline.
//!
//! These are equality-tested by downstream logic and referenced verbatim in
//! synthesis prompts — they are contract values, not display copy. Changing
//! any of them requires updating every consumer that compares against them.

/// Placeholder passed to the synthesis backend when no document-derived
/// rolling summary exists for a user.
pub const PLACEHOLDER_NO_DOC_SUMMARY: &str = "NO_DOCUMENT_ANALYSIS_SUMMARY_AVAILABLE_FOR_REVIEW";

/// Placeholder passed to the synthesis backend when no chat-derived
/// rolling summary exists for a user.
pub const PLACEHOLDER_NO_CHAT_SUMMARY: &str = "NO_AI_HEALTH_CHAT_SUMMARY_AVAILABLE_FOR_REVIEW";

/// Stored in the document rolling summary when nothing has been merged yet.
pub const DOCUMENT_EMPTY_SENTINEL: &str =
    "No significant document findings to summarize at this time.";

/// Stored in the chat rolling summary when nothing has been merged yet.
pub const CHAT_EMPTY_SENTINEL: &str =
    "No significant chat conclusions to summarize at this time.";

/// Appended exactly once to the end of every overall summary.
pub const MEDICAL_DISCLAIMER: &str = "Disclaimer: This summary is AI-generated for informational \
purposes only and is not a substitute for professional medical advice. Consult with a qualified \
healthcare provider for any health concerns.";

/// Category token forced onto every rejected document extraction.
pub const REJECTED_CATEGORY: &str = "rejected";

/// Stands in for the previous narrative on the very first merge of a stream.
pub const FIRST_ENTRY_MARKER: &str = "This is the first entry; there is no prior summary.";

/// Returned (plus disclaimer) when profile and both streams are provably empty.
pub const INSUFFICIENT_INFO_MESSAGE: &str =
    "There is not enough recorded health information to generate an overall summary yet.";

/// Returned (plus disclaimer) when the synthesis backend fails or goes silent.
pub const GENERATION_FAILED_MESSAGE: &str =
    "An overall health summary could not be generated at this time. Please try again later.";
