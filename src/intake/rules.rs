//! Ordered intake rule table.
//!
//! Each rule is a named `(context) -> outcome` entry; the dispatcher in
//! `intake::validate` walks the table top to bottom and the first terminal
//! outcome wins. Keeping the rules data-driven makes each one independently
//! unit-testable and the whole set auditable without reading control flow.

use std::sync::LazyLock;

use regex::Regex;

use super::types::IntakeContext;

/// Reject: the upload's MIME type is outside the supported set.
pub const REASON_UNSUPPORTED_MEDIA: &str =
    "Unsupported file type for medical document analysis.";

/// Reject: the raw bytes could not be fetched/prepared upstream.
pub const REASON_CONTENT_UNAVAILABLE: &str =
    "Could not retrieve document content for analysis.";

/// Fallback reason when the extraction says "not medical" but gives none.
pub const REASON_NOT_MEDICAL: &str =
    "The document does not appear to be a medical document.";

/// Reject: boilerplate saturation, oversized metric, or garbled text.
pub const REASON_MALFORMED: &str =
    "Document analysis produced malformed or non-medical content.";

/// Reject: runaway generation.
pub const REASON_SUMMARY_TOO_LONG: &str =
    "Document analysis produced an implausibly long summary.";

/// Reject: degenerate short output.
pub const REASON_SUMMARY_TOO_SHORT: &str = "Summary too short to be meaningful.";

/// Reject: nothing fired, no explicit verdict, no secondary evidence.
pub const REASON_NO_MEDICAL_EVIDENCE: &str =
    "No recognizable medical content was found in the document.";

/// MIME types the pipeline accepts for upload analysis.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
    "text/plain",
    "text/markdown",
    "video/mp4",
    "video/quicktime",
    "video/webm",
];

/// Boilerplate phrases the extraction model emits instead of content.
/// Matched case-insensitively as substrings; more than one occurrence
/// across the whole extraction means the output is disclaimer filler.
const BOILERPLATE_PHRASES: &[&str] = &[
    "consult a medical professional",
    "consult with a medical expert",
    "consult a medical expert",
    "consult your healthcare provider",
    "cannot provide clinical advice",
    "unable to provide medical advice",
    "for research purposes",
    "for documentation purposes",
    "not intended as medical advice",
];

const MAX_BOILERPLATE_OCCURRENCES: usize = 1;
const MAX_METRIC_TEXT_LEN: usize = 250;
const MAX_SUMMARY_LEN: usize = 2000;
const MIN_SUMMARY_LEN: usize = 20;
const GIBBERISH_LEN_FLOOR: usize = 100;
const GIBBERISH_MIN_TOKENS: usize = 5;
/// Minimum summary length for image/video acceptance without structured data.
const VISUAL_SUMMARY_MIN_LEN: usize = 40;

/// Phrases a summary legitimately carries when the model itself reported a
/// processing failure — such summaries skip the too-short rejection so the
/// model's own explanation is preserved.
static NEGATIVE_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)unable to (process|analy[sz]e|read|extract)",
        r"(?i)could not be (processed|analy[sz]ed|read)",
        r"(?i)not (a|an) medical",
        r"(?i)no medical (content|information|data)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static intake pattern must compile"))
    .collect()
});

/// What a single rule decided for this extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Rule does not apply; evaluate the next one.
    Continue,
    Reject { reason: String },
    Accept,
}

/// One named entry of the ordered rule table.
pub struct IntakeRule {
    pub name: &'static str,
    pub check: fn(&IntakeContext) -> RuleOutcome,
}

/// The ordered rule set. First terminal outcome wins; the final
/// secondary-evidence rule is always terminal.
pub static INTAKE_RULES: &[IntakeRule] = &[
    IntakeRule { name: "media_type_gate", check: media_type_gate },
    IntakeRule { name: "content_retrieved", check: content_retrieved },
    IntakeRule { name: "explicit_negative_verdict", check: explicit_negative_verdict },
    IntakeRule { name: "boilerplate_density", check: boilerplate_density },
    IntakeRule { name: "summary_too_long", check: summary_too_long },
    IntakeRule { name: "summary_too_short", check: summary_too_short },
    IntakeRule { name: "gibberish_summary", check: gibberish_summary },
    IntakeRule { name: "explicit_positive_verdict", check: explicit_positive_verdict },
    IntakeRule { name: "secondary_evidence", check: secondary_evidence },
];

/// Strip parameters and normalize case: "Image/JPEG; q=1" -> "image/jpeg".
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

pub fn is_supported_media_type(media_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES.contains(&essence(media_type).as_str())
}

fn is_visual_media(media_type: &str) -> bool {
    let base = essence(media_type);
    base.starts_with("image/") || base.starts_with("video/")
}

fn contains_negative_marker(text: &str) -> bool {
    NEGATIVE_MARKERS.iter().any(|re| re.is_match(text))
}

fn media_type_gate(ctx: &IntakeContext) -> RuleOutcome {
    if is_supported_media_type(ctx.media_type) {
        RuleOutcome::Continue
    } else {
        RuleOutcome::Reject { reason: REASON_UNSUPPORTED_MEDIA.to_string() }
    }
}

fn content_retrieved(ctx: &IntakeContext) -> RuleOutcome {
    if ctx.content_retrieved {
        RuleOutcome::Continue
    } else {
        RuleOutcome::Reject { reason: REASON_CONTENT_UNAVAILABLE.to_string() }
    }
}

/// The extraction itself says the source is not medical: take that verdict
/// as-is, passing through its stated reason.
fn explicit_negative_verdict(ctx: &IntakeContext) -> RuleOutcome {
    if ctx.extraction.is_medical_document == Some(false) {
        let reason = ctx
            .extraction
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(REASON_NOT_MEDICAL)
            .to_string();
        RuleOutcome::Reject { reason }
    } else {
        RuleOutcome::Continue
    }
}

/// Count boilerplate phrase occurrences across the summary and every
/// serialized metric; also flags any single metric whose text is so long
/// the model stuffed prose into a structured field.
fn boilerplate_density(ctx: &IntakeContext) -> RuleOutcome {
    let mut occurrences = count_boilerplate(&ctx.extraction.overall_summary);

    for metric in &ctx.extraction.key_metrics {
        let text = metric.concatenated_text();
        if text.chars().count() > MAX_METRIC_TEXT_LEN {
            return RuleOutcome::Reject { reason: REASON_MALFORMED.to_string() };
        }
        occurrences += count_boilerplate(&text);
    }

    if occurrences > MAX_BOILERPLATE_OCCURRENCES {
        RuleOutcome::Reject { reason: REASON_MALFORMED.to_string() }
    } else {
        RuleOutcome::Continue
    }
}

fn count_boilerplate(text: &str) -> usize {
    let lowered = text.to_lowercase();
    BOILERPLATE_PHRASES
        .iter()
        .map(|phrase| lowered.matches(phrase).count())
        .sum()
}

fn summary_too_long(ctx: &IntakeContext) -> RuleOutcome {
    if ctx.extraction.overall_summary.chars().count() > MAX_SUMMARY_LEN {
        RuleOutcome::Reject { reason: REASON_SUMMARY_TOO_LONG.to_string() }
    } else {
        RuleOutcome::Continue
    }
}

/// Too short to mean anything — unless a rejection reason is already carried
/// or the text is the model's own "unable to process" style explanation.
fn summary_too_short(ctx: &IntakeContext) -> RuleOutcome {
    let summary = ctx.extraction.overall_summary.trim();
    let already_explained = ctx
        .extraction
        .rejection_reason
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());

    if summary.chars().count() < MIN_SUMMARY_LEN
        && !already_explained
        && !contains_negative_marker(summary)
    {
        RuleOutcome::Reject { reason: REASON_SUMMARY_TOO_SHORT.to_string() }
    } else {
        RuleOutcome::Continue
    }
}

/// Long but nearly token-free text is an encoding artifact, not a summary.
fn gibberish_summary(ctx: &IntakeContext) -> RuleOutcome {
    let summary = &ctx.extraction.overall_summary;
    if summary.chars().count() > GIBBERISH_LEN_FLOOR
        && summary.split_whitespace().count() < GIBBERISH_MIN_TOKENS
    {
        RuleOutcome::Reject { reason: REASON_MALFORMED.to_string() }
    } else {
        RuleOutcome::Continue
    }
}

fn explicit_positive_verdict(ctx: &IntakeContext) -> RuleOutcome {
    if ctx.extraction.is_medical_document == Some(true) {
        RuleOutcome::Accept
    } else {
        RuleOutcome::Continue
    }
}

/// No explicit verdict was ever supplied: infer acceptance from structured
/// evidence, or — for image/video uploads — a substantial non-negative
/// summary. Always terminal.
fn secondary_evidence(ctx: &IntakeContext) -> RuleOutcome {
    if ctx.extraction.has_structured_evidence() {
        return RuleOutcome::Accept;
    }

    let summary = ctx.extraction.overall_summary.trim();
    if is_visual_media(ctx.media_type)
        && summary.chars().count() >= VISUAL_SUMMARY_MIN_LEN
        && !contains_negative_marker(summary)
    {
        return RuleOutcome::Accept;
    }

    RuleOutcome::Reject { reason: REASON_NO_MEDICAL_EVIDENCE.to_string() }
}
