//! Rolling Summary Merger — sequential, append-oriented narrative merging.
//!
//! One protocol, two instantiations (document deltas, chat deltas). The
//! merge never produces an empty narrative and never destroys previously
//! recorded content: backend failure falls back to the unmodified prior
//! text, and an empty delta over an empty stream short-circuits to the
//! stream sentinel without touching the backend at all.
//!
//! Two concurrent merges on the same (user, stream) are not coordinated
//! here; callers needing strict accumulation serialize per stream.

pub mod types;

pub use types::{
    ChatConclusion, ChatDelta, DocumentDelta, HighConfidenceCondition, MergeProfileContext,
    SummaryDelta, CHAT_CONDITION_CERTAINTY_FLOOR,
};

use chrono::{DateTime, Utc};

use crate::store::RollingSummary;
use crate::synthesis::{MergeRequest, SynthesisPort};

/// Outcome of one merge call. `text` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub text: String,
    /// False when the empty-delta short-circuit fired.
    pub port_invoked: bool,
    /// True when backend failure forced the fallback path.
    pub fell_back: bool,
}

impl MergeResult {
    /// Wrap the merged text for persistence by the caller.
    pub fn into_rolling_summary(self, now: DateTime<Utc>) -> RollingSummary {
        RollingSummary { text: self.text, last_updated: now }
    }
}

/// Fold one delta into a stream's rolling narrative.
///
/// `previous` is the stored narrative, or None before the first merge.
/// Failures from the synthesis backend are converted into fallbacks here,
/// never propagated.
pub fn merge_rolling_summary<D: SummaryDelta>(
    port: &dyn SynthesisPort,
    previous: Option<&str>,
    delta: &D,
    profile: &MergeProfileContext,
) -> MergeResult {
    let stream = delta.stream();

    // The stream sentinel records "nothing yet"; treat it like absence.
    let has_prior_content = previous
        .map(str::trim)
        .is_some_and(|p| !p.is_empty() && p != stream.empty_sentinel());

    if !has_prior_content && delta.is_empty() {
        tracing::debug!(stream = %stream, "empty delta over empty stream, skipping synthesis");
        return MergeResult {
            text: stream.empty_sentinel().to_string(),
            port_invoked: false,
            fell_back: false,
        };
    }

    let request = MergeRequest {
        stream,
        previous: if has_prior_content { previous.map(String::from) } else { None },
        delta: delta.render(),
        profile: profile.render(),
    };

    match port.merge_summary(&request) {
        Ok(text) if !text.trim().is_empty() => MergeResult {
            text: text.trim().to_string(),
            port_invoked: true,
            fell_back: false,
        },
        Ok(_) => {
            tracing::warn!(stream = %stream, "synthesis returned blank merge output, falling back");
            fallback(previous, stream)
        }
        Err(e) => {
            tracing::warn!(stream = %stream, error = %e, "synthesis merge failed, falling back");
            fallback(previous, stream)
        }
    }
}

/// Never-empty guard: keep the prior text byte-for-byte when it exists,
/// else the stream sentinel.
fn fallback(previous: Option<&str>, stream: crate::store::SummaryStream) -> MergeResult {
    let text = match previous {
        Some(p) if !p.trim().is_empty() => p.to_string(),
        _ => stream.empty_sentinel().to_string(),
    };
    MergeResult { text, port_invoked: true, fell_back: true }
}
