//! Overall Summary Synthesizer — one patient-facing artifact per user.
//!
//! Combines the profile snapshot and both rolling narratives through a
//! single synthesis call, with an explicit TTL cache and a mandatory
//! disclaimer contract. Every failure mode has fixed fallback text; only
//! successful generations are persisted, so a failed attempt is retried
//! on the next request.

use chrono::{DateTime, Duration, Utc};

use crate::constants::{GENERATION_FAILED_MESSAGE, INSUFFICIENT_INFO_MESSAGE, MEDICAL_DISCLAIMER};
use crate::store::{KnowledgeStore, OverallSummary, SummaryStream, UserProfileSnapshot};
use crate::synthesis::{OverallRequest, SynthesisPort};

/// Cache policy for the synthesizer. TTL is explicit so the freshness
/// boundary is testable; there is no ambient process-wide state.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub cache_ttl: Duration,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self { cache_ttl: Duration::hours(24) }
    }
}

/// Stateless synthesizer; all state lives in the knowledge store.
#[derive(Debug, Clone, Default)]
pub struct OverallSynthesizer {
    config: SynthesizerConfig,
}

impl OverallSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    /// Produce the overall summary for one user at the given instant.
    ///
    /// `now` is injected rather than read from the clock so cache
    /// freshness is deterministic under test. Store failures degrade
    /// (empty profile, missing narratives) instead of propagating — a
    /// partial summary beats no summary.
    pub fn overall_summary(
        &self,
        store: &dyn KnowledgeStore,
        port: &dyn SynthesisPort,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> OverallSummary {
        if let Some(cached) = self.fresh_cached(store, user_id, now) {
            tracing::debug!(user_id, "overall summary served from cache");
            return cached;
        }

        let profile = store.profile_snapshot(user_id).unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "profile read failed, proceeding with empty profile");
            UserProfileSnapshot::default()
        });
        let document_summary = self.stream_text(store, user_id, SummaryStream::Document);
        let chat_summary = self.stream_text(store, user_id, SummaryStream::Chat);

        // Provably nothing to say: skip the backend call entirely.
        if profile.is_effectively_empty()
            && document_summary == SummaryStream::Document.placeholder()
            && chat_summary == SummaryStream::Chat.placeholder()
        {
            tracing::info!(user_id, "no profile or narratives recorded, skipping synthesis");
            return OverallSummary {
                text: append_disclaimer(INSUFFICIENT_INFO_MESSAGE),
                generated_at: now,
            };
        }

        let request = OverallRequest { profile, document_summary, chat_summary };
        match port.synthesize_overall(&request) {
            Ok(text) if !text.trim().is_empty() => {
                let summary = OverallSummary {
                    text: append_disclaimer(text.trim()),
                    generated_at: now,
                };
                if let Err(e) = store.put_overall_summary(user_id, &summary) {
                    tracing::warn!(user_id, error = %e, "failed to cache overall summary");
                }
                summary
            }
            Ok(_) => {
                tracing::warn!(user_id, "synthesis returned blank overall summary");
                self.failure_artifact(now)
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "overall synthesis failed");
                self.failure_artifact(now)
            }
        }
    }

    fn fresh_cached(
        &self,
        store: &dyn KnowledgeStore,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Option<OverallSummary> {
        let cached = match store.overall_summary(user_id) {
            Ok(cached) => cached?,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "cache read failed, regenerating");
                return None;
            }
        };

        if now.signed_duration_since(cached.generated_at) < self.config.cache_ttl {
            Some(cached)
        } else {
            None
        }
    }

    /// Text for one stream: the stored narrative, or the stream placeholder
    /// when the narrative is absent, blank, or still the empty sentinel.
    fn stream_text(
        &self,
        store: &dyn KnowledgeStore,
        user_id: &str,
        stream: SummaryStream,
    ) -> String {
        let stored = match store.rolling_summary(user_id, stream) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(user_id, stream = %stream, error = %e, "rolling summary read failed");
                None
            }
        };

        match stored {
            Some(summary)
                if !summary.text.trim().is_empty()
                    && summary.text.trim() != stream.empty_sentinel() =>
            {
                summary.text
            }
            _ => stream.placeholder().to_string(),
        }
    }

    /// Failure artifacts are returned but never persisted.
    fn failure_artifact(&self, now: DateTime<Utc>) -> OverallSummary {
        OverallSummary { text: append_disclaimer(GENERATION_FAILED_MESSAGE), generated_at: now }
    }
}

/// Append the fixed disclaimer unless the text already contains it.
/// Idempotent: a backend that echoes the disclaimer does not double it.
pub fn append_disclaimer(text: &str) -> String {
    if text.contains(MEDICAL_DISCLAIMER) {
        text.to_string()
    } else {
        format!("{}\n\n{}", text.trim_end(), MEDICAL_DISCLAIMER)
    }
}
