//! Delta shapes folded into rolling summaries.
//!
//! The merger is generic over `SummaryDelta`: one implementation per
//! knowledge stream. Emptiness is decided here; truthfulness is not —
//! that belongs to the intake validator (documents) or the caller's
//! certainty threshold (chat).

use serde::{Deserialize, Serialize};

use crate::intake::{Metric, ValidationVerdict};
use crate::store::{SummaryStream, UserProfileSnapshot};

/// Certainty floor callers must apply before recording a chat condition.
/// The merger does not re-filter against it.
pub const CHAT_CONDITION_CERTAINTY_FLOOR: u8 = 85;

/// A condition the chat model asserted with high certainty (0..100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighConfidenceCondition {
    pub condition: String,
    pub certainty: u8,
}

/// Summary of one chat session worth recording. Never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConclusion {
    pub chat_date: Option<String>,
    pub chat_title: Option<String>,
    pub key_symptoms_discussed: Vec<String>,
    /// Entries already satisfy the certainty floor when passed in.
    pub high_confidence_conditions: Vec<HighConfidenceCondition>,
}

/// Profile fields handed to the merge prompt for context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeProfileContext {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub existing_conditions: Vec<String>,
}

impl MergeProfileContext {
    pub fn from_snapshot(snapshot: &UserProfileSnapshot) -> Self {
        Self {
            age: snapshot.age,
            gender: snapshot.gender.clone(),
            existing_conditions: snapshot.existing_conditions.clone(),
        }
    }

    /// Prose block for the merge prompt; empty when nothing is known.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(age) = self.age {
            lines.push(format!("Age: {age}"));
        }
        if let Some(gender) = self.gender.as_deref().filter(|g| !g.trim().is_empty()) {
            lines.push(format!("Gender: {gender}"));
        }
        if !self.existing_conditions.is_empty() {
            lines.push(format!("Known conditions: {}", self.existing_conditions.join("; ")));
        }
        lines.join("\n")
    }
}

/// One unit of new knowledge for a single stream.
pub trait SummaryDelta {
    fn stream(&self) -> SummaryStream;

    /// True when the delta carries no actionable content; empty deltas
    /// never reach the synthesis backend.
    fn is_empty(&self) -> bool;

    /// Prose block describing the delta for the merge prompt.
    fn render(&self) -> String;
}

/// Document-derived delta, built from an intake verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDelta {
    accepted: bool,
    document_date: Option<String>,
    category: Option<String>,
    summary: String,
    key_metrics: Vec<Metric>,
    conditions: Vec<String>,
    medications: Vec<String>,
}

impl DocumentDelta {
    /// Build from a verdict. A rejected verdict yields an empty delta —
    /// rejected extractions carry no mergeable content by construction.
    pub fn from_verdict(verdict: &ValidationVerdict) -> Self {
        let sanitized = &verdict.sanitized;
        Self {
            accepted: verdict.accepted,
            document_date: sanitized.document_date.clone(),
            category: sanitized.suggested_category.clone(),
            summary: sanitized.overall_summary.clone(),
            key_metrics: sanitized.key_metrics.clone(),
            conditions: sanitized.identified_conditions.clone(),
            medications: sanitized.mentioned_medications.clone(),
        }
    }
}

impl SummaryDelta for DocumentDelta {
    fn stream(&self) -> SummaryStream {
        SummaryStream::Document
    }

    fn is_empty(&self) -> bool {
        !self.accepted
            || (self.key_metrics.is_empty()
                && self.conditions.is_empty()
                && self.medications.is_empty()
                && self.summary.trim().is_empty())
    }

    fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(date) = &self.document_date {
            lines.push(format!("Document date: {date}"));
        }
        if let Some(category) = &self.category {
            lines.push(format!("Category: {category}"));
        }
        if !self.summary.trim().is_empty() {
            lines.push(format!("Summary: {}", self.summary.trim()));
        }
        if !self.key_metrics.is_empty() {
            lines.push("Metrics:".to_string());
            for metric in &self.key_metrics {
                let mut entry = format!("- {}: {}", metric.name, metric.value);
                if let Some(unit) = &metric.unit {
                    entry.push_str(&format!(" {unit}"));
                }
                if let Some(range) = &metric.normal_range {
                    entry.push_str(&format!(" (normal {range})"));
                }
                if let Some(date) = &metric.date {
                    entry.push_str(&format!(" on {date}"));
                }
                lines.push(entry);
            }
        }
        if !self.conditions.is_empty() {
            lines.push(format!("Conditions: {}", self.conditions.join("; ")));
        }
        if !self.medications.is_empty() {
            lines.push(format!("Medications: {}", self.medications.join("; ")));
        }
        lines.join("\n")
    }
}

/// Chat-derived delta wrapping one recorded conclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDelta(pub ChatConclusion);

impl SummaryDelta for ChatDelta {
    fn stream(&self) -> SummaryStream {
        SummaryStream::Chat
    }

    fn is_empty(&self) -> bool {
        let conclusion = &self.0;
        conclusion.key_symptoms_discussed.iter().all(|s| s.trim().is_empty())
            && conclusion.high_confidence_conditions.is_empty()
    }

    fn render(&self) -> String {
        let conclusion = &self.0;
        let mut lines = Vec::new();
        if let Some(date) = &conclusion.chat_date {
            lines.push(format!("Chat date: {date}"));
        }
        if let Some(title) = &conclusion.chat_title {
            lines.push(format!("Topic: {title}"));
        }
        let symptoms: Vec<&str> = conclusion
            .key_symptoms_discussed
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !symptoms.is_empty() {
            lines.push(format!("Symptoms discussed: {}", symptoms.join("; ")));
        }
        if !conclusion.high_confidence_conditions.is_empty() {
            lines.push("High-confidence findings:".to_string());
            for finding in &conclusion.high_confidence_conditions {
                lines.push(format!("- {} ({}% certainty)", finding.condition, finding.certainty));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::DocumentExtraction;

    #[test]
    fn rejected_verdict_yields_empty_document_delta() {
        let extraction = DocumentExtraction {
            overall_summary: "ok".into(),
            ..Default::default()
        };
        let verdict = ValidationVerdict::rejected("too short".into(), &extraction);
        let delta = DocumentDelta::from_verdict(&verdict);
        assert!(delta.is_empty());
    }

    #[test]
    fn accepted_verdict_with_content_is_not_empty() {
        let extraction = DocumentExtraction {
            is_medical_document: Some(true),
            overall_summary: "Blood pressure log covering March.".into(),
            mentioned_medications: vec!["amlodipine".into()],
            ..Default::default()
        };
        let verdict = ValidationVerdict::accepted(&extraction);
        let delta = DocumentDelta::from_verdict(&verdict);
        assert!(!delta.is_empty());

        let rendered = delta.render();
        assert!(rendered.contains("Summary: Blood pressure log covering March."));
        assert!(rendered.contains("Medications: amlodipine"));
    }

    #[test]
    fn chat_delta_empty_without_symptoms_or_findings() {
        assert!(ChatDelta(ChatConclusion::default()).is_empty());

        let whitespace_only = ChatConclusion {
            key_symptoms_discussed: vec!["   ".into()],
            ..Default::default()
        };
        assert!(ChatDelta(whitespace_only).is_empty());
    }

    #[test]
    fn chat_delta_renders_findings_with_certainty() {
        let delta = ChatDelta(ChatConclusion {
            chat_date: Some("2026-04-02".into()),
            chat_title: Some("Recurring headaches".into()),
            key_symptoms_discussed: vec!["throbbing headache".into()],
            high_confidence_conditions: vec![HighConfidenceCondition {
                condition: "migraine".into(),
                certainty: 90,
            }],
        });

        let rendered = delta.render();
        assert!(rendered.contains("Chat date: 2026-04-02"));
        assert!(rendered.contains("Symptoms discussed: throbbing headache"));
        assert!(rendered.contains("- migraine (90% certainty)"));
    }

    #[test]
    fn profile_context_renders_known_fields_only() {
        let context = MergeProfileContext {
            age: Some(61),
            gender: None,
            existing_conditions: vec!["type 2 diabetes".into()],
        };
        assert_eq!(context.render(), "Age: 61\nKnown conditions: type 2 diabetes");
        assert_eq!(MergeProfileContext::default().render(), "");
    }
}
