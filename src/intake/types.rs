//! Types for the document intake validator.
//!
//! `DocumentExtraction` is the untrusted output contract of the upstream
//! extraction step — every field may be missing, empty, or hallucinated.
//! `ValidationVerdict` is the trusted result the rest of the pipeline sees.

use serde::{Deserialize, Serialize};

use crate::constants::REJECTED_CATEGORY;

/// One measurement pulled out of a document (lab value, vital sign, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_range: Option<String>,
    /// ISO date the measurement was taken, when stated in the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Metric {
    /// All text fields joined, as scanned by the boilerplate/length rules.
    pub fn concatenated_text(&self) -> String {
        let mut parts = vec![self.name.as_str(), self.value.as_str()];
        if let Some(unit) = &self.unit {
            parts.push(unit);
        }
        if let Some(range) = &self.normal_range {
            parts.push(range);
        }
        if let Some(date) = &self.date {
            parts.push(date);
        }
        parts.join(" ")
    }
}

/// Raw extraction output for one uploaded document. Untrusted.
///
/// `is_medical_document` is an Option on purpose: the upstream model may
/// omit the verdict entirely, and the validator treats "explicitly false",
/// "explicitly true", and "never set" differently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentExtraction {
    pub is_medical_document: Option<bool>,
    pub rejection_reason: Option<String>,
    pub overall_summary: String,
    pub document_date: Option<String>,
    pub key_metrics: Vec<Metric>,
    pub identified_conditions: Vec<String>,
    pub mentioned_medications: Vec<String>,
    pub suggested_category: Option<String>,
}

impl DocumentExtraction {
    /// Whether any structured field carries content.
    pub fn has_structured_evidence(&self) -> bool {
        !self.key_metrics.is_empty()
            || self.identified_conditions.iter().any(|c| !c.trim().is_empty())
            || self.mentioned_medications.iter().any(|m| !m.trim().is_empty())
    }
}

/// Everything the validator needs to judge one upload attempt.
#[derive(Debug, Clone)]
pub struct IntakeContext<'a> {
    /// Declared MIME type of the uploaded file (e.g. "application/pdf").
    pub media_type: &'a str,
    /// False when the raw bytes could not be fetched/prepared upstream.
    pub content_retrieved: bool,
    pub extraction: &'a DocumentExtraction,
}

/// Trusted accept/reject result for one document extraction.
///
/// When `accepted` is false, `sanitized` never carries structured data:
/// all lists are empty, the summary equals the reason, and the category
/// is the fixed rejected token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub accepted: bool,
    pub reason: Option<String>,
    pub sanitized: DocumentExtraction,
}

impl ValidationVerdict {
    /// Build a rejection verdict. Strips every structured field so
    /// downstream consumers never see partially-trusted data.
    pub fn rejected(reason: String, extraction: &DocumentExtraction) -> Self {
        let sanitized = DocumentExtraction {
            is_medical_document: Some(false),
            rejection_reason: Some(reason.clone()),
            overall_summary: reason.clone(),
            document_date: extraction.document_date.clone(),
            key_metrics: Vec::new(),
            identified_conditions: Vec::new(),
            mentioned_medications: Vec::new(),
            suggested_category: Some(REJECTED_CATEGORY.to_string()),
        };
        Self { accepted: false, reason: Some(reason), sanitized }
    }

    /// Build an acceptance verdict with canonicalized fields:
    /// strings trimmed, blank list entries dropped.
    pub fn accepted(extraction: &DocumentExtraction) -> Self {
        let clean_list = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let sanitized = DocumentExtraction {
            is_medical_document: Some(true),
            rejection_reason: None,
            overall_summary: extraction.overall_summary.trim().to_string(),
            document_date: extraction
                .document_date
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            key_metrics: extraction.key_metrics.clone(),
            identified_conditions: clean_list(&extraction.identified_conditions),
            mentioned_medications: clean_list(&extraction.mentioned_medications),
            suggested_category: extraction
                .suggested_category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        };
        Self { accepted: true, reason: None, sanitized }
    }
}
