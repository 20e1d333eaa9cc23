//! Prompt templates for the three synthesis use cases.
//!
//! System prompts are fixed per use case; user prompts are rendered from
//! the request structs. The placeholder constants are quoted verbatim in
//! the overall prompt because the backend is instructed to recognize them
//! by exact string equality.

use crate::constants::{
    FIRST_ENTRY_MARKER, PLACEHOLDER_NO_CHAT_SUMMARY, PLACEHOLDER_NO_DOC_SUMMARY,
};
use crate::store::SummaryStream;

use super::{DocumentExtractionRequest, MergeRequest, OverallRequest};

pub const EXTRACTION_SYSTEM: &str = "\
You are a medical document analyst. Extract ONLY information explicitly \
present in the document. NEVER infer, interpret, or fabricate data not \
directly written. Respond with a single JSON object using exactly these \
keys: isMedicalDocument (boolean), rejectionReason (string or null), \
overallSummary (string), documentDate (ISO date string or null), \
keyMetrics (array of {name, value, unit, normalRange, date}), \
identifiedConditions (array of strings), mentionedMedications (array of \
strings), suggestedCategory (string or null). If the document is not \
medical, set isMedicalDocument to false and explain in rejectionReason.";

const MERGE_DOCUMENT_SYSTEM: &str = "\
You maintain one running narrative of a patient's medical documents. \
Rewrite the narrative so it preserves every distinct fact from the prior \
narrative and weaves the new document's findings in chronologically and \
thematically. Never drop previously recorded conditions, metrics, or \
medications. Respond with the updated narrative only — no preamble, no \
headings, no advice.";

const MERGE_CHAT_SYSTEM: &str = "\
You maintain one running narrative of a patient's AI health chat history. \
Rewrite the narrative so it preserves every distinct fact from the prior \
narrative and weaves the new conversation's symptoms and high-confidence \
findings in chronologically and thematically. Never drop previously \
recorded information. Respond with the updated narrative only — no \
preamble, no headings, no advice.";

pub fn merge_system_prompt(stream: SummaryStream) -> &'static str {
    match stream {
        SummaryStream::Document => MERGE_DOCUMENT_SYSTEM,
        SummaryStream::Chat => MERGE_CHAT_SYSTEM,
    }
}

pub const OVERALL_SYSTEM: &str = "\
You write one coherent overall health summary for the patient to read, \
combining their profile, a document-derived narrative, and a chat-derived \
narrative. Describe, never diagnose or prescribe. If a narrative field \
exactly equals the placeholder string, treat that source as having no \
information at all; any other text, however short, is real content. \
Respond with the summary only.";

pub fn merge_user_prompt(request: &MergeRequest) -> String {
    let previous = request
        .previous
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(FIRST_ENTRY_MARKER);

    let mut prompt = format!(
        "PRIOR NARRATIVE:\n{previous}\n\nNEW {} ENTRY:\n{}\n",
        request.stream.as_str().to_uppercase(),
        request.delta.trim_end(),
    );
    if !request.profile.trim().is_empty() {
        prompt.push_str(&format!("\nPATIENT CONTEXT:\n{}\n", request.profile.trim_end()));
    }
    prompt.push_str("\nUpdated narrative:");
    prompt
}

pub fn overall_user_prompt(request: &OverallRequest) -> String {
    let profile = &request.profile;
    let mut lines = Vec::new();

    if let Some(name) = profile.name.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.push(format!("Name: {name}"));
    }
    if let Some(age) = profile.age {
        lines.push(format!("Age: {age}"));
    }
    if let Some(gender) = profile.gender.as_deref().filter(|g| !g.trim().is_empty()) {
        lines.push(format!("Gender: {gender}"));
    }
    if let Some(height) = profile.height_cm {
        lines.push(format!("Height: {height} cm"));
    }
    if let Some(weight) = profile.weight_kg {
        lines.push(format!("Weight: {weight} kg"));
    }
    if let Some(bmi) = profile.bmi() {
        lines.push(format!("BMI: {bmi}"));
    }
    if !profile.existing_conditions.is_empty() {
        lines.push(format!("Known conditions: {}", profile.existing_conditions.join("; ")));
    }
    if !profile.allergies.is_empty() {
        lines.push(format!("Allergies: {}", profile.allergies.join("; ")));
    }
    if lines.is_empty() {
        lines.push("(no profile information recorded)".to_string());
    }

    format!(
        "PATIENT PROFILE:\n{}\n\nDOCUMENT NARRATIVE (placeholder \"{}\" means none):\n{}\n\n\
         CHAT NARRATIVE (placeholder \"{}\" means none):\n{}\n\nOverall health summary:",
        lines.join("\n"),
        PLACEHOLDER_NO_DOC_SUMMARY,
        request.document_summary,
        PLACEHOLDER_NO_CHAT_SUMMARY,
        request.chat_summary,
    )
}

pub fn extraction_user_prompt(request: &DocumentExtractionRequest) -> String {
    match request.text.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(text) => format!(
            "Analyze this medical document ({}) and respond with the JSON object.\n\n\
             DOCUMENT TEXT:\n{text}",
            request.media_type
        ),
        None => format!(
            "Analyze the attached document images ({}) and respond with the JSON object.",
            request.media_type
        ),
    }
}
