//! Ollama-backed Synthesis Port for local inference.
//!
//! Talks to /api/generate with a per-use-case system prompt; document
//! extraction attaches page images base64-encoded for vision models.
//! Single attempt per call — retry policy belongs to callers' fallback
//! logic, not here.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::intake::DocumentExtraction;

use super::parser::parse_extraction_response;
use super::prompt;
use super::{DocumentExtractionRequest, MergeRequest, OverallRequest, SynthesisError, SynthesisPort};

/// Preferred medical models in order of preference.
const PREFERRED_MODELS: &[&str] = &[
    "medgemma",
    "medgemma:27b",
    "medgemma:4b",
    "medgemma:latest",
];

/// Ollama HTTP adapter implementing `SynthesisPort`.
pub struct OllamaSynthesisPort {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaSynthesisPort {
    /// Create an adapter against an explicit Ollama instance and model.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, SynthesisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Local instance at localhost:11434 with a 5-minute timeout, using the
    /// best available preferred model.
    pub fn default_local() -> Result<Self, SynthesisError> {
        let mut port = Self::new("http://localhost:11434", "", 300)?;
        port.model = port.find_best_model()?;
        tracing::info!(model = %port.model, "Ollama synthesis port ready");
        Ok(port)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Find the best available preferred model.
    pub fn find_best_model(&self) -> Result<String, SynthesisError> {
        let available = self.list_models()?;
        for preferred in PREFERRED_MODELS {
            if available.iter().any(|m| m.starts_with(preferred)) {
                return Ok(preferred.to_string());
            }
        }
        Err(SynthesisError::NoModelAvailable)
    }

    pub fn is_model_available(&self, model: &str) -> Result<bool, SynthesisError> {
        Ok(self.list_models()?.iter().any(|m| m.starts_with(model)))
    }

    pub fn list_models(&self) -> Result<Vec<String>, SynthesisError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Backend {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| SynthesisError::ResponseParsing(e.to_string()))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn map_transport(&self, e: reqwest::Error) -> SynthesisError {
        if e.is_connect() {
            SynthesisError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            SynthesisError::Timeout(self.timeout_secs)
        } else {
            SynthesisError::Http(e.to_string())
        }
    }

    fn generate(
        &self,
        system: &str,
        prompt: &str,
        images: Option<Vec<String>>,
    ) -> Result<String, SynthesisError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            images,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Backend {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| SynthesisError::ResponseParsing(e.to_string()))?;

        if parsed.response.trim().is_empty() {
            return Err(SynthesisError::Empty);
        }
        Ok(parsed.response)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl SynthesisPort for OllamaSynthesisPort {
    fn extract_from_document(
        &self,
        request: &DocumentExtractionRequest,
    ) -> Result<DocumentExtraction, SynthesisError> {
        let images = if request.pages.is_empty() {
            None
        } else {
            Some(request.pages.iter().map(|page| BASE64.encode(page)).collect())
        };

        let response = self.generate(
            prompt::EXTRACTION_SYSTEM,
            &prompt::extraction_user_prompt(request),
            images,
        )?;
        parse_extraction_response(&response)
    }

    fn merge_summary(&self, request: &MergeRequest) -> Result<String, SynthesisError> {
        self.generate(
            prompt::merge_system_prompt(request.stream),
            &prompt::merge_user_prompt(request),
            None,
        )
    }

    fn synthesize_overall(&self, request: &OverallRequest) -> Result<String, SynthesisError> {
        self.generate(prompt::OVERALL_SYSTEM, &prompt::overall_user_prompt(request), None)
    }
}
