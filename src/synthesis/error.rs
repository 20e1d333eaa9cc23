//! Synthesis backend error taxonomy.
//!
//! Callers in `merge` and `overall` collapse every variant into the same
//! fallback path — the distinction exists for logging and for the backend
//! adapter's own diagnostics, not for control flow upstream.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Synthesis backend returned no usable output")]
    Empty,

    #[error("Cannot connect to synthesis backend at {0}")]
    Connection(String),

    #[error("Synthesis request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Synthesis backend error (HTTP {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Cannot parse synthesis response: {0}")]
    ResponseParsing(String),

    #[error("No synthesis model available")]
    NoModelAvailable,
}
