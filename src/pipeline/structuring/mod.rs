pub mod client;
pub mod parser;
pub mod pool;
pub mod prompt;
pub mod types;

pub use client::{GeminiClient, StructuringClient};
pub use parser::parse_payload;
pub use pool::structure_chunks;
pub use prompt::PromptBuilder;
pub use types::*;

use thiserror::Error;

/// Failures of a single structuring call. Isolated per chunk; the run only
/// fails when every chunk fails.
#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("no JSON object found in model response")]
    NoJsonFound,

    #[error("JSON parsing failed: {0}")]
    JsonParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("structuring request timed out after {0}s")]
    Timeout(u64),

    #[error("structuring service returned {status}: {body}")]
    ServiceError { status: u16, body: String },
}
