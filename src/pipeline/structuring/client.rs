use serde::{Deserialize, Serialize};

use super::StructuringError;

/// Text-generation collaborator. One call per chunk; implementations must be
/// shareable across the worker pool.
pub trait StructuringClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError>;
}

/// Google Generative Language HTTP client.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, StructuringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
            ),
            api_key: api_key.to_string(),
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl StructuringClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    StructuringError::Timeout(self.timeout_secs)
                } else {
                    StructuringError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::ServiceError { status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| StructuringError::JsonParsing(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                StructuringError::JsonParsing("response carried no candidate text".into())
            })
    }
}

/// Scripted client for tests: the handler sees each prompt and decides the
/// response, so tests can key on chunk content or simulate failures.
#[cfg(test)]
pub struct MockStructuringClient {
    handler: Box<dyn Fn(&str) -> Result<String, StructuringError> + Send + Sync>,
}

#[cfg(test)]
impl MockStructuringClient {
    pub fn with(
        handler: impl Fn(&str) -> Result<String, StructuringError> + Send + Sync + 'static,
    ) -> Self {
        Self { handler: Box::new(handler) }
    }

    /// Same canned response for every prompt.
    pub fn returning(response: &str) -> Self {
        let response = response.to_string();
        Self::with(move |_| Ok(response.clone()))
    }

    /// Every call times out.
    pub fn timing_out() -> Self {
        Self::with(|_| Err(StructuringError::Timeout(10)))
    }
}

#[cfg(test)]
impl StructuringClient for MockStructuringClient {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        (self.handler)(prompt)
    }
}
