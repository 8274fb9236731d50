//! Story/quiz generation through a local Ollama endpoint.
//!
//! The generator is handed its configuration explicitly; there is no ambient
//! endpoint or model state. Calls are blocking with a hard timeout and are
//! never retried. Failures surface verbatim to the caller.

use crate::error::{PathwayError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint.
pub const DEFAULT_GENERATE_URL: &str = "http://127.0.0.1:11434";

/// Default upper bound for one generation round-trip.
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Generation settings, passed in at construction.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATE_URL.to_string(),
            model: "llama3.2".to_string(),
            timeout: DEFAULT_GENERATE_TIMEOUT,
            temperature: 0.7,
        }
    }
}

/// What kind of text to produce from the word list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Story,
    Quiz,
}

impl GenerationMode {
    fn prompt_for(&self, words: &[String]) -> String {
        let list = words.join(", ");
        match self {
            GenerationMode::Story => format!(
                "Write a short, friendly story for a language learner. \
                 Use each of these vocabulary words at least once: {}. \
                 Keep the sentences simple and the tone encouraging.",
                list
            ),
            GenerationMode::Quiz => format!(
                "Create a short fill-in-the-blank quiz for a language learner \
                 practicing these vocabulary words: {}. \
                 One sentence per word, with the word blanked out, followed by \
                 an answer key.",
                list
            ),
        }
    }
}

/// Response from /api/generate (non-streaming).
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking client for the text-generation collaborator.
pub struct TextGenerator {
    config: GenerationConfig,
}

impl TextGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Ask the model for a story or quiz built from the given words.
    pub fn generate(&self, mode: GenerationMode, words: &[String]) -> Result<String> {
        if words.is_empty() {
            return Err(PathwayError::MissingField("words"));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| PathwayError::GenerationUnavailable(e.to_string()))?;

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": mode.prompt_for(words),
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
            },
        });

        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, model = %self.config.model, words = words.len(), "generation request");

        let resp = client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                PathwayError::GenerationTimeout
            } else if e.is_connect() {
                PathwayError::GenerationUnavailable(e.to_string())
            } else {
                PathwayError::GenerationFailed(e.to_string())
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(PathwayError::GenerationFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| PathwayError::GenerationFailed(e.to_string()))?;
        if parsed.response.trim().is_empty() {
            return Err(PathwayError::GenerationFailed(
                "model returned no text".to_string(),
            ));
        }
        Ok(parsed.response)
    }
}
