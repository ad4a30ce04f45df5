//! Completion clients for report generation
//!
//! The generator only needs one operation: turn a prompt into a paragraph.
//! [`HttpLlmClient`] speaks to any OpenAI-compatible chat-completions
//! endpoint; [`StaticLlmClient`] returns canned text for tests and offline
//! runs.

use crate::core::config::ReportConfig;
use crate::core::error::{Result, TriageError};
use serde_json::json;
use std::time::Duration;

/// A completion backend for report sections
pub trait LlmClient {
    /// Produce the completion for one section prompt
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Blocking client for an OpenAI-compatible chat-completions endpoint
pub struct HttpLlmClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

/// System prompt framing every section request
const SYSTEM_PROMPT: &str = "You are a digital forensics analyst writing a \
    concise, factual triage report section. Describe only what the provided \
    data shows; do not speculate beyond it.";

impl HttpLlmClient {
    /// Build a client from report configuration.
    ///
    /// The API key is read from the environment variable named in the
    /// config; a missing key is a report error, not a panic.
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TriageError::Report(format!(
                "API key not found; set the {} environment variable",
                config.api_key_env
            ))
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TriageError::Report(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

impl LlmClient for HttpLlmClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| TriageError::Report(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(TriageError::Report(format!(
                "Completion endpoint returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let value: serde_json::Value = response
            .json()
            .map_err(|e| TriageError::Report(format!("Malformed completion response: {}", e)))?;

        value["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                TriageError::Report("Completion response carried no content".to_string())
            })
    }
}

/// A client that answers every prompt with fixed text.
///
/// Used by tests and by report generation without an endpoint configured.
pub struct StaticLlmClient {
    response: String,
}

impl StaticLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl LlmClient for StaticLlmClient {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// A client that fails every prompt, for exercising degradation paths
pub struct FailingLlmClient;

impl LlmClient for FailingLlmClient {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(TriageError::Report("completion backend unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_client() {
        let client = StaticLlmClient::new("canned analysis");
        assert_eq!(client.complete("anything").unwrap(), "canned analysis");
    }

    #[test]
    fn test_failing_client() {
        let client = FailingLlmClient;
        assert!(matches!(
            client.complete("anything"),
            Err(TriageError::Report(_))
        ));
    }

    #[test]
    fn test_http_client_requires_api_key() {
        let config = ReportConfig {
            api_key_env: "DROIDFOREN_TEST_KEY_THAT_DOES_NOT_EXIST".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpLlmClient::from_config(&config),
            Err(TriageError::Report(_))
        ));
    }
}
