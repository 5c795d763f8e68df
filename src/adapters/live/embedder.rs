//! Live adapter for the `Embedder` port using the Ollama embed API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::port_error;
use crate::ports::embedder::{EmbedFuture, Embedder};

/// Embedder that posts batches to an Ollama `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Creates an embedder for the given endpoint and model.
    #[must_use]
    pub fn new(url: &str, model: &str) -> Self {
        Self { client: Client::new(), url: url.to_string(), model: model.to_string() }
    }
}

/// Request body sent to `/api/embed`.
#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response body from `/api/embed`.
#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, inputs: &[String]) -> EmbedFuture<'_> {
        let inputs = inputs.to_vec();

        Box::pin(async move {
            let body = EmbedRequest { model: &self.model, input: &inputs };
            let response = self
                .client
                .post(&self.url)
                .json(&body)
                .send()
                .await
                .map_err(|e| port_error("Ollama request failed", e))?;

            let status = response.status();
            let text =
                response.text().await.map_err(|e| port_error("Failed to read Ollama response", e))?;
            if !status.is_success() {
                return Err(format!("Ollama API error ({}): {text}", status.as_u16()).into());
            }

            let parsed: EmbedResponse = serde_json::from_str(&text)
                .map_err(|e| port_error("Failed to parse Ollama response", e))?;
            if parsed.embeddings.len() != inputs.len() {
                return Err(format!(
                    "Ollama returned {} embeddings for {} inputs",
                    parsed.embeddings.len(),
                    inputs.len()
                )
                .into());
            }
            Ok(parsed.embeddings)
        })
    }
}
