//! Gemini client for embeddings and text generation
//!
//! Talks to the Generative Language REST API with an API key. Each method is a
//! single attempt bounded by the client timeout; retries belong to the caller.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::LlmProvider;

/// `batchEmbedContents` accepts at most this many requests
const MAX_EMBED_BATCH: usize = 100;

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a client for the given model
    ///
    /// `model` is the generation model for completion use, or the embedding
    /// model for embedding use. Build one client per role.
    pub fn new(config: &GeminiConfig, model: &str) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("Gemini API key is not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions: config.embedding_dimensions,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Client for claim verification
    pub fn generation(config: &GeminiConfig) -> Result<Self> {
        Self::new(config, &config.generation_model)
    }

    /// Client for page translation
    pub fn translation(config: &GeminiConfig) -> Result<Self> {
        Self::new(config, &config.translation_model)
    }

    /// Client for embeddings
    pub fn embedding(config: &GeminiConfig) -> Result<Self> {
        Self::new(config, &config.embedding_model)
    }

    /// Get the API endpoint URL for a model method
    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    fn model_resource(&self) -> String {
        format!("models/{}", self.model)
    }

    async fn post<B, R>(&self, method: &str, body: &B, classify: fn(String) -> Error) -> Result<R>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(method))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("Gemini {} request: {}", method, e))
                } else {
                    classify(format!("Gemini {} request failed: {}", method, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, method, body, classify));
        }

        response
            .json()
            .await
            .map_err(|e| classify(format!("Failed to parse Gemini {} response: {}", method, e)))
    }
}

/// 4xx responses other than 408 and 429 will not succeed on retry
fn classify_status(
    status: StatusCode,
    method: &str,
    body: String,
    classify: fn(String) -> Error,
) -> Error {
    if status.is_client_error()
        && status != StatusCode::REQUEST_TIMEOUT
        && status != StatusCode::TOO_MANY_REQUESTS
    {
        Error::Rejected {
            status: status.as_u16(),
            message: body,
        }
    } else {
        classify(format!("Gemini {} failed ({}): {}", method, status, body))
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
    #[serde(rename = "outputDimensionality")]
    output_dimensionality: usize,
}

#[derive(serde::Serialize)]
struct EmbedContent {
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiClient {
    fn embed_request(&self, text: &str) -> EmbedRequest {
        EmbedRequest {
            model: self.model_resource(),
            content: EmbedContent {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            output_dimensionality: self.dimensions,
        }
    }

    fn check_dimensions(&self, values: &[f32]) -> Result<()> {
        if values.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response: GenerateResponse = self
            .post("generateContent", &request, Error::Generation)
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::generation("No text in Gemini response"));
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = self.embed_request(text);
        let response: EmbedResponse = self
            .post("embedContent", &request, Error::Embedding)
            .await?;

        self.check_dimensions(&response.embedding.values)?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_EMBED_BATCH) {
            let request = BatchEmbedRequest {
                requests: batch.iter().map(|t| self.embed_request(t)).collect(),
            };

            let response: BatchEmbedResponse = self
                .post("batchEmbedContents", &request, Error::Embedding)
                .await?;

            if response.embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "Gemini returned {} embeddings for {} inputs",
                    response.embeddings.len(),
                    batch.len()
                )));
            }

            for embedding in response.embeddings {
                self.check_dimensions(&embedding.values)?;
                all_embeddings.push(embedding.values);
            }
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
