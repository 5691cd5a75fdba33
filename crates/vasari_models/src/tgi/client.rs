//! HTTP client for a text-generation-inference server.

use crate::tgi::dto::TgiErrorBody;
use crate::{TextGenerator, TgiParameters, TgiRequest, TgiResponse, TokenCounter, check_prompt_budget};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};
use vasari_core::GenerationConfig;
use vasari_error::{GenerationError, GenerationErrorKind, VasariResult};

/// Generator backed by a TGI server's `/generate` endpoint.
///
/// The prompt budget is enforced locally with the supplied
/// [`TokenCounter`] before any request is sent.
pub struct TgiGenerator {
    client: Client,
    endpoint: String,
    model: String,
    counter: Box<dyn TokenCounter>,
}

impl std::fmt::Debug for TgiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TgiGenerator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("counter", &self.counter.name())
            .finish()
    }
}

impl TgiGenerator {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. `http://localhost:8080`
    /// * `model` - Model served there (for logs only)
    /// * `counter` - Tokenizer used for the prompt budget
    #[instrument(skip(counter), fields(counter = counter.name()))]
    pub fn new(base_url: &str, model: &str, counter: Box<dyn TokenCounter>) -> Self {
        let endpoint = format!("{}/generate", base_url.trim_end_matches('/'));
        debug!(%endpoint, "Created TGI client");
        Self {
            client: Client::new(),
            endpoint,
            model: model.to_string(),
            counter,
        }
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &TgiRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                GenerationError::new(GenerationErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TgiErrorBody>(&body)
                .map(|parsed| parsed.error)
                .unwrap_or(body);
            error!(status = %status, error = %message, "Server returned an error");
            return Err(GenerationError::new(GenerationErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let parsed: TgiResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse response");
            GenerationError::new(GenerationErrorKind::ResponseParsing(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })?;

        parsed.into_text().ok_or_else(|| {
            GenerationError::new(GenerationErrorKind::ResponseParsing(
                "response contained no generations".to_string(),
            ))
        })
    }
}

#[async_trait]
impl TextGenerator for TgiGenerator {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> VasariResult<String> {
        let tokens = self.counter.count_tokens(prompt)?;
        check_prompt_budget(tokens, *config.max_prompt_tokens())?;

        let request = TgiRequest::builder()
            .inputs(prompt)
            .parameters(TgiParameters::from_config(config))
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Inference(e.to_string())))?;

        debug!(prompt_tokens = tokens, "Sending generate request");
        let text = self.post(&request).await?;
        debug!(chars = text.len(), "Received generation");
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "tgi"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
