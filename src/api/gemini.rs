use super::types::{Content, GenerateContentRequest};
use super::utils::{check_response_status, fragment_stream};
use super::{ConversationHandle, FragmentStream, InferenceClient};
use crate::conversation::Message;
use crate::error::{ChatError, Result};
use crate::model_config::ModelId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: Option<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ChatError::Configuration("API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| ChatError::Configuration(format!("Invalid API key format: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let api_base = api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, api_base })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn create_session(
        &self,
        model: ModelId,
        history: Vec<Message>,
    ) -> Result<Box<dyn ConversationHandle>> {
        tracing::info!(model = %model, seeded = history.len(), "Opening chat session");
        Ok(Box::new(GeminiSession {
            client: self.clone(),
            model,
            history,
            created_at: Utc::now(),
        }))
    }
}

pub struct GeminiSession {
    client: GeminiClient,
    model: ModelId,
    history: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl GeminiSession {
    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.client.api_base, self.model
        )
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = self.history.iter().map(Content::from_message).collect();
        contents.push(Content::from_message(&Message::user(prompt)));
        GenerateContentRequest { contents }
    }
}

#[async_trait]
impl ConversationHandle for GeminiSession {
    fn model(&self) -> ModelId {
        self.model
    }

    fn history(&self) -> &[Message] {
        &self.history
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn send(&self, prompt: &str) -> Result<FragmentStream> {
        let request = self.build_request(prompt);
        tracing::debug!(
            model = %self.model,
            turns = request.contents.len(),
            "Sending streaming request"
        );

        let response = self
            .client
            .client
            .post(self.stream_url())
            .json(&request)
            .send()
            .await?;
        let response = check_response_status(response).await?;

        Ok(fragment_stream(response.bytes_stream()))
    }

    fn record_turn(&mut self, prompt: Message, reply: Message) {
        self.history.push(prompt);
        self.history.push(reply);
    }
}
