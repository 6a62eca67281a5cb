pub mod gemini;
pub mod types;
pub mod utils;

pub use gemini::GeminiClient;

use crate::conversation::Message;
use crate::error::Result;
use crate::model_config::ModelId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use std::pin::Pin;

/// One streamed piece of a response. `None` when a chunk carried no text.
pub type Fragment = Option<String>;

/// Forward-only, finite stream of fragments for a single reply
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// Opens conversation handles against a hosted model
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn create_session(
        &self,
        model: ModelId,
        history: Vec<Message>,
    ) -> Result<Box<dyn ConversationHandle>>;
}

/// An open dialogue bound to one model for its whole life
#[async_trait]
pub trait ConversationHandle: Send {
    fn model(&self) -> ModelId;

    /// Answered turns this handle will send as context
    fn history(&self) -> &[Message];

    fn created_at(&self) -> DateTime<Utc>;

    async fn send(&self, prompt: &str) -> Result<FragmentStream>;

    /// Called once a reply has been fully received
    fn record_turn(&mut self, prompt: Message, reply: Message);
}
