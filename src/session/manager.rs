use super::state::SessionState;
use crate::api::InferenceClient;
use crate::config::ModelChangePolicy;
use crate::conversation::{Message, Role};
use crate::error::{ChatError, Result};
use crate::model_config::ModelId;
use futures::StreamExt;

/// Outcome of checking the session's handle against the selected model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Keep,
    Replace {
        previous: Option<ModelId>,
        current: ModelId,
        /// Messages dropped from the transcript
        cleared: usize,
    },
}

impl Reconciliation {
    /// True when an existing handle was swapped for a different model
    pub fn is_model_change(&self) -> bool {
        matches!(self, Reconciliation::Replace { previous: Some(_), .. })
    }
}

/// Keeps every prompt flowing through a handle bound to the selected model
pub struct SessionManager<C> {
    client: C,
    policy: ModelChangePolicy,
}

impl<C: InferenceClient> SessionManager<C> {
    pub fn new(client: C, policy: ModelChangePolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> ModelChangePolicy {
        self.policy
    }

    pub async fn reconcile(&self, state: &mut SessionState) -> Result<Reconciliation> {
        let selected = state.selected_model.ok_or_else(|| {
            ChatError::SessionCreation("no model selected".to_string())
        })?;
        let previous = state.bound_model();

        if previous == Some(selected) {
            tracing::debug!(model = %selected, "Keeping chat session");
            return Ok(Reconciliation::Keep);
        }

        let clear = previous.is_some() && self.policy == ModelChangePolicy::Clear;
        let seed = if clear {
            Vec::new()
        } else {
            answered_turns(state.transcript.messages())
        };

        let handle = self
            .client
            .create_session(selected, seed)
            .await
            .map_err(|e| match e {
                ChatError::SessionCreation(_) => e,
                other => ChatError::SessionCreation(other.to_string()),
            })?;

        let cleared = if clear {
            let count = state.transcript.len();
            state.transcript.clear();
            count
        } else {
            0
        };
        state.handle = Some(handle);

        tracing::info!(
            previous = ?previous,
            current = %selected,
            cleared,
            "Replaced chat session"
        );
        Ok(Reconciliation::Replace {
            previous,
            current: selected,
            cleared,
        })
    }

    /// Sends one prompt and records the finished reply. `on_fragment` sees
    /// each non-empty piece of the reply as it arrives.
    pub async fn send_prompt<F>(
        &self,
        state: &mut SessionState,
        text: &str,
        mut on_fragment: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        if text.trim().is_empty() {
            return Err(ChatError::InvalidInput("prompt is empty".to_string()));
        }

        let selected = state.selected_model;
        let handle = match state.handle.as_mut() {
            Some(handle) if Some(handle.model()) == selected => handle,
            Some(handle) => return Err(ChatError::NoActiveSession(handle.model().to_string())),
            None => {
                return Err(ChatError::NoActiveSession(
                    selected.map_or_else(|| "<none>".to_string(), |m| m.to_string()),
                ))
            }
        };

        state.transcript.push_user(text);

        let streamed = async {
            let mut fragments = handle.send(text).await?;
            let mut reply = String::new();
            let mut count = 0usize;
            while let Some(fragment) = fragments.next().await {
                let Some(piece) = fragment? else { continue };
                if piece.is_empty() {
                    continue;
                }
                on_fragment(&piece);
                reply.push_str(&piece);
                count += 1;
            }
            tracing::debug!(fragments = count, chars = reply.len(), "Reply complete");
            Ok::<_, ChatError>(reply)
        }
        .await;

        match streamed {
            Ok(reply) => {
                state.transcript.push_assistant(reply.clone());
                handle.record_turn(Message::user(text), Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Turn dropped after inference failure");
                Err(match e {
                    ChatError::Inference(_) => e,
                    other => ChatError::Inference(other.to_string()),
                })
            }
        }
    }

    pub fn reset(&self, state: &mut SessionState) {
        tracing::info!(
            messages = state.transcript.len(),
            "Resetting conversation"
        );
        state.transcript.clear();
        state.handle = None;
    }
}

/// History a handle can be seeded with: user prompts that were never answered
/// are left out so roles keep alternating.
fn answered_turns(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .enumerate()
        .filter(|(i, message)| {
            message.role == Role::Assistant
                || messages
                    .get(i + 1)
                    .is_some_and(|next| next.role == Role::Assistant)
        })
        .map(|(_, message)| message.clone())
        .collect()
}
