use crate::api::ConversationHandle;
use crate::conversation::{Message, Transcript};
use crate::model_config::ModelId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything one user session carries between interaction cycles
pub struct SessionState {
    pub(super) selected_model: Option<ModelId>,
    pub(super) transcript: Transcript,
    pub(super) handle: Option<Box<dyn ConversationHandle>>,
}

impl SessionState {
    pub fn new(selected_model: Option<ModelId>) -> Self {
        Self {
            selected_model,
            transcript: Transcript::new(),
            handle: None,
        }
    }

    pub fn selected_model(&self) -> Option<ModelId> {
        self.selected_model
    }

    /// Takes effect on the next reconcile
    pub fn select_model(&mut self, model: ModelId) {
        self.selected_model = Some(model);
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn handle(&self) -> Option<&dyn ConversationHandle> {
        self.handle.as_deref()
    }

    /// Model the current handle is bound to, if any
    pub fn bound_model(&self) -> Option<ModelId> {
        self.handle.as_ref().map(|h| h.model())
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            selected_model: self.selected_model,
            handle: self.handle.as_ref().map(|h| HandleSnapshot {
                model: h.model(),
                created_at: h.created_at(),
                history_len: h.history().len(),
            }),
            messages: self.transcript.messages(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot<'a> {
    pub selected_model: Option<ModelId>,
    pub handle: Option<HandleSnapshot>,
    pub messages: &'a [Message],
}

#[derive(Debug, Serialize)]
pub struct HandleSnapshot {
    pub model: ModelId,
    pub created_at: DateTime<Utc>,
    pub history_len: usize,
}
