use crate::model_config::ModelId;
use colored::Colorize;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch};
use std::borrow::Cow;

#[derive(Clone)]
pub struct ReplPrompt {
    model: Option<ModelId>,
}

impl ReplPrompt {
    pub fn new(model: Option<ModelId>) -> Self {
        Self { model }
    }

    pub fn set_model(&mut self, model: Option<ModelId>) {
        self.model = model;
    }
}

impl Prompt for ReplPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned("λ>".bright_green().bold().to_string() + " ")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        match self.model {
            Some(model) => Cow::Owned(model.as_str().dimmed().to_string()),
            None => Cow::Borrowed(""),
        }
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("… ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}
