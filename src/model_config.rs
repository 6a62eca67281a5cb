use crate::error::{ChatError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosted models the chat front-end can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ModelId {
    #[serde(rename = "gemini-pro")]
    #[value(name = "gemini-pro")]
    GeminiPro,
    #[serde(rename = "gemini-1.5-pro-latest")]
    #[value(name = "gemini-1.5-pro-latest")]
    Gemini15ProLatest,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::GeminiPro, ModelId::Gemini15ProLatest];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::GeminiPro => "gemini-pro",
            ModelId::Gemini15ProLatest => "gemini-1.5-pro-latest",
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::GeminiPro
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        // The API reports bound models as "models/<name>"
        let name = name.strip_prefix("models/").unwrap_or(name);
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| {
                ChatError::InvalidInput(format!(
                    "unknown model '{}' (supported: {})",
                    s,
                    supported_models()
                ))
            })
    }
}

pub fn supported_models() -> String {
    ModelId::ALL
        .iter()
        .map(ModelId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
