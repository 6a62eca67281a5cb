use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not start a chat session: {0}")]
    SessionCreation(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active chat session for model {0}")]
    NoActiveSession(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<ChatError>,
    },
}

impl ChatError {
    /// Short suggestion shown under the error in the REPL
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ChatError::Configuration(_) => {
                Some("Set GOOGLE_API_KEY, pass --api-key, or add it to .gemini-chat/secrets.toml")
            }
            ChatError::SessionCreation(_) => {
                Some("Pick a supported model with /model <name>; your transcript was kept")
            }
            ChatError::Inference(_) => {
                Some("Your message was kept but not answered. Send it again to retry")
            }
            ChatError::NoActiveSession(_) => Some("Use /clear to start a fresh conversation"),
            ChatError::Context { source, .. } => source.hint(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
