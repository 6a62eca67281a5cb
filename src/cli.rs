use crate::model_config::ModelId;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gemini-chat",
    about = "A terminal chat client for Google Gemini models",
    long_about = "gemini-chat streams answers from hosted Gemini models into a chat transcript. Switching models starts a fresh conversation unless --preserve-history is given.",
    version
)]
pub struct Cli {
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Send a single prompt and exit instead of starting the REPL
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Model to start with (overrides the config file)
    #[arg(long, value_enum)]
    pub model: Option<ModelId>,

    /// Keep the transcript when switching models and seed the new session with it
    #[arg(long)]
    pub preserve_history: bool,

    /// Override the API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(short, long)]
    pub verbose: bool,
}
