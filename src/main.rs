mod api;
mod cli;
mod commands;
mod config;
mod conversation;
mod error;
mod error_ext;
mod model_config;
mod prompt;
mod repl;
mod session;
mod syntax;
mod ui;

use api::GeminiClient;
use clap::Parser;
use cli::Cli;
use config::{FileConfig, Settings};
use error::Result;
use error_ext::ResultExt;
use repl::Repl;
use session::SessionManager;
use std::env;
use ui::UI;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli) {
        UI::print_error_with_hint(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let workspace = env::current_dir().context("Failed to get current directory")?;

    let settings = Settings::resolve(&cli, FileConfig::load(&workspace)?);
    tracing::debug!(?settings, "Resolved settings");

    let api_key = config::resolve_api_key(cli.api_key.as_deref(), &workspace)?;
    let client = GeminiClient::new(api_key, settings.api_base.clone(), settings.request_timeout)?;
    tracing::debug!(api_base = client.api_base(), model = %settings.model, "Client ready");
    let manager = SessionManager::new(client, settings.policy);

    let mut repl = Repl::new(manager, settings.model)?;

    match cli.prompt {
        Some(prompt) => repl.process_single_prompt(&prompt),
        None => repl.run(),
    }
}
