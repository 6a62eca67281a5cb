use crate::conversation::{Message, Role};
use crate::error::{ChatError, Result};
use crate::model_config::{supported_models, ModelId};
use crate::syntax::SyntaxHighlighter;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::{self, Write};

/// Message severity levels for consistent UI feedback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageSeverity {
    Warning,
    Error,
    Info,
}

impl MessageSeverity {
    pub fn prefix(&self) -> colored::ColoredString {
        match self {
            Self::Warning => "Warning:".bright_yellow().bold(),
            Self::Error => "Error:".bright_red().bold(),
            Self::Info => "Info:".bright_cyan().bold(),
        }
    }
}

/// RAII guard that ensures raw mode is disabled when dropped.
/// Prevents terminal corruption if a panic occurs while in raw mode.
struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

/// UI utilities for displaying messages and transcripts
pub struct UI {
    highlighter: SyntaxHighlighter,
}

impl UI {
    pub fn new() -> Self {
        Self {
            highlighter: SyntaxHighlighter::new(),
        }
    }

    pub fn print_message(severity: MessageSeverity, message: &str) {
        eprintln!("{} {}", severity.prefix(), message);
    }

    pub fn print_warning(message: &str) {
        Self::print_message(MessageSeverity::Warning, message);
    }

    pub fn print_error(message: &str) {
        Self::print_message(MessageSeverity::Error, message);
    }

    pub fn print_info(message: &str) {
        Self::print_message(MessageSeverity::Info, message);
    }

    pub fn print_error_with_hint(error: &ChatError) {
        eprintln!("{} {}", MessageSeverity::Error.prefix(), error);
        if let Some(hint) = error.hint() {
            eprintln!("  {} {}", "Hint:".bright_cyan(), hint);
        }
    }

    pub fn print_welcome(model: Option<ModelId>) {
        println!("{}", "✨ Gemini Chat".bright_cyan().bold());
        Self::print_model_caption(model);
        println!("{}", "Type your message, or /help for commands.".dimmed());
        println!();
    }

    pub fn print_model_caption(model: Option<ModelId>) {
        let name = model.map_or_else(|| "none".to_string(), |m| m.to_string());
        println!("{} {}", "Model:".bright_green(), name);
    }

    pub fn print_model_changed(model: ModelId, cleared: usize) {
        if cleared > 0 {
            Self::print_info(&format!(
                "Switched to {}. Starting a new conversation ({} messages cleared).",
                model, cleared
            ));
        } else {
            Self::print_info(&format!("Switched to {}.", model));
        }
    }

    pub fn print_models(current: Option<ModelId>) {
        println!("{}", "Available models:".bright_cyan().bold());
        for model in ModelId::ALL {
            if Some(model) == current {
                println!("  {} {}", "*".bright_green(), model.as_str().bright_green());
            } else {
                println!("    {}", model);
            }
        }
    }

    pub fn print_help() {
        println!("{}", "Commands:".bright_cyan().bold());
        println!("  {:<16} {}", "/model", "Show the current model".dimmed());
        println!(
            "  {:<16} {}",
            "/model <name>",
            format!("Switch model ({})", supported_models()).dimmed()
        );
        println!("  {:<16} {}", "/models", "List available models".dimmed());
        println!("  {:<16} {}", "/clear", "Reset the conversation".dimmed());
        println!("  {:<16} {}", "/history", "Show the transcript".dimmed());
        println!("  {:<16} {}", "/debug", "Dump session state as JSON".dimmed());
        println!("  {:<16} {}", "/exit", "Quit".dimmed());
    }

    pub fn print_goodbye() {
        println!("{}", "Goodbye!".bright_cyan());
    }

    pub fn print_user_prompt(prompt: &str) {
        println!("{} {}", "λ>".bright_green().bold(), prompt);
        println!();
    }

    pub fn print_assistant_header() {
        println!("{}", "Assistant:".bright_blue().bold());
    }

    /// Writes a streamed piece of the reply without a trailing newline
    pub fn print_fragment(fragment: &str) {
        if let Err(e) = write_fragment(&mut io::stdout(), fragment) {
            tracing::warn!(error = %e, "Failed to write reply fragment to stdout");
        }
    }

    pub fn end_reply() {
        println!();
        println!();
    }

    pub fn print_transcript(&self, messages: &[Message]) {
        if messages.is_empty() {
            println!("{}", "No messages yet.".dimmed());
            return;
        }

        println!("{}", "═".repeat(80).bright_cyan());
        for message in messages {
            match message.role {
                Role::User => {
                    println!("{} {}", "λ>".bright_green().bold(), message.content);
                }
                Role::Assistant => {
                    Self::print_assistant_header();
                    println!("{}", self.highlighter.highlight_text(&message.content));
                }
            }
            println!();
        }
        println!("{}", "═".repeat(80).bright_cyan());
    }

    /// Reads a line without echoing it. Returns `None` when the user submits
    /// nothing or cancels with Esc / Ctrl+C.
    pub fn read_secret(prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt.bright_cyan());
        io::stdout().flush()?;

        let mut secret = String::new();
        {
            let _guard = RawModeGuard::new()?;
            loop {
                if let Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) = event::read()?
                {
                    match code {
                        KeyCode::Enter => break,
                        KeyCode::Esc => {
                            secret.clear();
                            break;
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            secret.clear();
                            break;
                        }
                        KeyCode::Backspace => {
                            secret.pop();
                        }
                        KeyCode::Char(c) => secret.push(c),
                        _ => {}
                    }
                }
            }
        }
        println!();

        let secret = secret.trim().to_string();
        Ok(if secret.is_empty() { None } else { Some(secret) })
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

fn write_fragment<W: Write>(out: &mut W, fragment: &str) -> io::Result<()> {
    out.write_all(fragment.as_bytes())?;
    out.flush()
}
