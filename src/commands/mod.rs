use crate::error::Result;
use crate::repl::Repl;

pub mod builtin;

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue REPL loop
    Continue,
    /// Exit REPL loop
    Exit,
}

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Clear,
    /// Show the current model, or switch to the named one
    Model(Option<String>),
    Models,
    History,
    Debug,
    Help,
}

impl Command {
    /// Parses a line starting with `/`. Returns `None` for anything else or
    /// for unknown commands.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };

        match name.to_lowercase().as_str() {
            "/exit" | "/quit" | "/q" => Some(Command::Exit),
            "/clear" | "/reset" => Some(Command::Clear),
            "/model" => Some(Command::Model(arg.map(str::to_string))),
            "/models" => Some(Command::Models),
            "/history" => Some(Command::History),
            "/debug" => Some(Command::Debug),
            "/help" | "/?" => Some(Command::Help),
            _ => None,
        }
    }

    pub fn execute(&self, repl: &mut Repl) -> Result<CommandResult> {
        match self {
            Command::Exit => builtin::exit_command(),
            Command::Clear => builtin::clear_command(repl),
            Command::Model(None) => builtin::show_model_command(repl),
            Command::Model(Some(name)) => builtin::switch_model_command(repl, name),
            Command::Models => builtin::models_command(repl),
            Command::History => builtin::history_command(repl),
            Command::Debug => builtin::debug_command(repl),
            Command::Help => builtin::help_command(),
        }
    }
}

/// All available commands as strings (for autocomplete)
pub static COMMANDS: &[&str] = &[
    "/exit", "/quit", "/q", "/clear", "/reset", "/model", "/models", "/history", "/debug",
    "/help",
];
