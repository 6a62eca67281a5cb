use crate::api::GeminiClient;
use crate::commands::{Command, CommandResult, COMMANDS};
use crate::error::{ChatError, Result};
use crate::model_config::ModelId;
use crate::prompt::ReplPrompt;
use crate::session::{Reconciliation, SessionManager, SessionState};
use crate::ui::UI;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultCompleter, Emacs, KeyCode, KeyModifiers,
    MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal,
};
use serde_json::json;

/// Terminal front-end. Each submitted line is one interaction cycle:
/// reconcile the session, then run a command or send a prompt.
pub struct Repl {
    runtime: tokio::runtime::Runtime,
    manager: SessionManager<GeminiClient>,
    state: SessionState,
    ui: UI,
    editor: Reedline,
    prompt: ReplPrompt,
}

impl Repl {
    pub fn new(manager: SessionManager<GeminiClient>, model: ModelId) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            ChatError::Configuration(format!("Failed to create async runtime: {}", e))
        })?;

        let mut completions: Vec<String> = COMMANDS.iter().map(|c| c.to_string()).collect();
        completions.extend(ModelId::ALL.iter().map(|m| m.to_string()));

        let mut completer = DefaultCompleter::with_inclusions(&['/', '-', '_', '.']);
        completer = completer.set_min_word_len(1);
        completer.insert(completions);

        let completion_menu = ColumnarMenu::default().with_name("completion_menu");
        let completion_menu = ReedlineMenu::EngineCompleter(Box::new(completion_menu));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".into()),
                ReedlineEvent::MenuNext,
            ]),
        );
        keybindings.add_binding(
            KeyModifiers::SHIFT,
            KeyCode::BackTab,
            ReedlineEvent::MenuPrevious,
        );

        let editor = Reedline::create()
            .use_bracketed_paste(true)
            .with_completer(Box::new(completer))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_menu(completion_menu);

        Ok(Self {
            runtime,
            manager,
            state: SessionState::new(Some(model)),
            ui: UI::new(),
            editor,
            prompt: ReplPrompt::new(Some(model)),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        UI::print_welcome(self.state.selected_model());
        if let Err(e) = self.reconcile_session() {
            UI::print_error_with_hint(&e);
        }

        loop {
            match self.editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match Command::parse(line) {
                            Some(command) => match command.execute(self) {
                                Ok(CommandResult::Exit) => break,
                                Ok(CommandResult::Continue) => {}
                                Err(e) => UI::print_error_with_hint(&e),
                            },
                            None => {
                                UI::print_error(&format!("Unknown command: {} (try /help)", line))
                            }
                        }
                        continue;
                    }

                    if let Err(e) = self.process_message(line) {
                        UI::print_error_with_hint(&e);
                        println!();
                    }
                }
                Ok(Signal::CtrlD) => {
                    UI::print_goodbye();
                    break;
                }
                Ok(_) => continue,
                Err(err) => {
                    UI::print_error(&err.to_string());
                    break;
                }
            }
        }

        Ok(())
    }

    pub fn process_single_prompt(&mut self, prompt: &str) -> Result<()> {
        UI::print_user_prompt(prompt);
        self.process_message(prompt)
    }

    fn process_message(&mut self, user_input: &str) -> Result<()> {
        self.reconcile_session()?;

        UI::print_assistant_header();
        let result = self.runtime.block_on(self.manager.send_prompt(
            &mut self.state,
            user_input,
            UI::print_fragment,
        ));
        UI::end_reply();

        result.map(|_| ())
    }

    /// Makes sure the handle matches the selected model, announcing a switch
    fn reconcile_session(&mut self) -> Result<Reconciliation> {
        let outcome = self
            .runtime
            .block_on(self.manager.reconcile(&mut self.state))?;

        if let Reconciliation::Replace {
            current, cleared, ..
        } = outcome
        {
            if outcome.is_model_change() {
                UI::print_model_changed(current, cleared);
            }
        }
        Ok(outcome)
    }

    pub fn selected_model(&self) -> Option<ModelId> {
        self.state.selected_model()
    }

    pub fn handle_clear(&mut self) {
        self.manager.reset(&mut self.state);
        UI::print_info("Conversation cleared.");
        if let Err(e) = self.reconcile_session() {
            UI::print_error_with_hint(&e);
        }
    }

    pub fn handle_switch_model(&mut self, name: &str) -> Result<()> {
        let model: ModelId = name.parse()?;
        if self.state.selected_model() == Some(model) {
            UI::print_info(&format!("Already using {}.", model));
            return Ok(());
        }

        self.state.select_model(model);
        self.prompt.set_model(Some(model));
        self.reconcile_session()?;
        Ok(())
    }

    pub fn show_history(&self) {
        self.ui.print_transcript(self.state.transcript().messages());
    }

    pub fn debug_snapshot(&self) -> Result<String> {
        let value = json!({
            "model_change_policy": self.manager.policy(),
            "session": self.state.snapshot(),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
