use super::CommandResult;
use crate::error::Result;
use crate::repl::Repl;
use crate::ui::UI;

pub fn exit_command() -> Result<CommandResult> {
    UI::print_goodbye();
    Ok(CommandResult::Exit)
}

pub fn clear_command(repl: &mut Repl) -> Result<CommandResult> {
    repl.handle_clear();
    Ok(CommandResult::Continue)
}

pub fn show_model_command(repl: &mut Repl) -> Result<CommandResult> {
    UI::print_model_caption(repl.selected_model());
    Ok(CommandResult::Continue)
}

pub fn switch_model_command(repl: &mut Repl, name: &str) -> Result<CommandResult> {
    repl.handle_switch_model(name)?;
    Ok(CommandResult::Continue)
}

pub fn models_command(repl: &mut Repl) -> Result<CommandResult> {
    UI::print_models(repl.selected_model());
    Ok(CommandResult::Continue)
}

pub fn history_command(repl: &mut Repl) -> Result<CommandResult> {
    repl.show_history();
    Ok(CommandResult::Continue)
}

pub fn debug_command(repl: &mut Repl) -> Result<CommandResult> {
    let snapshot = repl.debug_snapshot()?;
    println!("{}", snapshot);
    Ok(CommandResult::Continue)
}

pub fn help_command() -> Result<CommandResult> {
    UI::print_help();
    Ok(CommandResult::Continue)
}
