use colored::Colorize;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

const THEME: &str = "base16-ocean.dark";

/// Renders assistant markdown for the terminal: fenced code blocks are
/// highlighted, headings are emphasised, everything else passes through.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes.remove(THEME).unwrap_or_default();
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    pub fn highlight_text(&self, text: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut fence: Option<(String, Vec<&str>)> = None;

        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                match fence.take() {
                    Some((language, code)) => out.push(self.highlight_code(&code, &language)),
                    None => {
                        let language = trimmed.trim_start_matches('`').trim().to_string();
                        fence = Some((language, Vec::new()));
                    }
                }
            } else if let Some((_, code)) = fence.as_mut() {
                code.push(line);
            } else if trimmed.starts_with('#') {
                out.push(trimmed.trim_start_matches('#').trim().bold().to_string());
            } else {
                out.push(line.to_string());
            }
        }

        // Unterminated block, usually a reply cut short
        if let Some((language, code)) = fence {
            out.push(self.highlight_code(&code, &language));
        }

        out.join("\n")
    }

    fn highlight_code(&self, code: &[&str], language: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines = vec!["┌─────".dimmed().to_string()];
        for line in code {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            lines.push(format!("{}  {}\x1b[0m", "│".dimmed(), escaped));
        }
        lines.push("└─────".dimmed().to_string());
        lines.join("\n")
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
