use once_cell::sync::Lazy;
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme as SyntaxTheme, ThemeSet},
    parsing::SyntaxSet,
    util::{as_24_bit_terminal_escaped, LinesWithEndings},
};

use crate::error::HighlightError;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Colours fenced code. Failing is fine: the caller falls back to plain
/// styling.
pub trait Highlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;
}

#[derive(Clone, Debug)]
pub struct SyntectHighlighter {
    theme_name: String,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_THEME)
    }
}

impl SyntectHighlighter {
    pub fn new(theme_name: impl Into<String>) -> Self {
        Self {
            theme_name: theme_name.into(),
        }
    }

    fn theme(&self) -> Result<&'static SyntaxTheme, HighlightError> {
        THEMES
            .themes
            .get(&self.theme_name)
            .ok_or_else(|| HighlightError::UnknownTheme(self.theme_name.clone()))
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = SYNTAXES
            .find_syntax_by_token(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;
        let mut lines = HighlightLines::new(syntax, self.theme()?);
        let mut out = String::with_capacity(code.len());
        for line in LinesWithEndings::from(code) {
            let ranges = lines
                .highlight_line(line, &SYNTAXES)
                .map_err(|err| HighlightError::Highlight(err.to_string()))?;
            out.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        out.push_str("\x1b[0m");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::strip_escapes;

    #[test]
    fn known_language_is_coloured() {
        let out = SyntectHighlighter::default()
            .highlight("fn main() {}\n", "rust")
            .expect("rust is bundled");
        assert!(out.contains("\x1b[38;2;"));
        assert_eq!(strip_escapes(&out), "fn main() {}\n");
    }

    #[test]
    fn unknown_language_is_an_error() {
        let err = SyntectHighlighter::default()
            .highlight("x", "no-such-language")
            .unwrap_err();
        assert!(matches!(err, HighlightError::UnknownLanguage(lang) if lang == "no-such-language"));
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let err = SyntectHighlighter::new("missing")
            .highlight("x", "rust")
            .unwrap_err();
        assert!(matches!(err, HighlightError::UnknownTheme(_)));
    }
}
