use std::{convert::Infallible, str::FromStr};

use log::debug;

/// One level of indentation as the caller asked for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndentToken {
    /// That many literal spaces.
    Spaces(usize),
    /// A literal string, vetted by [`IndentPolicy`].
    Literal(String),
}

impl From<usize> for IndentToken {
    fn from(count: usize) -> Self {
        IndentToken::Spaces(count)
    }
}

impl From<&str> for IndentToken {
    fn from(literal: &str) -> Self {
        IndentToken::Literal(literal.to_string())
    }
}

impl FromStr for IndentToken {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.parse::<usize>() {
            Ok(count) => IndentToken::Spaces(count),
            Err(_) => IndentToken::Literal(value.replace("\\t", "\t")),
        })
    }
}

/// Which literal indent strings are accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndentPolicy {
    /// Only runs of tab characters.
    #[default]
    Strict,
    /// Any non-empty string.
    Permissive,
}

impl IndentPolicy {
    fn accepts(self, literal: &str) -> bool {
        match self {
            IndentPolicy::Strict => !literal.is_empty() && literal.chars().all(|c| c == '\t'),
            IndentPolicy::Permissive => !literal.is_empty(),
        }
    }
}

/// Resolves `token` to the string used as one indent unit, or `fallback`
/// spaces when the literal is not accepted.
pub fn sanitize_indent(token: &IndentToken, policy: IndentPolicy, fallback: usize) -> String {
    match token {
        IndentToken::Spaces(count) => " ".repeat(*count),
        IndentToken::Literal(literal) if policy.accepts(literal) => literal.clone(),
        IndentToken::Literal(literal) => {
            debug!("unsupported indent {literal:?}, using {fallback} spaces");
            " ".repeat(fallback)
        }
    }
}

/// Prefixes every non-empty line of `text` with `indent`.
pub fn indent_lines(indent: &str, text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefixes every line of `text`, blank ones included, with `indent`.
pub fn indentify(indent: &str, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let joiner = format!("\n{indent}");
    format!("{indent}{}", text.split('\n').collect::<Vec<_>>().join(&joiner))
}

/// Frames a block with one leading and one trailing newline.
pub fn section(text: &str) -> String {
    format!("\n{text}\n")
}

/// Leading newline only; list items are joined back to back.
pub fn semi_section(text: &str) -> String {
    format!("\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_token_expands_to_spaces() {
        let indent = sanitize_indent(&IndentToken::Spaces(4), IndentPolicy::Strict, 2);
        assert_eq!(indent, "    ");
    }

    #[test]
    fn strict_policy_accepts_tabs_only() {
        let tabs = IndentToken::from("\t\t");
        assert_eq!(sanitize_indent(&tabs, IndentPolicy::Strict, 2), "\t\t");

        let junk = IndentToken::from("dsakdskajhdsa");
        assert_eq!(sanitize_indent(&junk, IndentPolicy::Strict, 2), "  ");

        let empty = IndentToken::from("");
        assert_eq!(sanitize_indent(&empty, IndentPolicy::Strict, 3), "   ");
    }

    #[test]
    fn permissive_policy_accepts_any_literal() {
        let dots = IndentToken::from("..");
        assert_eq!(sanitize_indent(&dots, IndentPolicy::Permissive, 2), "..");
        let empty = IndentToken::from("");
        assert_eq!(sanitize_indent(&empty, IndentPolicy::Permissive, 1), " ");
    }

    #[test]
    fn parses_counts_and_literals() {
        assert_eq!("4".parse::<IndentToken>(), Ok(IndentToken::Spaces(4)));
        assert_eq!(
            "\\t".parse::<IndentToken>(),
            Ok(IndentToken::Literal("\t".into()))
        );
    }

    #[test]
    fn indent_lines_skips_blank_lines() {
        assert_eq!(indent_lines("  ", "a\n\nb"), "  a\n\n  b");
        assert_eq!(indent_lines("  ", "\na"), "\n  a");
    }

    #[test]
    fn indentify_prefixes_every_line() {
        assert_eq!(indentify("│ ", "a\n\nb"), "│ a\n│ \n│ b");
        assert_eq!(indentify("│ ", ""), "");
    }

    #[test]
    fn sections_frame_with_newlines() {
        assert_eq!(section("body"), "\nbody\n");
        assert_eq!(semi_section("item"), "\nitem");
    }
}
