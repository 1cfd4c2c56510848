//! Errors produced while building grammars and configuring highlighters.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while building grammars or configuring a highlighter.
///
/// Line matching itself never fails: a pattern that does not match is a normal outcome.
pub enum HighlightError {
    #[error("grammar regex compile error for pattern '{pattern}': {message}")]
    /// A region or leaf pattern regex failed to compile while building a grammar.
    GrammarCompile {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },

    #[error("invalid custom pattern '{pattern}': {message}")]
    /// A custom overlay regex failed to compile.
    InvalidCustomPattern {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },

    #[error("multiple custom patterns for the same group ({group}) not supported")]
    /// A custom pattern is already registered for this group.
    DuplicateCustomPattern {
        /// Name of the group that already has a custom pattern.
        group: String,
    },

    #[error("highlighter config parse error: {0}")]
    /// The highlighter configuration could not be parsed.
    Config(#[from] serde_yaml::Error),
}

impl HighlightError {
    pub(crate) fn grammar_compile(pattern: &str, err: regex::Error) -> Self {
        Self::GrammarCompile {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_custom_pattern(pattern: &str, err: regex::Error) -> Self {
        Self::InvalidCustomPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}
