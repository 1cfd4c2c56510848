use highlight_core::HighlightError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading, compiling or detecting syntax files.
pub enum SyntaxError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed (including malformed rule entries).
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// A region or pattern regex failed to compile.
    Grammar(#[from] HighlightError),

    #[error("invalid rule: {0}")]
    /// A rule is well-formed YAML but cannot be used.
    InvalidRule(String),

    #[error("unknown include '{0}'")]
    /// An `include:` names a file type that has not been loaded.
    UnknownInclude(String),

    #[error("include cycle detected involving '{0}'")]
    /// Includes formed a cycle.
    IncludeCycle(String),

    #[error("unknown filetype '{0}'")]
    /// No syntax file with this file type has been loaded.
    UnknownFiletype(String),

    #[error("invalid detect pattern '{pattern}': {message}")]
    /// A `detect` regex failed to compile.
    InvalidDetectPattern {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },
}
