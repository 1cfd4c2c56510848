#![warn(missing_docs)]
//! `highlight-syntax` - YAML syntax files for `highlight-core`.
//!
//! A syntax file names a file type, says how to detect it, and lists its rules:
//!
//! ```yaml
//! filetype: c
//! detect:
//!   filename: "\\.(c|h)$"
//! rules:
//!   - statement: "\\b(if|else|return)\\b"
//!   - comment:
//!       start: "/\\*"
//!       end: "\\*/"
//!       rules:
//!         - include: "todo"
//! ```
//!
//! [`SyntaxSet`] collects files, resolves `include:` entries across them and compiles each file
//! type into a [`highlight_core::Grammar`] on first use.

mod compiler;
mod definition;
mod error;
mod set;

pub use definition::{Detect, RawRule, RegionRule, SyntaxDefinition};
pub use error::SyntaxError;
pub use set::SyntaxSet;
