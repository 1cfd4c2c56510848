#![warn(missing_docs)]
//! `highlight-core` - incremental, region-based syntax highlighting.
//!
//! # Overview
//!
//! A [`Grammar`] is a tree of delimited regions (comments, strings, ...) plus leaf patterns
//! (keywords, numbers, ...). The engine matches one line at a time, entering each line in the
//! [`LineState`] the previous line ended in, and produces sparse color runs ([`LineMatch`]) keyed
//! by character offset.
//!
//! Because a line's end state is a pure function of its entry state and its text, an edit only
//! needs states recomputed until they agree with the stored ones again
//! ([`Highlighter::rehighlight_states`]).
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use highlight_core::{GrammarBuilder, GroupRegistry, Highlighter, RegionSpec};
//!
//! let registry = Arc::new(GroupRegistry::new());
//! let comment = registry.resolve("comment");
//! let todo = registry.resolve("todo");
//!
//! let mut builder = GrammarBuilder::new("c");
//! let block = builder
//!     .add_region(None, RegionSpec::new(comment, r"/\*", r"\*/"))
//!     .unwrap();
//! builder.add_pattern(Some(block), todo, r"\bTODO\b").unwrap();
//!
//! let mut highlighter = Highlighter::new(Arc::new(builder.build()), registry);
//! let lines = highlighter.highlight_string("int x; /* TODO */\n/* open\nclosed */");
//!
//! assert_eq!(lines[0].group_at(10), todo);
//! assert_eq!(lines[1].group_at(0), comment);
//! assert_eq!(lines[2].group_at(0), comment);
//! ```
//!
//! # Module Description
//!
//! - [`groups`] - highlight group ids and the name registry
//! - [`grammar`] - compiled region tree and its builder
//! - [`search`] - regex search with anchor control and skip blanking
//! - [`matcher`] - the per-line matching algorithm
//! - [`highlighter`] - whole-document and incremental drivers
//! - [`document`] - a rope-backed [`LineStates`] host

pub mod config;
pub mod document;
pub mod error;
pub mod grammar;
pub mod groups;
pub mod highlighter;
pub mod line_match;
pub mod matcher;
pub mod overlay;
pub mod search;
pub mod states;

mod text;

pub use config::{CustomPatternConfig, HighlighterConfig};
pub use document::Document;
pub use error::HighlightError;
pub use grammar::{Grammar, GrammarBuilder, Pattern, Region, RegionId, RegionSpec, Rules};
pub use groups::{Group, GroupRegistry};
pub use highlighter::{Highlighter, RehighlightOutcome};
pub use line_match::LineMatch;
pub use matcher::match_line;
pub use overlay::{CustomPattern, CustomPatterns};
pub use search::{LineRegex, SearchMatch};
pub use states::{LineState, LineStates};
