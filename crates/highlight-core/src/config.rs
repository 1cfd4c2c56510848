//! Highlighter configuration.
//!
//! ```yaml
//! rehighlight-budget: 500
//! custom-patterns:
//!   - group: search
//!     regex: "needle"
//!   - group: todo
//!     regex: "\\b(TODO|FIXME)\\b"
//! ```

use crate::error::HighlightError;
use serde::Deserialize;
use std::num::NonZeroUsize;

/// A custom pattern entry in [`HighlighterConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomPatternConfig {
    /// Group name the pattern paints with.
    pub group: String,
    /// Regex source.
    pub regex: String,
}

/// Settings applied when constructing a [`Highlighter`](crate::Highlighter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HighlighterConfig {
    /// Maximum number of lines one budgeted incremental pass may visit. `None` is unbounded and
    /// 0 is rejected.
    pub rehighlight_budget: Option<NonZeroUsize>,
    /// Custom overlay patterns, registered in order.
    pub custom_patterns: Vec<CustomPatternConfig>,
}

impl HighlighterConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, HighlightError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
