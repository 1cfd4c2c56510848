//! Per-line state and the host document interface.

use crate::grammar::RegionId;
use crate::line_match::LineMatch;
use std::borrow::Cow;

/// The region open at the end of a line, or none.
///
/// This is the only information carried from one line to the next. Regions are immutable, so
/// two states are equal exactly when they refer to the same region of the same grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineState(Option<RegionId>);

impl LineState {
    /// No region is open.
    pub const NONE: Self = Self(None);

    /// `region` is open.
    pub const fn open(region: RegionId) -> Self {
        Self(Some(region))
    }

    /// The open region, if any.
    pub const fn region(self) -> Option<RegionId> {
        self.0
    }

    /// Returns `true` if a region is open.
    pub const fn is_open(self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<RegionId>> for LineState {
    fn from(region: Option<RegionId>) -> Self {
        Self(region)
    }
}

/// A line-oriented document that can also store highlighting results for every line.
///
/// Line numbers are 0-based. Line text excludes the line terminator. The highlighter only
/// touches the document through this trait and reports every offset in characters.
pub trait LineStates {
    /// Text of line `line`.
    fn line_text(&self, line: usize) -> Cow<'_, str>;

    /// Total number of lines.
    fn line_count(&self) -> usize;

    /// Stored end-of-line state of `line`.
    fn state(&self, line: usize) -> LineState;

    /// Store the end-of-line state of `line`.
    fn set_state(&mut self, line: usize, state: LineState);

    /// Store the color runs of `line`.
    fn set_match(&mut self, line: usize, runs: LineMatch);
}
