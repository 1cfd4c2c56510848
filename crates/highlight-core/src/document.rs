//! A rope-backed document that stores highlighting results per line.
//!
//! `Document` is a ready-made [`LineStates`] host: it keeps the text in a [`Rope`] and one
//! [`LineState`] plus optional [`LineMatch`] per line, and keeps both aligned with the text
//! across edits.

use crate::line_match::LineMatch;
use crate::states::{LineState, LineStates};
use ropey::Rope;
use std::borrow::Cow;
use std::ops::RangeInclusive;

/// Text plus per-line highlighting storage.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    states: Vec<LineState>,
    matches: Vec<Option<LineMatch>>,
}

impl Document {
    /// Create an empty document (one empty line).
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Build a document from text. No line is highlighted yet.
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let lines = rope.len_lines();
        Self {
            rope,
            states: vec![LineState::NONE; lines],
            matches: vec![None; lines],
        }
    }

    /// Complete text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Character offset of (`line`, `column`), clamped to the document.
    pub fn position_to_char_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }

        let line_start = self.rope.line_to_char(line);
        line_start + column.min(self.line_len(line))
    }

    /// Number of characters on `line`, excluding the line terminator.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len == 0 {
            return 0;
        }
        // A trailing break char is always a terminator: ropey starts a new line after it.
        match slice.char(len - 1) {
            '\n' => {
                len -= 1;
                if len > 0 && slice.char(len - 1) == '\r' {
                    len -= 1;
                }
            }
            '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => len -= 1,
            _ => {}
        }
        len
    }

    /// Stored color runs of `line`, if they have been computed since the line last changed.
    pub fn line_match(&self, line: usize) -> Option<&LineMatch> {
        self.matches.get(line).and_then(Option::as_ref)
    }

    /// Insert `text` at character `char_offset`.
    ///
    /// Returns the range of lines whose text changed, in post-edit line numbers. New lines get
    /// [`LineState::NONE`] as a placeholder and every changed line loses its color runs.
    pub fn insert(&mut self, char_offset: usize, text: &str) -> RangeInclusive<usize> {
        let char_offset = char_offset.min(self.rope.len_chars());
        self.replace(char_offset, char_offset, text)
    }

    /// Delete `len_chars` characters starting at `start_char`.
    ///
    /// Returns the range of lines whose text changed, in post-edit line numbers. This is more
    /// than one line when the deletion splits a `\r\n` pair.
    pub fn delete(&mut self, start_char: usize, len_chars: usize) -> RangeInclusive<usize> {
        let start_char = start_char.min(self.rope.len_chars());
        let end_char = start_char.saturating_add(len_chars).min(self.rope.len_chars());
        self.replace(start_char, end_char, "")
    }

    /// Replace the characters `start..end` with `text`.
    ///
    /// Text after `end` is untouched, so the last changed line ends where the line holding `end`
    /// ended before the edit and inherits its stored state.
    fn replace(&mut self, start: usize, end: usize, text: &str) -> RangeInclusive<usize> {
        let old_first = self.rope.char_to_line(start);
        let old_last = self.rope.char_to_line(end);

        if start < end {
            self.rope.remove(start..end);
        }
        self.rope.insert(start, text);

        // A `\n` landing right after a `\r` joins the line above.
        let first = old_first.min(self.rope.char_to_line(start));
        let last = self.rope.char_to_line(start + text.chars().count());

        let carried = self.state(old_last);
        self.states.splice(
            first..=old_last,
            std::iter::repeat_n(LineState::NONE, last - first).chain(std::iter::once(carried)),
        );
        self.matches
            .splice(first..=old_last, std::iter::repeat_n(None, last - first + 1));

        first..=last
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStates for Document {
    fn line_text(&self, line: usize) -> Cow<'_, str> {
        if line >= self.rope.len_lines() {
            return Cow::Borrowed("");
        }

        let text = self.rope.line(line).slice(..self.line_len(line));
        match text.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(text.to_string()),
        }
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn state(&self, line: usize) -> LineState {
        self.states.get(line).copied().unwrap_or_default()
    }

    fn set_state(&mut self, line: usize, state: LineState) {
        if let Some(slot) = self.states.get_mut(line) {
            *slot = state;
        }
    }

    fn set_match(&mut self, line: usize, runs: LineMatch) {
        if let Some(slot) = self.matches.get_mut(line) {
            *slot = Some(runs);
        }
    }
}
