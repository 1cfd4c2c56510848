//! Regex search over a single line, reported in **character offsets**.
//!
//! The `regex` crate matches on bytes; everything the engine stores or reports is in characters.
//! All byte results are translated here, so the rest of the crate never sees a byte offset.

use regex::{Captures, Regex};
use std::borrow::Cow;

/// A match expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

/// Number of characters in `text`.
pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(b, _)| b)
}

/// The part of `text` starting at character `char_offset`.
pub(crate) fn slice_from(text: &str, char_offset: usize) -> &str {
    &text[char_to_byte(text, char_offset)..]
}

/// The first `char_offset` characters of `text`.
pub(crate) fn slice_to(text: &str, char_offset: usize) -> &str {
    &text[..char_to_byte(text, char_offset)]
}

/// Replace every `skip` match with NUL filler of the same character length.
///
/// One pass only: filler is not searched again for further skip matches.
fn blank_skipped<'t>(skip: &Regex, text: &'t str) -> Cow<'t, str> {
    skip.replace_all(text, |caps: &Captures<'_>| {
        "\0".repeat(caps.get(0).map_or(0, |m| m.as_str().chars().count()))
    })
}

/// A compiled line regex that knows whether it relies on line anchors.
///
/// When the engine matches a slice of a line, `^` and `$` would otherwise match at the slice
/// boundaries. A regex that uses an anchor is therefore disabled wholesale whenever that anchor
/// is not valid for the slice being searched.
#[derive(Debug, Clone)]
pub struct LineRegex {
    regex: Regex,
    anchors_start: bool,
    anchors_end: bool,
}

impl LineRegex {
    /// Compile a line regex.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let (anchors_start, anchors_end) = scan_anchors(pattern);
        Ok(Self {
            regex,
            anchors_start,
            anchors_end,
        })
    }

    /// The regex source string.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern uses a start-of-line anchor (`^` or `\A`).
    pub fn anchors_start(&self) -> bool {
        self.anchors_start
    }

    /// Whether the pattern uses an end-of-line anchor (`$` or `\z`).
    pub fn anchors_end(&self) -> bool {
        self.anchors_end
    }

    fn usable(&self, can_match_start: bool, can_match_end: bool) -> bool {
        (can_match_start || !self.anchors_start) && (can_match_end || !self.anchors_end)
    }

    /// Find the leftmost match in `text`.
    ///
    /// If `skip` is given, its matches are blanked out first so they cannot be part of the result.
    pub fn find(
        &self,
        text: &str,
        skip: Option<&Regex>,
        can_match_start: bool,
        can_match_end: bool,
    ) -> Option<SearchMatch> {
        if !self.usable(can_match_start, can_match_end) {
            return None;
        }

        let haystack = match skip {
            Some(skip) => blank_skipped(skip, text),
            None => Cow::Borrowed(text),
        };
        let m = self.regex.find(&haystack)?;

        // Filler keeps character counts intact, so translating against the blanked text yields
        // offsets into the original line.
        Some(SearchMatch {
            start: char_count(&haystack[..m.start()]),
            end: char_count(&haystack[..m.end()]),
        })
    }

    /// Find all non-overlapping matches in `text`, left to right.
    pub fn find_all(
        &self,
        text: &str,
        can_match_start: bool,
        can_match_end: bool,
    ) -> Vec<SearchMatch> {
        if !self.usable(can_match_start, can_match_end) {
            return Vec::new();
        }

        let index = CharIndex::new(text);
        self.regex
            .find_iter(text)
            .map(|m| SearchMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            })
            .collect()
    }
}

/// Report whether `pattern` contains an unescaped start (`^`, `\A`) or end (`$`, `\z`) anchor
/// outside a character class.
fn scan_anchors(pattern: &str) -> (bool, bool) {
    let mut anchors_start = false;
    let mut anchors_end = false;
    let mut class_depth = 0usize;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('A') if class_depth == 0 => anchors_start = true,
                Some('z') if class_depth == 0 => anchors_end = true,
                _ => {}
            },
            '[' => {
                class_depth += 1;
                // `[^` negates and a leading `]` is literal.
                if chars.peek() == Some(&'^') {
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            '^' if class_depth == 0 => anchors_start = true,
            '$' if class_depth == 0 => anchors_end = true,
            _ => {}
        }
    }

    (anchors_start, anchors_end)
}
