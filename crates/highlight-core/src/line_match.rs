//! Sparse per-line color runs.

use crate::groups::Group;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::Range;

/// Color runs of one line: character offset -> group.
///
/// An entry at offset `k` means "from `k` up to the next recorded offset (or the end of the
/// line), use this group". Offsets are characters, not bytes. Characters before the first entry
/// use [`Group::DEFAULT`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMatch {
    runs: BTreeMap<usize, Group>,
}

impl LineMatch {
    /// Create an empty run map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group recorded exactly at `offset`.
    pub fn get(&self, offset: usize) -> Option<Group> {
        self.runs.get(&offset).copied()
    }

    /// Record `group` at `offset`, replacing any previous entry.
    pub fn set(&mut self, offset: usize, group: Group) {
        self.runs.insert(offset, group);
    }

    /// Record `group` at `offset` only if nothing is recorded there yet.
    pub fn set_if_absent(&mut self, offset: usize, group: Group) {
        self.runs.entry(offset).or_insert(group);
    }

    /// Returns `true` if a boundary is recorded at `offset`.
    pub fn contains(&self, offset: usize) -> bool {
        self.runs.contains_key(&offset)
    }

    /// Remove every boundary whose offset lies in `range`.
    pub fn clear_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let tail = self.runs.split_off(&range.start);
        self.runs
            .extend(tail.into_iter().filter(|(offset, _)| !range.contains(offset)));
    }

    /// The entry with the largest offset strictly below `offset`.
    pub fn last_before(&self, offset: usize) -> Option<(usize, Group)> {
        self.runs
            .range(..offset)
            .next_back()
            .map(|(&k, &g)| (k, g))
    }

    /// Group in effect at character `offset`.
    pub fn group_at(&self, offset: usize) -> Group {
        self.runs
            .range(..=offset)
            .next_back()
            .map_or(Group::DEFAULT, |(_, &g)| g)
    }

    /// Number of recorded boundaries.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if no boundary is recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Iterate over `(offset, group)` boundaries in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Group)> + '_ {
        self.runs.iter().map(|(&k, &g)| (k, g))
    }

    /// Maximal spans of a line of `line_len` characters, with adjacent equal groups merged.
    ///
    /// Boundaries at or past `line_len` are ignored. Empty lines yield no spans.
    pub fn spans(&self, line_len: usize) -> Vec<(Range<usize>, Group)> {
        let mut spans: Vec<(Range<usize>, Group)> = Vec::new();
        let mut cursor = 0usize;
        let mut current = Group::DEFAULT;

        for (offset, group) in self.iter().take_while(|&(offset, _)| offset < line_len) {
            if group == current {
                continue;
            }
            if offset > cursor {
                spans.push((cursor..offset, current));
            }
            cursor = offset;
            current = group;
        }
        if line_len > cursor {
            spans.push((cursor..line_len, current));
        }
        spans
    }
}

impl FromIterator<(usize, Group)> for LineMatch {
    fn from_iter<I: IntoIterator<Item = (usize, Group)>>(iter: I) -> Self {
        Self {
            runs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LineMatch {
    type Item = (usize, Group);
    type IntoIter = btree_map::IntoIter<usize, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.into_iter()
    }
}
