//! Custom patterns overlaid on grammar colors.
//!
//! Custom patterns are independent of the grammar: they always see the whole line (both anchors
//! valid) and their matches replace whatever grammar runs they cover. Each pattern is applied on
//! top of the ones registered before it.

use crate::error::HighlightError;
use crate::groups::Group;
use crate::line_match::LineMatch;
use crate::search::{LineRegex, char_count};

/// A custom overlay rule.
#[derive(Debug, Clone)]
pub struct CustomPattern {
    group: Group,
    regex: LineRegex,
}

impl CustomPattern {
    /// Group painted over every match.
    pub fn group(&self) -> Group {
        self.group
    }

    /// The compiled regex.
    pub fn regex(&self) -> &LineRegex {
        &self.regex
    }
}

/// Ordered set of custom patterns, at most one per group.
#[derive(Debug, Clone, Default)]
pub struct CustomPatterns {
    patterns: Vec<CustomPattern>,
}

impl CustomPatterns {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `regex` for `group`. `group_name` is only used in the error message.
    pub fn add(&mut self, group: Group, group_name: &str, regex: &str) -> Result<(), HighlightError> {
        let compiled =
            LineRegex::new(regex).map_err(|e| HighlightError::invalid_custom_pattern(regex, e))?;

        if self.patterns.iter().any(|p| p.group == group) {
            return Err(HighlightError::DuplicateCustomPattern {
                group: group_name.to_string(),
            });
        }

        self.patterns.push(CustomPattern {
            group,
            regex: compiled,
        });
        Ok(())
    }

    /// Remove the pattern registered for `group`. Returns `false` if there was none.
    pub fn remove(&mut self, group: Group) -> bool {
        let Some(idx) = self.patterns.iter().position(|p| p.group == group) else {
            return false;
        };
        self.patterns.remove(idx);
        true
    }

    /// Registered patterns, in application order.
    pub fn patterns(&self) -> &[CustomPattern] {
        &self.patterns
    }

    /// Returns `true` if no custom pattern is registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Overlay every custom pattern onto `runs` for `line`.
    pub fn apply(&self, runs: &mut LineMatch, line: &str) {
        if self.patterns.is_empty() {
            return;
        }

        let line_len = char_count(line);
        for pattern in &self.patterns {
            for m in pattern.regex.find_all(line, true, true) {
                if m.is_empty() {
                    continue;
                }

                // Grammar color in effect just before the match ends.
                let resume = runs.last_before(m.end).map(|(_, group)| group);
                runs.clear_range(m.start..m.end);
                runs.set(m.start, pattern.group);

                if let Some(resume) = resume {
                    if m.end < line_len && !runs.contains(m.end) {
                        runs.set(m.end, resume);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COMMENT: Group = Group::new(1);
    const SEARCH: Group = Group::new(7);
    const MARK: Group = Group::new(8);

    fn runs(entries: &[(usize, Group)]) -> LineMatch {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_overlay_replaces_inner_boundaries_and_restores_after() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", "needle").unwrap();

        // "xx /* a needle b */" with the comment starting at 3.
        let line = "xx /* a needle b */";
        let mut m = runs(&[(0, Group::DEFAULT), (3, COMMENT), (10, COMMENT)]);
        custom.apply(&mut m, line);

        assert_eq!(
            m.iter().collect::<Vec<_>>(),
            vec![(0, Group::DEFAULT), (3, COMMENT), (8, SEARCH), (14, COMMENT)]
        );
    }

    #[test]
    fn test_overlay_at_line_end_does_not_restore() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", "end").unwrap();

        let line = "the end";
        let mut m = runs(&[(0, Group::DEFAULT)]);
        custom.apply(&mut m, line);
        assert_eq!(
            m.iter().collect::<Vec<_>>(),
            vec![(0, Group::DEFAULT), (4, SEARCH)]
        );
    }

    #[test]
    fn test_overlay_keeps_existing_boundary_at_match_end() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", "ab").unwrap();

        let line = "abcd";
        let mut m = runs(&[(0, COMMENT), (2, Group::DEFAULT)]);
        custom.apply(&mut m, line);
        assert_eq!(
            m.iter().collect::<Vec<_>>(),
            vec![(0, SEARCH), (2, Group::DEFAULT)]
        );
    }

    #[test]
    fn test_overlay_is_idempotent() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", r"\d+").unwrap();
        custom.add(MARK, "mark", "x").unwrap();

        let line = "a 12 x 345 y";
        let base = runs(&[(0, Group::DEFAULT), (5, COMMENT)]);

        let mut once = base.clone();
        custom.apply(&mut once, line);
        let mut again = base.clone();
        custom.apply(&mut again, line);
        assert_eq!(once, again);

        let mut twice = once.clone();
        custom.apply(&mut twice, line);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_duplicate_group_rejected_and_original_kept() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", "a").unwrap();

        let err = custom.add(SEARCH, "search", "b").unwrap_err();
        assert!(matches!(err, HighlightError::DuplicateCustomPattern { ref group } if group == "search"));
        assert_eq!(custom.patterns().len(), 1);
        assert_eq!(custom.patterns()[0].regex().as_str(), "a");
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let mut custom = CustomPatterns::new();
        let err = custom.add(SEARCH, "search", "(").unwrap_err();
        assert!(matches!(err, HighlightError::InvalidCustomPattern { .. }));
        assert!(custom.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", "a").unwrap();
        assert!(!custom.remove(MARK));
        assert!(custom.remove(SEARCH));
        assert!(custom.is_empty());
    }

    #[test]
    fn test_zero_width_matches_are_ignored() {
        let mut custom = CustomPatterns::new();
        custom.add(SEARCH, "search", "z*").unwrap();

        let mut m = runs(&[(0, COMMENT)]);
        custom.apply(&mut m, "abc");
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(0, COMMENT)]);
    }
}
