//! The line matcher: resolves regions and leaf patterns on one line.
//!
//! Matching recurses over character slices of the line. `start` is the character offset of the
//! current slice within the whole line; every recorded boundary is `start + local offset`.
//! `^` is only valid when the slice begins at character 0, and `$` only when the caller says the
//! slice reaches the true end of the line (`can_match_end`).

use crate::grammar::{Grammar, Pattern, RegionId};
use crate::groups::Group;
use crate::line_match::LineMatch;
use crate::search::{SearchMatch, char_count, slice_from, slice_to};
use crate::states::LineState;

/// Match one line against `grammar`, entering in `entry` state.
///
/// Returns the color runs (empty when `states_only`) and the state at the end of the line.
/// The result depends only on the grammar, the line text and the entry state. An entry state
/// naming a region `grammar` does not have (left over from another grammar) counts as
/// [`LineState::NONE`].
pub fn match_line(
    grammar: &Grammar,
    line: &str,
    entry: LineState,
    states_only: bool,
) -> (LineMatch, LineState) {
    let entry = LineState::from(
        entry
            .region()
            .filter(|&id| grammar.get_region(id).is_some()),
    );
    let mut runs = LineMatch::new();
    let mut matcher = LineMatcher {
        grammar,
        runs: &mut runs,
        states_only,
        end_state: entry,
    };
    match entry.region() {
        Some(region) => matcher.region(0, true, line, region),
        None => matcher.empty_region(0, true, line),
    }
    let end_state = matcher.end_state;
    (runs, end_state)
}

struct LineMatcher<'a> {
    grammar: &'a Grammar,
    runs: &'a mut LineMatch,
    states_only: bool,
    /// Set whenever a slice that reaches the end of the line finishes.
    end_state: LineState,
}

impl<'a> LineMatcher<'a> {
    fn record(&mut self, offset: usize, group: Group) {
        if !self.states_only {
            self.runs.set(offset, group);
        }
    }

    /// Match `line` while `id` is open.
    fn region(&mut self, start: usize, can_match_end: bool, line: &str, id: RegionId) {
        let grammar = self.grammar;
        let region = grammar.region(id);
        let can_match_start = start == 0;

        if start == 0 && !self.states_only {
            self.runs.set_if_absent(0, region.group());
        }

        if let Some(end) = region
            .end()
            .find(line, region.skip(), can_match_start, can_match_end)
        {
            self.record(start + end.start, region.limit_group());
            let after_group = region
                .parent()
                .map_or(Group::DEFAULT, |parent| grammar.region(parent).group());
            self.record(start + end.end, after_group);

            if !self.states_only {
                // Nested matches before the delimiter only affect colors.
                self.region(start, false, slice_to(line, end.start), id);
            }

            let rest = slice_from(line, end.end);
            match region.parent() {
                Some(parent) => self.region(start + end.end, can_match_end, rest, parent),
                None => self.empty_region(start + end.end, can_match_end, rest),
            }
            return;
        }

        let line_len = char_count(line);
        if line_len == 0 {
            if can_match_end {
                self.end_state = LineState::open(id);
            }
            return;
        }

        if let Some((child, found)) = self.first_region_start(
            region.rules().regions(),
            line,
            line_len,
            can_match_start,
            can_match_end,
        ) {
            self.record(start + found.start, grammar.region(child).limit_group());
            if !self.states_only {
                self.region(start, false, slice_to(line, found.start), id);
            }
            self.region(
                start + found.end,
                can_match_end,
                slice_from(line, found.end),
                child,
            );
            return;
        }

        if !self.states_only {
            self.paint(
                start,
                line,
                line_len,
                region.group(),
                region.rules().patterns(),
                can_match_start,
                can_match_end,
            );
        }

        if can_match_end {
            self.end_state = LineState::open(id);
        }
    }

    /// Match `line` while no region is open.
    fn empty_region(&mut self, start: usize, can_match_end: bool, line: &str) {
        let grammar = self.grammar;
        let line_len = char_count(line);
        if line_len == 0 {
            if can_match_end {
                self.end_state = LineState::NONE;
            }
            return;
        }

        let can_match_start = start == 0;
        if let Some((child, found)) = self.first_region_start(
            grammar.rules().regions(),
            line,
            line_len,
            can_match_start,
            can_match_end,
        ) {
            self.record(start + found.start, grammar.region(child).limit_group());
            if !self.states_only {
                self.empty_region(start, false, slice_to(line, found.start));
            }
            self.region(
                start + found.end,
                can_match_end,
                slice_from(line, found.end),
                child,
            );
            return;
        }

        if !self.states_only {
            self.paint(
                start,
                line,
                line_len,
                Group::DEFAULT,
                grammar.rules().patterns(),
                can_match_start,
                can_match_end,
            );
        }

        if can_match_end {
            self.end_state = LineState::NONE;
        }
    }

    /// Leftmost start match among `candidates`; the first declared wins a tie.
    ///
    /// A start match at the very end of the slice does not count.
    fn first_region_start(
        &self,
        candidates: &[RegionId],
        line: &str,
        line_len: usize,
        can_match_start: bool,
        can_match_end: bool,
    ) -> Option<(RegionId, SearchMatch)> {
        let mut first: Option<(RegionId, SearchMatch)> = None;
        for &candidate in candidates {
            let Some(found) = self.grammar.region(candidate).start().find(
                line,
                None,
                can_match_start,
                can_match_end,
            ) else {
                continue;
            };
            let leftmost = first.map_or(line_len, |(_, m)| m.start);
            if found.start < leftmost {
                first = Some((candidate, found));
            }
        }
        first
    }

    /// Paint leaf pattern matches over `base` and record a boundary wherever the color changes.
    ///
    /// Patterns are applied in declaration order, so a later pattern overwrites an earlier one
    /// on the characters both match.
    #[allow(clippy::too_many_arguments)]
    fn paint(
        &mut self,
        start: usize,
        line: &str,
        line_len: usize,
        base: Group,
        patterns: &[Pattern],
        can_match_start: bool,
        can_match_end: bool,
    ) {
        let mut colors = vec![base; line_len];
        for pattern in patterns {
            for m in pattern
                .regex()
                .find_all(line, can_match_start, can_match_end)
            {
                colors[m.start..m.end].fill(pattern.group());
            }
        }

        for (i, &group) in colors.iter().enumerate() {
            if i == 0 || group != colors[i - 1] {
                self.runs.set(start + i, group);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, RegionSpec};
    use pretty_assertions::assert_eq;

    const COMMENT: Group = Group::new(1);
    const WARNING: Group = Group::new(2);
    const STRING: Group = Group::new(3);
    const ESCAPE: Group = Group::new(4);
    const KEYWORD: Group = Group::new(5);

    fn comment_grammar() -> (Grammar, RegionId) {
        let mut builder = GrammarBuilder::new("test");
        let comment = builder
            .add_region(None, RegionSpec::new(COMMENT, r"/\*", r"\*/"))
            .unwrap();
        builder
            .add_pattern(Some(comment), WARNING, r"\bTODO\b")
            .unwrap();
        (builder.build(), comment)
    }

    fn colors(runs: &LineMatch, line: &str) -> Vec<Group> {
        (0..line.chars().count()).map(|i| runs.group_at(i)).collect()
    }

    #[test]
    fn test_region_opens_and_closes_on_one_line() {
        let (grammar, _) = comment_grammar();
        let line = "before /* TODO after */ tail";
        let (runs, state) = match_line(&grammar, line, LineState::NONE, false);

        assert_eq!(state, LineState::NONE);
        assert_eq!(runs.get(0), Some(Group::DEFAULT));
        assert_eq!(runs.get(7), Some(COMMENT));
        assert_eq!(runs.get(10), Some(WARNING));
        assert_eq!(runs.get(14), Some(COMMENT));
        assert_eq!(runs.get(21), Some(COMMENT));
        assert_eq!(runs.get(23), Some(Group::DEFAULT));

        let mut expected = vec![Group::DEFAULT; 7];
        expected.extend([COMMENT; 3]);
        expected.extend([WARNING; 4]);
        expected.extend([COMMENT; 9]);
        expected.extend([Group::DEFAULT; 5]);
        assert_eq!(colors(&runs, line), expected);
    }

    #[test]
    fn test_unterminated_region_carries_to_next_line() {
        let (grammar, comment) = comment_grammar();

        let (_, state) = match_line(&grammar, "/* open", LineState::NONE, false);
        assert_eq!(state, LineState::open(comment));

        let line = "close */ x";
        let (runs, state) = match_line(&grammar, line, LineState::open(comment), false);
        assert_eq!(state, LineState::NONE);
        assert_eq!(runs.get(0), Some(COMMENT));
        assert_eq!(runs.get(8), Some(Group::DEFAULT));
        assert_eq!(
            colors(&runs, line),
            [
                vec![COMMENT; 8],
                vec![Group::DEFAULT; 2],
            ]
            .concat()
        );
    }

    #[test]
    fn test_empty_line_keeps_state() {
        let (grammar, comment) = comment_grammar();
        let (runs, state) = match_line(&grammar, "", LineState::open(comment), false);
        assert_eq!(state, LineState::open(comment));
        assert_eq!(runs.get(0), Some(COMMENT));

        let (runs, state) = match_line(&grammar, "", LineState::NONE, false);
        assert_eq!(state, LineState::NONE);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_nested_region_returns_to_parent() {
        let mut builder = GrammarBuilder::new("test");
        let string = builder
            .add_region(None, RegionSpec::new(STRING, "\"", "\"").with_skip(r"\\."))
            .unwrap();
        let interp = builder
            .add_region(Some(string), RegionSpec::new(KEYWORD, r"\$\{", r"\}"))
            .unwrap();
        let grammar = builder.build();

        // Open string, open interpolation, close interpolation: back inside the string.
        let (runs, state) = match_line(&grammar, r#"x = "a ${b} c"#, LineState::NONE, false);
        assert_eq!(state, LineState::open(string));
        assert_eq!(runs.get(11), Some(STRING));

        // Interpolation left open at end of line.
        let (_, state) = match_line(&grammar, r#""a ${b"#, LineState::NONE, false);
        assert_eq!(state, LineState::open(interp));

        // Closing the interpolation on the next line resumes the parent region.
        let (_, state) = match_line(&grammar, "} still string", LineState::open(interp), false);
        assert_eq!(state, LineState::open(string));
    }

    #[test]
    fn test_skip_hides_escaped_delimiter() {
        let mut builder = GrammarBuilder::new("test");
        let string = builder
            .add_region(None, RegionSpec::new(STRING, "\"", "\"").with_skip(r"\\."))
            .unwrap();
        builder.add_pattern(Some(string), ESCAPE, r"\\.").unwrap();
        let grammar = builder.build();

        let line = r#"s = "a\"b" + 1"#;
        let (runs, state) = match_line(&grammar, line, LineState::NONE, false);
        assert_eq!(state, LineState::NONE);
        assert_eq!(runs.group_at(6), ESCAPE);
        assert_eq!(runs.group_at(7), ESCAPE);
        assert_eq!(runs.group_at(8), STRING);
        assert_eq!(runs.group_at(9), STRING);
        assert_eq!(runs.group_at(10), Group::DEFAULT);
    }

    #[test]
    fn test_leftmost_region_start_wins_and_ties_go_to_first_declared() {
        let mut builder = GrammarBuilder::new("test");
        let first = builder
            .add_region(None, RegionSpec::new(COMMENT, "#", "$"))
            .unwrap();
        let second = builder
            .add_region(None, RegionSpec::new(STRING, "#!", "$"))
            .unwrap();
        let string = builder
            .add_region(None, RegionSpec::new(STRING, "'", "'"))
            .unwrap();
        let grammar = builder.build();

        let (runs, _) = match_line(&grammar, "#! shebang", LineState::NONE, false);
        assert_eq!(runs.get(0), Some(COMMENT));
        assert_ne!(first, second);

        let (_, state) = match_line(&grammar, "x 'open # not a comment", LineState::NONE, false);
        assert_eq!(state, LineState::open(string));
    }

    #[test]
    fn test_later_patterns_overwrite_earlier() {
        let mut builder = GrammarBuilder::new("test");
        builder.add_pattern(None, KEYWORD, r"\w+").unwrap();
        builder.add_pattern(None, WARNING, r"TODO").unwrap();
        let grammar = builder.build();

        let (runs, _) = match_line(&grammar, "aTODOb c", LineState::NONE, false);
        assert_eq!(
            runs.iter().collect::<Vec<_>>(),
            vec![
                (0, KEYWORD),
                (1, WARNING),
                (5, KEYWORD),
                (6, Group::DEFAULT),
                (7, KEYWORD),
            ]
        );
    }

    #[test]
    fn test_anchors_respect_slice_boundaries() {
        let mut builder = GrammarBuilder::new("test");
        builder.add_pattern(None, KEYWORD, r"^word").unwrap();
        builder.add_pattern(None, WARNING, r"end$").unwrap();
        builder
            .add_region(None, RegionSpec::new(COMMENT, r"/\*", r"\*/"))
            .unwrap();
        let grammar = builder.build();

        // `word` after the comment is not at the start of the line, and `end` before the comment
        // is not at the end of the line, even though both sit at slice boundaries.
        let line = "end/* c */word";
        let (runs, _) = match_line(&grammar, line, LineState::NONE, false);
        assert!(colors(&runs, line).iter().all(|&g| g != KEYWORD && g != WARNING));

        let line = "word /* c */ end";
        let (runs, _) = match_line(&grammar, line, LineState::NONE, false);
        assert_eq!(runs.group_at(0), KEYWORD);
        assert_eq!(runs.group_at(13), WARNING);
    }

    #[test]
    fn test_states_only_skips_runs_but_matches_state() {
        let (grammar, _) = comment_grammar();
        for line in ["a /* b", "x */ y /* z */", "plain", "", "/* TODO"] {
            for entry in [LineState::NONE, match_line(&grammar, "/*", LineState::NONE, true).1] {
                let (runs, full) = match_line(&grammar, line, entry, false);
                let (empty, fast) = match_line(&grammar, line, entry, true);
                assert_eq!(full, fast, "line {line:?}");
                assert!(empty.is_empty());
                assert_eq!(match_line(&grammar, line, entry, false).0, runs);
            }
        }
    }

    #[test]
    fn test_state_from_another_grammar_counts_as_none() {
        let mut builder = GrammarBuilder::new("big");
        builder
            .add_region(None, RegionSpec::new(STRING, "'", "'"))
            .unwrap();
        let quote = builder
            .add_region(None, RegionSpec::new(STRING, "`", "`"))
            .unwrap();
        let big = builder.build();
        let (_, stale) = match_line(&big, "x `open", LineState::NONE, true);
        assert_eq!(stale, LineState::open(quote));

        let (small, comment) = comment_grammar();
        assert!(small.get_region(quote).is_none());
        assert!(small.get_region(comment).is_some());

        let (runs, state) = match_line(&small, "more", stale, false);
        assert_eq!(state, LineState::NONE);
        assert_eq!(runs.group_at(0), Group::DEFAULT);

        let (_, state) = match_line(&small, "x /* open", stale, true);
        assert_eq!(state, LineState::open(comment));
    }

    #[test]
    fn test_negated_class_is_not_an_anchor() {
        let mut builder = GrammarBuilder::new("test");
        builder
            .add_region(None, RegionSpec::new(COMMENT, r"/\*", r"\*/"))
            .unwrap();
        builder.add_pattern(None, STRING, r#""[^"]+""#).unwrap();
        let grammar = builder.build();
        let string = &grammar.rules().patterns()[0];
        assert!(!string.regex().anchors_start());

        // The string sits in the slice after the comment, which does not start the line.
        let line = r#"/* c */ "s" x"#;
        let (runs, state) = match_line(&grammar, line, LineState::NONE, false);
        assert_eq!(state, LineState::NONE);
        assert_eq!(runs.group_at(3), COMMENT);
        assert_eq!(runs.group_at(8), STRING);
        assert_eq!(runs.group_at(10), STRING);
        assert_eq!(runs.group_at(11), Group::DEFAULT);
    }

    #[test]
    fn test_offsets_are_characters() {
        let (grammar, _) = comment_grammar();
        let line = "héé /* ü */ ö";
        let (runs, state) = match_line(&grammar, line, LineState::NONE, false);
        assert_eq!(state, LineState::NONE);
        assert_eq!(runs.get(4), Some(COMMENT));
        assert_eq!(runs.get(11), Some(Group::DEFAULT));
    }
}
