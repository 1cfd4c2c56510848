//! The highlighter driver: runs the line matcher over whole documents or line ranges.

use crate::config::HighlighterConfig;
use crate::error::HighlightError;
use crate::grammar::Grammar;
use crate::groups::GroupRegistry;
use crate::line_match::LineMatch;
use crate::matcher::match_line;
use crate::overlay::CustomPatterns;
use crate::states::{LineState, LineStates};
use crate::text::split_lines;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Result of a budgeted incremental pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RehighlightOutcome {
    /// Last line whose state was recomputed.
    pub last_line: usize,
    /// `true` if the pass stopped because states stabilized (or the document ended), `false` if
    /// it ran out of budget and should be continued from `last_line + 1`.
    pub settled: bool,
}

/// Highlights documents with one grammar.
///
/// A highlighter keeps the end state of the line it processed last so consecutive lines can be
/// chained. It must not be shared between threads without external serialization; the grammar
/// and group registry it points to can be.
#[derive(Debug)]
pub struct Highlighter {
    grammar: Arc<Grammar>,
    registry: Arc<GroupRegistry>,
    last_region: LineState,
    custom_patterns: CustomPatterns,
    rehighlight_budget: Option<NonZeroUsize>,
}

impl Highlighter {
    /// Create a highlighter for `grammar`. `registry` names custom pattern groups.
    pub fn new(grammar: Arc<Grammar>, registry: Arc<GroupRegistry>) -> Self {
        Self {
            grammar,
            registry,
            last_region: LineState::NONE,
            custom_patterns: CustomPatterns::new(),
            rehighlight_budget: None,
        }
    }

    /// Create a highlighter and apply `config`.
    ///
    /// Custom patterns are registered in order and fail exactly like
    /// [`add_custom_pattern`](Self::add_custom_pattern).
    pub fn with_config(
        grammar: Arc<Grammar>,
        registry: Arc<GroupRegistry>,
        config: &HighlighterConfig,
    ) -> Result<Self, HighlightError> {
        let mut highlighter = Self::new(grammar, registry);
        highlighter.rehighlight_budget = config.rehighlight_budget;
        for custom in &config.custom_patterns {
            highlighter.add_custom_pattern(&custom.group, &custom.regex)?;
        }
        Ok(highlighter)
    }

    /// The grammar in use.
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// The group registry used for custom pattern groups.
    pub fn registry(&self) -> &Arc<GroupRegistry> {
        &self.registry
    }

    /// Registered custom patterns.
    pub fn custom_patterns(&self) -> &CustomPatterns {
        &self.custom_patterns
    }

    /// Line budget for [`rehighlight_states_budgeted`](Self::rehighlight_states_budgeted).
    pub fn rehighlight_budget(&self) -> Option<NonZeroUsize> {
        self.rehighlight_budget
    }

    /// Set the line budget for [`rehighlight_states_budgeted`](Self::rehighlight_states_budgeted).
    pub fn set_rehighlight_budget(&mut self, budget: Option<NonZeroUsize>) {
        self.rehighlight_budget = budget;
    }

    /// Add a custom pattern painting `regex` matches with the group named `group`.
    ///
    /// Fails if `regex` does not compile or `group` already has a custom pattern; the existing
    /// patterns are left untouched in both cases.
    pub fn add_custom_pattern(&mut self, group: &str, regex: &str) -> Result<(), HighlightError> {
        let id = self.registry.resolve(group);
        self.custom_patterns.add(id, group, regex)?;
        tracing::debug!(group, regex, "custom pattern added");
        Ok(())
    }

    /// Remove the custom pattern for the group named `group`. Does nothing if there is none.
    pub fn remove_custom_pattern(&mut self, group: &str) {
        let Some(id) = self.registry.lookup(group) else {
            return;
        };
        if self.custom_patterns.remove(id) {
            tracing::debug!(group, "custom pattern removed");
        }
    }

    /// Match one line entered in `entry`, updating the carried state.
    fn highlight_line(&mut self, line: &str, entry: LineState, states_only: bool) -> LineMatch {
        let (mut runs, end_state) = match_line(&self.grammar, line, entry, states_only);
        self.last_region = end_state;
        if !states_only {
            self.custom_patterns.apply(&mut runs, line);
        }
        runs
    }

    /// Highlight independent text, one [`LineMatch`] per `\n`-separated line.
    ///
    /// Starts from "no open region" regardless of earlier calls.
    pub fn highlight_string(&mut self, input: &str) -> Vec<LineMatch> {
        self.last_region = LineState::NONE;
        split_lines(input)
            .map(|line| {
                let entry = self.last_region;
                self.highlight_line(line, entry, false)
            })
            .collect()
    }

    /// Compute and store the end state of every line, without building color runs.
    pub fn highlight_states<S: LineStates + ?Sized>(&mut self, input: &mut S) {
        self.last_region = LineState::NONE;
        for line in 0..input.line_count() {
            let entry = self.last_region;
            {
                let text = input.line_text(line);
                self.highlight_line(&text, entry, true);
            }
            input.set_state(line, self.last_region);
        }
    }

    /// Compute and store color runs for lines `startline..=endline`.
    ///
    /// States must already be correct up to `startline - 1`. Lines past the end of the document
    /// are ignored.
    pub fn highlight_matches<S: LineStates + ?Sized>(
        &mut self,
        input: &mut S,
        startline: usize,
        endline: usize,
    ) {
        let last = endline.min(input.line_count().saturating_sub(1));
        if startline > last || input.line_count() == 0 {
            return;
        }

        for line in startline..=last {
            let entry = entry_state(input, line);
            let runs = {
                let text = input.line_text(line);
                self.highlight_line(&text, entry, false)
            };
            input.set_match(line, runs);
        }
    }

    /// Recompute end states from `startline` down until a line's new state equals its stored
    /// state.
    ///
    /// State propagation is a pure function of (previous state, line text), so once the new and
    /// stored states agree every later stored state is already correct. Returns the line where
    /// the pass stopped, or the last line if it never stabilized.
    pub fn rehighlight_states<S: LineStates + ?Sized>(
        &mut self,
        input: &mut S,
        startline: usize,
    ) -> usize {
        let outcome = self.rehighlight_bounded(input, startline, usize::MAX);
        outcome.last_line
    }

    /// Like [`rehighlight_states`](Self::rehighlight_states), but visits at most
    /// [`rehighlight_budget`](Self::rehighlight_budget) lines.
    pub fn rehighlight_states_budgeted<S: LineStates + ?Sized>(
        &mut self,
        input: &mut S,
        startline: usize,
    ) -> RehighlightOutcome {
        let budget = self.rehighlight_budget.map_or(usize::MAX, NonZeroUsize::get);
        self.rehighlight_bounded(input, startline, budget)
    }

    /// Incremental pass after an edit spanning lines `first..=last`.
    ///
    /// Stored states inside an edited span may be stale or placeholders, so agreement there
    /// proves nothing: the pass is restarted until it has recomputed `last`. Returns the line
    /// where it finally stopped.
    pub fn rehighlight_lines<S: LineStates + ?Sized>(
        &mut self,
        input: &mut S,
        first: usize,
        last: usize,
    ) -> usize {
        let mut line = first;
        loop {
            let stopped = self.rehighlight_states(input, line);
            if stopped >= last || stopped + 1 >= input.line_count() {
                return stopped;
            }
            line = stopped + 1;
        }
    }

    fn rehighlight_bounded<S: LineStates + ?Sized>(
        &mut self,
        input: &mut S,
        startline: usize,
        budget: usize,
    ) -> RehighlightOutcome {
        let line_count = input.line_count();
        let last_line = line_count.saturating_sub(1);
        if startline >= line_count {
            return RehighlightOutcome {
                last_line,
                settled: true,
            };
        }

        self.last_region = entry_state(input, startline);
        let mut visited = 0usize;
        for line in startline..line_count {
            let entry = self.last_region;
            {
                let text = input.line_text(line);
                self.highlight_line(&text, entry, true);
            }
            let new_state = self.last_region;
            let old_state = input.state(line);
            input.set_state(line, new_state);
            visited += 1;

            if new_state == old_state {
                tracing::trace!(startline, stopped = line, "line states settled");
                return RehighlightOutcome {
                    last_line: line,
                    settled: true,
                };
            }
            if visited >= budget && line < last_line {
                tracing::trace!(startline, stopped = line, "rehighlight budget exhausted");
                return RehighlightOutcome {
                    last_line: line,
                    settled: false,
                };
            }
        }

        RehighlightOutcome {
            last_line,
            settled: true,
        }
    }

    /// Recompute state and color runs of exactly one line, entering with the stored state of the
    /// line above.
    ///
    /// The caller is responsible for knowing that this line's end state does not change (or for
    /// running an incremental pass afterwards).
    pub fn rehighlight_line<S: LineStates + ?Sized>(&mut self, input: &mut S, line: usize) {
        if line >= input.line_count() {
            return;
        }

        let entry = entry_state(input, line);
        let runs = {
            let text = input.line_text(line);
            self.highlight_line(&text, entry, false)
        };
        input.set_match(line, runs);
        input.set_state(line, self.last_region);
    }
}

fn entry_state<S: LineStates + ?Sized>(input: &S, line: usize) -> LineState {
    if line == 0 {
        LineState::NONE
    } else {
        input.state(line - 1)
    }
}
