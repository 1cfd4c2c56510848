//! The immutable grammar model: an arena of regions plus leaf patterns at every nesting level.
//!
//! Regions refer to their parent and children by [`RegionId`], an index into the grammar's
//! arena. A [`LineState`](crate::LineState) stores such an id, so carrying state from one line to
//! the next never copies or borrows a region.

use crate::error::HighlightError;
use crate::groups::Group;
use crate::search::LineRegex;
use regex::Regex;
use std::num::NonZeroU32;

/// Stable index of a region inside its [`Grammar`].
///
/// The raw value is never 0, so `Option<RegionId>` uses 0 for "no open region".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(NonZeroU32);

impl RegionId {
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MAX))
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// A leaf pattern: a regex that paints its matches with a group. Leaf patterns never nest.
#[derive(Debug, Clone)]
pub struct Pattern {
    group: Group,
    regex: LineRegex,
}

impl Pattern {
    /// The group assigned to matched characters.
    pub fn group(&self) -> Group {
        self.group
    }

    /// The compiled regex.
    pub fn regex(&self) -> &LineRegex {
        &self.regex
    }
}

/// The rules available at one nesting level: nested regions and leaf patterns, in declaration
/// order.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    regions: Vec<RegionId>,
    patterns: Vec<Pattern>,
}

impl Rules {
    /// Nested regions, in declaration order.
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    /// Leaf patterns, in declaration order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Returns `true` if this level has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.patterns.is_empty()
    }
}

/// A nestable lexical context bounded by start/end delimiters.
#[derive(Debug, Clone)]
pub struct Region {
    group: Group,
    limit_group: Group,
    parent: Option<RegionId>,
    start: LineRegex,
    end: LineRegex,
    skip: Option<Regex>,
    rules: Rules,
}

impl Region {
    /// Group applied to the region's content.
    pub fn group(&self) -> Group {
        self.group
    }

    /// Group applied to the start and end delimiters.
    pub fn limit_group(&self) -> Group {
        self.limit_group
    }

    /// Enclosing region, or `None` for a top-level region.
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Start delimiter regex.
    pub fn start(&self) -> &LineRegex {
        &self.start
    }

    /// End delimiter regex.
    pub fn end(&self) -> &LineRegex {
        &self.end
    }

    /// Regex whose matches are ignored when searching for the end delimiter.
    pub fn skip(&self) -> Option<&Regex> {
        self.skip.as_ref()
    }

    /// Rules nested inside this region.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}

/// A compiled, read-only syntax definition.
///
/// Build one with [`GrammarBuilder`]; share it behind an `Arc` between highlighters.
#[derive(Debug, Clone)]
pub struct Grammar {
    filetype: String,
    regions: Vec<Region>,
    rules: Rules,
}

impl Grammar {
    /// A grammar with no rules. Every line highlights as [`Group::DEFAULT`].
    pub fn empty(filetype: impl Into<String>) -> Self {
        Self {
            filetype: filetype.into(),
            regions: Vec::new(),
            rules: Rules::default(),
        }
    }

    /// File type name of this grammar.
    pub fn filetype(&self) -> &str {
        &self.filetype
    }

    /// Top-level rules.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Look up a region by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different grammar.
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    /// Look up a region by id, or `None` if this grammar has no such region.
    pub fn get_region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Number of regions in the arena.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Iterate over all regions with their ids, in creation order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(idx, region)| (RegionId::from_index(idx), region))
    }

    fn pattern_count(&self) -> usize {
        self.rules.patterns.len()
            + self
                .regions
                .iter()
                .map(|r| r.rules.patterns.len())
                .sum::<usize>()
    }
}

/// Delimiters and groups describing a region to add to a [`GrammarBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct RegionSpec<'a> {
    /// Group for the region's content.
    pub group: Group,
    /// Group for the delimiters; defaults to `group`.
    pub limit_group: Option<Group>,
    /// Start delimiter regex.
    pub start: &'a str,
    /// End delimiter regex.
    pub end: &'a str,
    /// Optional skip regex (e.g. escaped delimiters).
    pub skip: Option<&'a str>,
}

impl<'a> RegionSpec<'a> {
    /// A region with the given group and delimiters, no skip pattern.
    pub fn new(group: Group, start: &'a str, end: &'a str) -> Self {
        Self {
            group,
            limit_group: None,
            start,
            end,
            skip: None,
        }
    }

    /// Set the skip regex.
    pub fn with_skip(mut self, skip: &'a str) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the delimiter group.
    pub fn with_limit_group(mut self, limit_group: Group) -> Self {
        self.limit_group = Some(limit_group);
        self
    }
}

/// Builds a [`Grammar`]. Every regex is compiled when it is added, so a bad pattern is reported
/// immediately with [`HighlightError::GrammarCompile`].
#[derive(Debug)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    /// Start an empty grammar for `filetype`.
    pub fn new(filetype: impl Into<String>) -> Self {
        Self {
            grammar: Grammar::empty(filetype),
        }
    }

    fn rules_mut(&mut self, parent: Option<RegionId>) -> &mut Rules {
        match parent {
            Some(id) => &mut self.grammar.regions[id.index()].rules,
            None => &mut self.grammar.rules,
        }
    }

    /// Add a leaf pattern at top level (`parent == None`) or inside a region.
    pub fn add_pattern(
        &mut self,
        parent: Option<RegionId>,
        group: Group,
        regex: &str,
    ) -> Result<&mut Self, HighlightError> {
        let regex = compile(regex)?;
        self.rules_mut(parent).patterns.push(Pattern { group, regex });
        Ok(self)
    }

    /// Add a region at top level (`parent == None`) or nested inside another region.
    pub fn add_region(
        &mut self,
        parent: Option<RegionId>,
        spec: RegionSpec<'_>,
    ) -> Result<RegionId, HighlightError> {
        let start = compile(spec.start)?;
        let end = compile(spec.end)?;
        let skip = spec
            .skip
            .map(|skip| Regex::new(skip).map_err(|e| HighlightError::grammar_compile(skip, e)))
            .transpose()?;

        let id = RegionId::from_index(self.grammar.regions.len());
        self.grammar.regions.push(Region {
            group: spec.group,
            limit_group: spec.limit_group.unwrap_or(spec.group),
            parent,
            start,
            end,
            skip,
            rules: Rules::default(),
        });
        self.rules_mut(parent).regions.push(id);
        Ok(id)
    }

    /// Finish building.
    pub fn build(self) -> Grammar {
        tracing::debug!(
            filetype = %self.grammar.filetype,
            regions = self.grammar.region_count(),
            patterns = self.grammar.pattern_count(),
            "grammar built"
        );
        self.grammar
    }
}

fn compile(pattern: &str) -> Result<LineRegex, HighlightError> {
    LineRegex::new(pattern).map_err(|e| HighlightError::grammar_compile(pattern, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_tree_links() {
        let mut builder = GrammarBuilder::new("test");
        let string = builder
            .add_region(None, RegionSpec::new(Group(1), "\"", "\"").with_skip(r"\\."))
            .unwrap();
        let interp = builder
            .add_region(Some(string), RegionSpec::new(Group(2), r"\$\{", r"\}"))
            .unwrap();
        builder.add_pattern(Some(string), Group(3), r"\\.").unwrap();
        let grammar = builder.build();

        assert_eq!(grammar.region_count(), 2);
        assert_eq!(grammar.rules().regions(), &[string]);
        assert_eq!(grammar.region(string).rules().regions(), &[interp]);
        assert_eq!(grammar.region(string).rules().patterns().len(), 1);
        assert_eq!(grammar.region(interp).parent(), Some(string));
        assert_eq!(grammar.region(string).parent(), None);
    }

    #[test]
    fn test_limit_group_defaults_to_group() {
        let mut builder = GrammarBuilder::new("test");
        let plain = builder
            .add_region(None, RegionSpec::new(Group(1), "<", ">"))
            .unwrap();
        let limited = builder
            .add_region(
                None,
                RegionSpec::new(Group(1), r"\(", r"\)").with_limit_group(Group(9)),
            )
            .unwrap();
        let grammar = builder.build();

        assert_eq!(grammar.region(plain).limit_group(), Group(1));
        assert_eq!(grammar.region(limited).limit_group(), Group(9));
    }

    #[test]
    fn test_bad_regex_is_grammar_compile_error() {
        let mut builder = GrammarBuilder::new("test");
        let err = builder
            .add_region(None, RegionSpec::new(Group(1), "(", ")"))
            .unwrap_err();
        assert!(matches!(err, HighlightError::GrammarCompile { ref pattern, .. } if pattern == "("));

        let err = builder.add_pattern(None, Group(1), "[a-").unwrap_err();
        assert!(matches!(err, HighlightError::GrammarCompile { .. }));
    }

    #[test]
    fn test_region_ids_are_never_zero() {
        let id = RegionId::from_index(0);
        assert_eq!(id.0.get(), 1);
        assert_eq!(id.index(), 0);
        assert_eq!(std::mem::size_of::<Option<RegionId>>(), 4);
    }
}
