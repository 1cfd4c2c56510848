use crate::definition::{RawRule, RegionRule, SyntaxDefinition};
use crate::error::SyntaxError;
use highlight_core::{Grammar, GrammarBuilder, Group, GroupRegistry, RegionId, RegionSpec};
use std::collections::HashMap;

/// Compile `root` into a [`Grammar`], inlining includes from `definitions`.
pub(crate) fn compile(
    root: &SyntaxDefinition,
    definitions: &HashMap<String, SyntaxDefinition>,
    registry: &GroupRegistry,
) -> Result<Grammar, SyntaxError> {
    let mut compiler = Compiler {
        definitions,
        registry,
        builder: GrammarBuilder::new(root.filetype.clone()),
        include_stack: vec![root.filetype.clone()],
    };
    compiler.add_rules(None, &root.rules)?;
    Ok(compiler.builder.build())
}

struct Compiler<'a> {
    definitions: &'a HashMap<String, SyntaxDefinition>,
    registry: &'a GroupRegistry,
    builder: GrammarBuilder,
    /// File types currently being inlined, outermost first.
    include_stack: Vec<String>,
}

impl Compiler<'_> {
    fn add_rules(&mut self, parent: Option<RegionId>, rules: &[RawRule]) -> Result<(), SyntaxError> {
        for rule in rules {
            match rule {
                RawRule::Include(filetype) => self.include(parent, filetype)?,
                RawRule::Pattern { group, regex } => {
                    let group = self.group(group)?;
                    self.builder.add_pattern(parent, group, regex)?;
                }
                RawRule::Region { group, region } => self.add_region(parent, group, region)?,
            }
        }
        Ok(())
    }

    fn add_region(
        &mut self,
        parent: Option<RegionId>,
        group: &str,
        region: &RegionRule,
    ) -> Result<(), SyntaxError> {
        let group = self.group(group)?;
        let mut spec = RegionSpec::new(group, &region.start, &region.end);
        if let Some(skip) = &region.skip {
            spec = spec.with_skip(skip);
        }
        if let Some(limit_group) = &region.limit_group {
            spec = spec.with_limit_group(self.group(limit_group)?);
        }

        let id = self.builder.add_region(parent, spec)?;
        self.add_rules(Some(id), &region.rules)
    }

    fn include(&mut self, parent: Option<RegionId>, filetype: &str) -> Result<(), SyntaxError> {
        if self.include_stack.iter().any(|f| f == filetype) {
            return Err(SyntaxError::IncludeCycle(filetype.to_string()));
        }
        let definition = self
            .definitions
            .get(filetype)
            .ok_or_else(|| SyntaxError::UnknownInclude(filetype.to_string()))?;

        tracing::trace!(filetype, depth = self.include_stack.len(), "inlining include");
        self.include_stack.push(filetype.to_string());
        self.add_rules(parent, &definition.rules)?;
        self.include_stack.pop();
        Ok(())
    }

    fn group(&self, name: &str) -> Result<Group, SyntaxError> {
        if name.trim().is_empty() {
            return Err(SyntaxError::InvalidRule("empty group name".to_string()));
        }
        Ok(self.registry.resolve(name))
    }
}
