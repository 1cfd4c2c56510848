use crate::compiler::compile;
use crate::definition::SyntaxDefinition;
use crate::error::SyntaxError;
use highlight_core::{Grammar, GroupRegistry, Highlighter};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
struct Detector {
    filetype: String,
    filename: Option<Regex>,
    header: Option<Regex>,
}

impl Detector {
    fn new(definition: &SyntaxDefinition) -> Result<Self, SyntaxError> {
        Ok(Self {
            filetype: definition.filetype.clone(),
            filename: definition.detect.filename.as_deref().map(detect_regex).transpose()?,
            header: definition.detect.header.as_deref().map(detect_regex).transpose()?,
        })
    }
}

fn detect_regex(pattern: &str) -> Result<Regex, SyntaxError> {
    Regex::new(pattern).map_err(|e| SyntaxError::InvalidDetectPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug)]
/// A collection of syntax files sharing one [`GroupRegistry`].
///
/// Files are parsed when added and compiled lazily on the first [`grammar`](Self::grammar) call,
/// so includes may name file types that are added later.
pub struct SyntaxSet {
    registry: Arc<GroupRegistry>,
    definitions: HashMap<String, SyntaxDefinition>,
    detectors: Vec<Detector>,
    compiled: HashMap<String, Arc<Grammar>>,
}

impl Default for SyntaxSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxSet {
    /// Create an empty set with its own group registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(GroupRegistry::new()))
    }

    /// Create an empty set resolving group names through `registry`.
    pub fn with_registry(registry: Arc<GroupRegistry>) -> Self {
        Self {
            registry,
            definitions: HashMap::new(),
            detectors: Vec::new(),
            compiled: HashMap::new(),
        }
    }

    /// The group registry shared by every grammar of this set.
    pub fn registry(&self) -> &Arc<GroupRegistry> {
        &self.registry
    }

    /// Adds a syntax file from a YAML string and returns its file type.
    ///
    /// A file with an already known file type replaces the old one.
    pub fn add_from_str(&mut self, yaml: &str) -> Result<String, SyntaxError> {
        let definition: SyntaxDefinition = serde_yaml::from_str(yaml)?;
        if definition.filetype.trim().is_empty() {
            return Err(SyntaxError::InvalidRule(
                "syntax file has an empty filetype".to_string(),
            ));
        }

        let detector = Detector::new(&definition)?;
        let filetype = definition.filetype.clone();
        match self.detectors.iter_mut().find(|d| d.filetype == filetype) {
            Some(existing) => *existing = detector,
            None => self.detectors.push(detector),
        }
        self.definitions.insert(filetype.clone(), definition);
        // Any compiled grammar may have inlined the old version.
        self.compiled.clear();

        tracing::debug!(filetype = %filetype, "syntax file loaded");
        Ok(filetype)
    }

    /// Adds a syntax file from a filesystem path and returns its file type.
    pub fn add_from_path(&mut self, path: impl AsRef<Path>) -> Result<String, SyntaxError> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        self.add_from_str(&yaml)
    }

    /// Adds every `.yaml` file in `dir`, in file name order. Returns the file types added.
    pub fn add_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<Vec<String>, SyntaxError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| self.add_from_path(path)).collect()
    }

    /// Returns the compiled grammar for `filetype`, compiling it on first use.
    pub fn grammar(&mut self, filetype: &str) -> Result<Arc<Grammar>, SyntaxError> {
        if let Some(grammar) = self.compiled.get(filetype) {
            return Ok(grammar.clone());
        }

        let definition = self
            .definitions
            .get(filetype)
            .ok_or_else(|| SyntaxError::UnknownFiletype(filetype.to_string()))?;
        let grammar = Arc::new(compile(definition, &self.definitions, &self.registry)?);
        tracing::debug!(
            filetype,
            regions = grammar.region_count(),
            "syntax compiled"
        );

        self.compiled.insert(filetype.to_string(), grammar.clone());
        Ok(grammar)
    }

    /// A fresh highlighter for `filetype`.
    pub fn highlighter(&mut self, filetype: &str) -> Result<Highlighter, SyntaxError> {
        let grammar = self.grammar(filetype)?;
        Ok(Highlighter::new(grammar, self.registry.clone()))
    }

    /// Detects the file type of a file.
    ///
    /// File name patterns are tried first, in the order files were added; the header patterns
    /// are only consulted against `first_line` when no file name matched.
    pub fn detect(&self, filename: &str, first_line: Option<&str>) -> Option<&str> {
        let by_name = self
            .detectors
            .iter()
            .find(|d| d.filename.as_ref().is_some_and(|re| re.is_match(filename)));

        let found = by_name.or_else(|| {
            let line = first_line?;
            self.detectors
                .iter()
                .find(|d| d.header.as_ref().is_some_and(|re| re.is_match(line)))
        });

        tracing::trace!(filename, filetype = ?found.map(|d| &d.filetype), "filetype detection");
        found.map(|d| d.filetype.as_str())
    }

    /// Known file types, in the order they were first added.
    pub fn filetypes(&self) -> impl Iterator<Item = &str> {
        self.detectors.iter().map(|d| d.filetype.as_str())
    }
}
