use serde::Deserialize;
use serde_yaml::Value;

#[derive(Debug, Clone, Deserialize)]
/// Raw YAML syntax file.
pub struct SyntaxDefinition {
    /// File type name (e.g. `c`), also the name other files `include`.
    pub filetype: String,

    #[serde(default)]
    /// How to recognize files of this type.
    pub detect: Detect,

    #[serde(default)]
    /// Top-level rules, in declaration order.
    pub rules: Vec<RawRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// `detect:` section of a syntax file.
pub struct Detect {
    #[serde(default)]
    /// Regex matched against the file name.
    pub filename: Option<String>,

    #[serde(default)]
    /// Regex matched against the first line of the file.
    pub header: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single entry in a rule list.
///
/// Every entry is a one-key YAML mapping:
///
/// ```yaml
/// - include: "doxygen"
/// - statement: "\\b(if|else)\\b"
/// - constant.string:
///     start: "\""
///     end: "\""
/// ```
pub enum RawRule {
    /// Inline the top-level rules of another file type.
    Include(String),
    /// A leaf pattern painting `regex` matches with `group`.
    Pattern {
        /// Group name.
        group: String,
        /// Regex source.
        regex: String,
    },
    /// A delimited region.
    Region {
        /// Group name.
        group: String,
        /// Delimiters and nested rules.
        region: RegionRule,
    },
}

impl<'de> Deserialize<'de> for RawRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Mapping(map) = value else {
            return Err(serde::de::Error::custom("rules must be YAML mappings"));
        };
        if map.len() != 1 {
            return Err(serde::de::Error::custom(format!(
                "a rule must have exactly one key, found {}",
                map.len()
            )));
        }
        let Some((key, body)) = map.into_iter().next() else {
            return Err(serde::de::Error::custom("empty rule"));
        };
        let Value::String(key) = key else {
            return Err(serde::de::Error::custom("rule keys must be strings"));
        };

        match body {
            Value::String(target) if key == "include" => Ok(Self::Include(target)),
            _ if key == "include" => Err(serde::de::Error::custom(
                "include expects a file type name",
            )),
            Value::String(regex) => Ok(Self::Pattern { group: key, regex }),
            body @ Value::Mapping(_) => {
                let region: RegionRule =
                    serde_yaml::from_value(body).map_err(serde::de::Error::custom)?;
                Ok(Self::Region { group: key, region })
            }
            _ => Err(serde::de::Error::custom(format!(
                "rule '{key}' must be a regex string or a region mapping"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
/// Body of a region rule.
pub struct RegionRule {
    /// Regex that opens the region.
    pub start: String,

    /// Regex that closes the region.
    pub end: String,

    #[serde(default)]
    /// Regex whose matches hide end delimiters (e.g. escapes).
    pub skip: Option<String>,

    #[serde(default)]
    /// Group used for the delimiters; defaults to the region group.
    pub limit_group: Option<String>,

    #[serde(default)]
    /// Rules active inside the region.
    pub rules: Vec<RawRule>,
}
