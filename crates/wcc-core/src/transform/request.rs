use crate::ast::Declaration;
use crate::error::{Error, Result};
use crate::matcher::{parse_clude, DeclarationFilter, Pattern};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

const FROM: &str = "$from";
const INCLUDE: &str = "$include";
const EXCLUDE: &str = "$exclude";

/// A parsed `*.wcc.yaml` file.
#[derive(Debug, Clone)]
pub struct TransformationSpec {
    pub path: PathBuf,
    /// Upstream stylesheet whose tokens are transformed, by file name.
    pub import: String,
    /// The component module the stylesheets are generated for.
    pub output: Option<String>,
    /// The component's base class selector, e.g. `.pf-v5-c-button`.
    pub base: String,
    /// Output selector -> request, in file order.
    pub host: IndexMap<String, TransformationRequest>,
}

#[derive(Debug, Deserialize)]
struct RawSpec {
    import: String,
    #[serde(default)]
    output: Option<String>,
    base: String,
    #[serde(default)]
    host: IndexMap<String, Value>,
}

impl TransformationSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&src, path)
    }

    pub fn from_yaml(src: &str, path: &Path) -> Result<Self> {
        let raw: RawSpec = serde_yaml::from_str(src).map_err(|source| Error::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut host = IndexMap::with_capacity(raw.host.len());
        for (selector, value) in raw.host {
            let request = TransformationRequest::from_value(&value).map_err(|reason| {
                Error::InvalidTransformation {
                    file: path.to_path_buf(),
                    selector: selector.clone(),
                    reason,
                }
            })?;
            host.insert(selector, request);
        }

        Ok(Self {
            path: path.to_path_buf(),
            import: raw.import,
            output: raw.output,
            base: raw.base,
            host,
        })
    }

    /// File name of the imported stylesheet, the key tokens are stored under.
    pub fn import_name(&self) -> &str {
        Path::new(&self.import)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.import)
    }
}

/// Which clean rules a request draws its declarations from.
#[derive(Debug, Clone)]
pub enum SelectorSource {
    Exact(String),
    /// Anchored at both ends.
    Pattern(Regex),
}

impl SelectorSource {
    /// `/body/` is a regex, anything else an exact selector.
    pub fn parse(source: &str) -> std::result::Result<Self, String> {
        let trimmed = source.trim();
        match trimmed
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(body) if !body.is_empty() => Regex::new(&format!("^(?:{})$", body))
                .map(Self::Pattern)
                .map_err(|e| format!("invalid $from pattern: {}", e)),
            _ => Ok(Self::Exact(trimmed.to_string())),
        }
    }

    pub fn is_match(&self, selector: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == selector,
            Self::Pattern(regex) => regex.is_match(selector),
        }
    }

    /// Capture groups of a match, index 0 being the whole selector.
    pub fn captures(&self, selector: &str) -> Option<Vec<Option<String>>> {
        match self {
            Self::Exact(expected) if expected == selector => Some(vec![Some(selector.to_string())]),
            Self::Exact(_) => None,
            Self::Pattern(regex) => regex.captures(selector).map(|caps| {
                caps.iter()
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect()
            }),
        }
    }
}

/// One entry under `host`.
#[derive(Debug, Clone, Default)]
pub struct TransformationRequest {
    pub from: Option<SelectorSource>,
    pub include: Option<Vec<Pattern>>,
    pub exclude: Option<Vec<Pattern>>,
    /// Literal property/value pairs, in file order.
    pub declarations: Vec<Declaration>,
}

impl TransformationRequest {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => return Err(format!("expected a mapping, found {}", describe(other))),
        };

        let mut request = Self::default();
        for (key, value) in mapping {
            let key = scalar(key).ok_or_else(|| "keys must be scalars".to_string())?;
            match key.as_str() {
                FROM => {
                    let source = scalar(value).ok_or_else(|| "$from must be a string".to_string())?;
                    request.from = Some(SelectorSource::parse(&source)?);
                }
                INCLUDE => request.include = Some(clude_list(value, INCLUDE)?),
                EXCLUDE => request.exclude = Some(clude_list(value, EXCLUDE)?),
                directive if directive.starts_with('$') => {
                    return Err(format!("unknown directive '{}'", directive));
                }
                property => {
                    let value = scalar(value).ok_or_else(|| {
                        format!("value of '{}' must be a string or number", property)
                    })?;
                    request.declarations.push(Declaration::new(property, value));
                }
            }
        }
        Ok(request)
    }

    pub fn filter(&self) -> DeclarationFilter {
        DeclarationFilter::new(self.include.as_deref(), self.exclude.as_deref())
    }
}

fn clude_list(value: &Value, directive: &str) -> std::result::Result<Vec<Pattern>, String> {
    let entries: Vec<String> = match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| scalar(item).ok_or_else(|| format!("{} entries must be strings", directive)))
            .collect::<std::result::Result<_, _>>()?,
        other => vec![scalar(other).ok_or_else(|| format!("{} must be a string", directive))?],
    };

    let mut patterns = Vec::new();
    for entry in entries {
        patterns.extend(parse_clude(&entry).map_err(|e| e.to_string())?);
    }
    Ok(patterns)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
