use crate::error::{Error, Result};
use regex::Regex;

/// One include/exclude entry: a property name or a `/regex/`.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Parse a clude string: comma-separated names, `--custom-properties` or
/// `/regex/` literals. Commas inside a regex literal do not split it.
pub fn parse_clude(src: &str) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    let mut rest = src.trim_start();

    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('/') {
            let end = closing_slash(body).ok_or_else(|| Error::InvalidClude {
                input: src.to_string(),
                reason: "unterminated regex literal".to_string(),
            })?;
            let source = &body[..end];
            let regex = Regex::new(source).map_err(|e| Error::invalid_pattern(source, e))?;
            patterns.push(Pattern::Regex(regex));
            rest = body[end + 1..].trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
            continue;
        }

        let (entry, tail) = rest.split_once(',').unwrap_or((rest, ""));
        let entry = entry.trim();
        if !entry.is_empty() {
            patterns.push(Pattern::Literal(entry.to_string()));
        }
        rest = tail.trim_start();
    }

    Ok(patterns)
}

fn closing_slash(body: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in body.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            '/' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

/// Predicate over property names built from a pattern list.
#[derive(Debug, Clone, Default)]
pub struct PropertyMatcher {
    literals: Vec<String>,
    regexes: Vec<Regex>,
}

impl PropertyMatcher {
    pub fn new(patterns: &[Pattern]) -> Self {
        let mut matcher = Self::default();
        for pattern in patterns {
            match pattern {
                Pattern::Literal(name) => matcher.literals.push(name.clone()),
                Pattern::Regex(regex) => matcher.regexes.push(regex.clone()),
            }
        }
        matcher
    }

    /// True if the trimmed candidate equals a literal or matches any regex.
    pub fn is_match(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        self.literals.iter().any(|l| l == candidate)
            || self.regexes.iter().any(|r| r.is_match(candidate))
    }
}

#[derive(Debug, Clone, Default)]
pub enum DeclarationFilter {
    Include(PropertyMatcher),
    Exclude(PropertyMatcher),
    #[default]
    All,
}

impl DeclarationFilter {
    /// An include list wins outright; the exclude list is then ignored.
    pub fn new(include: Option<&[Pattern]>, exclude: Option<&[Pattern]>) -> Self {
        match (include, exclude) {
            (Some(include), _) => Self::Include(PropertyMatcher::new(include)),
            (None, Some(exclude)) => Self::Exclude(PropertyMatcher::new(exclude)),
            (None, None) => Self::All,
        }
    }

    pub fn keeps(&self, property: &str) -> bool {
        match self {
            Self::Include(matcher) => matcher.is_match(property),
            Self::Exclude(matcher) => !matcher.is_match(property),
            Self::All => true,
        }
    }

    pub fn apply<T, F>(&self, items: impl IntoIterator<Item = T>, property: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        items
            .into_iter()
            .filter(|item| self.keeps(property(item)))
            .collect()
    }
}
