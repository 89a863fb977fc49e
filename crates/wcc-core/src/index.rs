//! Selector-keyed lookup for component-local custom properties.
//!
//! A custom property like `--pf-v5-c-button--Color` is usually declared on
//! several selectors (the block, its modifiers, its states). When a value
//! declared under one selector refers to it, the definition that applies is
//! picked by [`SelectorIndex::best_match`], ranked:
//!
//! 1. [`MatchRank::Exact`]: the property is declared on the query selector itself.
//! 2. [`MatchRank::Singleton`]: the property is declared on exactly one selector.
//! 3. [`MatchRank::Ancestor`]: the longest declared selector that, once
//!    sanitized, occurs inside the query selector.

use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRank {
    Exact,
    Singleton,
    Ancestor { len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorMatch<'a> {
    pub selector: &'a str,
    pub value: &'a str,
    pub rank: MatchRank,
}

#[derive(Debug, Clone, Default)]
pub struct SelectorIndex {
    entries: IndexMap<String, String>,
}

impl SelectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `selector`. The first definition wins; later ones
    /// come from lower-priority files. Returns whether the entry was new.
    pub fn insert(&mut self, selector: impl Into<String>, value: impl Into<String>) -> bool {
        let selector = selector.into();
        if self.entries.contains_key(&selector) {
            return false;
        }
        self.entries.insert(selector, value.into());
        true
    }

    pub fn get(&self, selector: &str) -> Option<&str> {
        self.entries.get(selector).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_match(&self, query: &str) -> Option<SelectorMatch<'_>> {
        if let Some((selector, value)) = self.entries.get_key_value(query) {
            return Some(SelectorMatch {
                selector,
                value,
                rank: MatchRank::Exact,
            });
        }

        if self.entries.len() == 1 {
            let (selector, value) = self.entries.first()?;
            return Some(SelectorMatch {
                selector,
                value,
                rank: MatchRank::Singleton,
            });
        }

        let mut best: Option<SelectorMatch<'_>> = None;
        for (selector, value) in &self.entries {
            let candidate = sanitize_selector(selector);
            if candidate.is_empty() || !query.contains(candidate.as_str()) {
                continue;
            }
            let len = candidate.len();
            let better = match best {
                Some(SelectorMatch {
                    rank: MatchRank::Ancestor { len: best_len },
                    ..
                }) => len > best_len,
                _ => true,
            };
            if better {
                best = Some(SelectorMatch {
                    selector,
                    value,
                    rank: MatchRank::Ancestor { len },
                });
            }
        }
        best
    }
}

/// Drop attribute selectors and trailing combinator noise (`*`, `>`) so a
/// declared selector can be compared against a query by containment.
pub fn sanitize_selector(selector: &str) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut depth = 0usize;
    for ch in selector.chars() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.trim_end_matches(|c: char| c == '*' || c == '>' || c.is_whitespace())
        .trim_start()
        .to_string()
}
