use crate::ast::{Declaration, Rule, Stylesheet};
use crate::emitter;
use crate::parser::split_selector_terms;
use std::collections::HashMap;

/// A rule ready for output: concrete selectors and final declarations.
pub type HardRule = Rule;

/// Ordered rule accumulator keyed by first selector.
///
/// Adding a rule whose first selector is already present appends its
/// declarations to the existing entry. Nothing is deduplicated; repeated
/// properties are left to the cascade.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<HardRule>,
    positions: HashMap<String, usize>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: HardRule) {
        let Some(key) = rule.selectors.first().cloned() else {
            tracing::warn!(
                "dropping rule without a selector ({} declarations)",
                rule.declarations.len()
            );
            return;
        };
        match self.positions.get(&key) {
            Some(&at) => self.rules[at].declarations.extend(rule.declarations),
            None => {
                self.positions.insert(key, self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    /// Add declarations under a selector list as written in a spec file.
    pub fn add_declarations(&mut self, selector: &str, declarations: Vec<Declaration>) {
        self.add(Rule {
            selectors: split_selector_terms(selector),
            declarations,
        });
    }

    pub fn get(&self, selector: &str) -> Option<&HardRule> {
        self.positions.get(selector).map(|&at| &self.rules[at])
    }

    pub fn rules(&self) -> &[HardRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_css(&self) -> String {
        emitter::emit_css(&self.to_stylesheet())
    }

    pub fn to_stylesheet(&self) -> Stylesheet {
        Stylesheet {
            rules: self.rules.clone(),
        }
    }
}

impl From<RuleSet> for Stylesheet {
    fn from(set: RuleSet) -> Self {
        Stylesheet { rules: set.rules }
    }
}
