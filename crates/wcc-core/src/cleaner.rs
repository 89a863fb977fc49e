use crate::ast::Declaration;
use crate::tokens::TokenRules;
use regex::Regex;
use std::sync::OnceLock;

/// Selector given to the rule whose selector is exactly the component's base class.
pub const BASE_SENTINEL: &str = "$base";
/// Vendor plus component-layer prefix, redundant inside a component's own scope.
pub const COMPONENT_PREFIX: &str = "--pf-v5-c-";

/// A token rule with the component class and vendor prefixes stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRule {
    /// [`BASE_SENTINEL`] or what is left after removing the base class.
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

fn bare_property() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^--[\w-]+$").expect("bare property pattern is valid"))
}

pub fn clean_rules(rules: &TokenRules, base: &str) -> Vec<CleanRule> {
    rules
        .iter()
        .map(|(selector, tokens)| CleanRule {
            selector: clean_selector(selector, base),
            declarations: tokens
                .values()
                .map(|token| {
                    Declaration::new(
                        strip_component_prefix(&token.property),
                        rebox(&strip_component_prefix(token.declared())),
                    )
                })
                .collect(),
        })
        .collect()
}

pub fn clean_selector(selector: &str, base: &str) -> String {
    if selector == base {
        BASE_SENTINEL.to_string()
    } else {
        selector.strip_prefix(base).unwrap_or(selector).to_string()
    }
}

/// `--pf-v5-c-button--Color` becomes `--button--Color`, wherever it occurs.
pub fn strip_component_prefix(text: &str) -> String {
    text.replace(COMPONENT_PREFIX, "--")
}

/// A bare custom-property name is turned back into a `var()` reference.
pub fn rebox(value: &str) -> String {
    if bare_property().is_match(value) {
        format!("var({})", value)
    } else {
        value.to_string()
    }
}
