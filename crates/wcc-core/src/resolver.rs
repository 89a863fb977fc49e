//! Walks custom-property and SCSS-variable references back to literal values.
//!
//! The upstream theme is defined twice: SCSS variables are the source of
//! truth and a layer of global custom properties is bridged from them.
//! A declaration may reach a literal through either layer, so two tracks are
//! advanced side by side:
//!
//! - the *CSS track* replaces `var(--pf-...)` references using the global
//!   and component-local custom-property tables, ending in the value a
//!   browser would compute;
//! - the *SCSS track* follows the same references but jumps to the SCSS
//!   variable behind each bridged global, then substitutes `$pf-...`
//!   variables until a literal remains.
//!
//! Every value the SCSS track passes through is recorded, giving the
//! provenance chain stored on each token.

use crate::theme::Theme;
use regex::{Captures, Regex};
use std::sync::OnceLock;

pub const VENDOR_PREFIX: &str = "--pf-v5-";
pub const GLOBAL_PREFIX: &str = "--pf-v5-global";

/// Upper bound on resolution rounds, for cyclic upstream graphs.
const MAX_STEPS: usize = 64;

fn css_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"var\(\s*(--pf-[\w-]+)\s*(?:,[^()]*(?:\([^()]*\)[^()]*)*)?\)")
            .expect("css reference pattern is valid")
    })
}

fn scss_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$pf-[\w-]+").expect("scss reference pattern is valid"))
}

fn boxed_property() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^var\(\s*(--[\w-]+)\s*\)$").expect("boxed pattern is valid"))
}

pub fn has_css_reference(value: &str) -> bool {
    css_reference().is_match(value)
}

pub fn has_scss_reference(value: &str) -> bool {
    scss_reference().is_match(value)
}

fn has_reference(value: &str) -> bool {
    has_css_reference(value) || has_scss_reference(value)
}

/// `var(--x)` becomes `--x`; anything else is returned unchanged.
pub fn unbox(value: &str) -> String {
    match boxed_property().captures(value) {
        Some(caps) => caps[1].to_string(),
        None => value.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VarResolver<'t> {
    theme: &'t Theme,
}

impl<'t> VarResolver<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self { theme }
    }

    /// Resolve `value`, declared under `selector`, to its provenance chain.
    ///
    /// The first element is `value` itself and the last is the most literal
    /// form reached. A value without references yields a one-element chain.
    /// Unresolvable references are logged and leave the chain stalled at the
    /// last value that could be computed.
    pub fn chain(&self, value: &str, selector: &str) -> Vec<String> {
        let mut chain = vec![value.to_string()];
        let mut computed = value.to_string();
        let mut resolved = value.to_string();
        let mut steps = 0;

        while has_css_reference(&resolved) || has_reference(&computed) {
            if steps == MAX_STEPS {
                tracing::error!(
                    "gave up resolving '{}' under {} after {} steps",
                    value,
                    selector,
                    MAX_STEPS
                );
                break;
            }
            steps += 1;

            let next_resolved = if has_css_reference(&resolved) {
                self.resolve_css_layer(&resolved, selector)
            } else {
                resolved.clone()
            };
            let next_computed = self.advance_computed(&computed, selector);

            if next_resolved == resolved && next_computed == computed {
                tracing::error!(
                    "unresolved variable in '{}' (declared as '{}' under {})",
                    computed,
                    value,
                    selector
                );
                break;
            }

            if next_computed != computed {
                chain.push(next_computed.clone());
            }
            resolved = next_resolved;
            computed = next_computed;
        }

        let stalled = chain
            .last()
            .is_some_and(|last| last.contains("pf-") && *last != resolved);
        if stalled {
            chain.push(resolved);
        }

        chain.iter().map(|entry| unbox(entry)).collect()
    }

    /// Replace every `var(--pf-...)` in `value` by its definition, one level deep.
    fn resolve_css_layer(&self, value: &str, selector: &str) -> String {
        css_reference()
            .replace_all(value, |caps: &Captures<'_>| {
                let property = &caps[1];
                match self.lookup_css(property, selector) {
                    Some(found) => found.to_string(),
                    None => {
                        tracing::warn!("no definition of {} reachable from {}", property, selector);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    fn advance_computed(&self, value: &str, selector: &str) -> String {
        if has_css_reference(value) {
            return css_reference()
                .replace_all(value, |caps: &Captures<'_>| {
                    let property = &caps[1];
                    self.theme
                        .scss_for_global(property)
                        .or_else(|| self.lookup_css(property, selector))
                        .map(str::to_string)
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
        }

        scss_reference()
            .replace_all(value, |caps: &Captures<'_>| {
                self.theme
                    .scss(&caps[0])
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn lookup_css(&self, property: &str, selector: &str) -> Option<&'t str> {
        let local = || {
            self.theme.local(property, selector).map(|found| {
                tracing::trace!(
                    "{} under {}: {:?} definition on {}",
                    property,
                    selector,
                    found.rank,
                    found.selector
                );
                found.value
            })
        };
        if property.starts_with(GLOBAL_PREFIX) {
            self.theme.global(property).or_else(local)
        } else {
            local().or_else(|| self.theme.global(property))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SelectorIndex;

    fn theme() -> Theme {
        let mut theme = Theme::default();
        let mut local = |property: &str, entries: &[(&str, &str)]| {
            let mut index = SelectorIndex::new();
            for (selector, value) in entries {
                index.insert(*selector, *value);
            }
            theme.local_vars.insert(property.to_string(), index);
        };
        local(
            "--pf-v5-c-button--Color",
            &[
                (".pf-v5-c-button", "var(--pf-v5-global--Color--100)"),
                (".pf-v5-c-button.pf-m-primary", "var(--pf-v5-c-button--m-primary--Color)"),
            ],
        );
        local(
            "--pf-v5-c-button--m-primary--Color",
            &[(".pf-v5-c-button", "var(--pf-v5-global--Color--light-100)")],
        );
        local("--pf-v5-c-loop--a", &[(".pf-v5-c-loop", "var(--pf-v5-c-loop--b)")]);
        local("--pf-v5-c-loop--b", &[(".pf-v5-c-loop", "var(--pf-v5-c-loop--a)")]);

        for (name, value) in [
            ("--pf-v5-global--Color--100", "#151515"),
            ("--pf-v5-global--Color--light-100", "#fff"),
            ("--pf-v5-global--spacer--sm", "0.5rem"),
            ("--pf-v5-global--unbridged", "3px"),
        ] {
            theme.css_globals.insert(name.into(), value.into());
        }
        for (name, scss) in [
            ("--pf-v5-global--Color--100", "$pf-v5-global--Color--100"),
            ("--pf-v5-global--Color--light-100", "$pf-v5-global--Color--light-100"),
            ("--pf-v5-global--spacer--sm", "$pf-v5-global--spacer--sm"),
            ("--pf-v5-global--unbridged", "$pf-v5-global--missing"),
        ] {
            theme.css_to_scss.insert(name.into(), scss.into());
        }
        for (name, value) in [
            ("$pf-v5-global--Color--100", "$pf-v5-color-black-850"),
            ("$pf-v5-color-black-850", "#151515"),
            ("$pf-v5-global--Color--light-100", "$pf-v5-color-white"),
            ("$pf-v5-color-white", "#fff"),
            ("$pf-v5-global--spacer--sm", "0.5rem"),
        ] {
            theme.scss_vars.insert(name.into(), value.into());
        }
        theme
    }

    #[test]
    fn literal_values_are_a_single_link() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        assert_eq!(resolver.chain("#ffffff", ".anything"), vec!["#ffffff"]);
    }

    #[test]
    fn walks_through_local_global_and_scss_layers() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        let chain = resolver.chain("var(--pf-v5-c-button--Color)", ".pf-v5-c-button");
        assert_eq!(
            chain,
            vec![
                "--pf-v5-c-button--Color",
                "--pf-v5-global--Color--100",
                "$pf-v5-global--Color--100",
                "$pf-v5-color-black-850",
                "#151515",
            ]
        );
    }

    #[test]
    fn selector_picks_the_modifier_definition() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        let chain = resolver.chain(
            "var(--pf-v5-c-button--Color)",
            ".pf-v5-c-button.pf-m-primary",
        );
        assert_eq!(chain.last().map(String::as_str), Some("#fff"));
    }

    #[test]
    fn compound_values_resolve_every_reference() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        let chain = resolver.chain(
            "var(--pf-v5-global--spacer--sm) var(--pf-v5-global--spacer--sm)",
            ".pf-v5-c-card",
        );
        assert_eq!(chain.first().map(String::as_str), Some("var(--pf-v5-global--spacer--sm) var(--pf-v5-global--spacer--sm)"));
        assert_eq!(chain.last().map(String::as_str), Some("0.5rem 0.5rem"));
    }

    #[test]
    fn resolved_chains_end_without_references() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        for (value, selector) in [
            ("var(--pf-v5-c-button--Color)", ".pf-v5-c-button"),
            ("var(--pf-v5-c-button--m-primary--Color)", ".pf-v5-c-button"),
            ("calc(var(--pf-v5-global--spacer--sm) * -1)", ".pf-v5-c-button"),
            ("$pf-v5-color-white", ".x"),
        ] {
            let chain = resolver.chain(value, selector);
            let last = chain.last().unwrap();
            assert!(!last.contains("--pf") && !last.contains("$pf-"), "{value} -> {last}");
        }
    }

    #[test]
    fn stalled_scss_track_keeps_the_css_result() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        let chain = resolver.chain("var(--pf-v5-global--unbridged)", ".x");
        assert_eq!(
            chain,
            vec!["--pf-v5-global--unbridged", "$pf-v5-global--missing", "3px"]
        );
    }

    #[test]
    fn missing_definitions_stall_without_looping() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        let chain = resolver.chain("var(--pf-v5-c-nowhere--Color)", ".pf-v5-c-nowhere");
        assert_eq!(chain, vec!["--pf-v5-c-nowhere--Color"]);
    }

    #[test]
    fn cycles_terminate() {
        let theme = theme();
        let resolver = VarResolver::new(&theme);
        let chain = resolver.chain("var(--pf-v5-c-loop--a)", ".pf-v5-c-loop");
        assert!(chain.len() <= MAX_STEPS + 2);
    }

    #[test]
    fn unbox_only_touches_single_references() {
        assert_eq!(unbox("var(--pf-v5-c-button--Color)"), "--pf-v5-c-button--Color");
        assert_eq!(unbox("var(--a) var(--b)"), "var(--a) var(--b)");
        assert_eq!(unbox("var(--a, 1px)"), "var(--a, 1px)");
    }
}
