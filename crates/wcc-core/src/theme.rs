use crate::ast::Stylesheet;
use crate::config::SourceLayout;
use crate::error::{Error, Result};
use crate::index::{SelectorIndex, SelectorMatch};
use crate::loader::SourceFile;
use crate::parser;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// The upstream theme as four lookup tables, built once per run and shared
/// read-only by every resolution.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// custom property -> selector -> value declared there
    pub local_vars: HashMap<String, SelectorIndex>,
    /// global custom property -> value
    pub css_globals: HashMap<String, String>,
    /// global custom property -> `$scss-variable` it is bridged from
    pub css_to_scss: HashMap<String, String>,
    /// `$scss-variable` -> value (general variables and the color palette)
    pub scss_vars: HashMap<String, String>,
}

impl Theme {
    /// Build every table from the upstream package. A missing file is an
    /// error here rather than a silent hole in later lookups.
    pub fn load(layout: &SourceLayout, sources: &[SourceFile]) -> Result<Self> {
        let globals_path = layout.resolve(&layout.globals_css);
        let globals = parser::parse_file(&globals_path)?;

        let bridge = read(&layout.resolve(&layout.scss_bridge))?;
        let mut scss_vars = parse_scss_variables(&read(&layout.resolve(&layout.scss_variables))?);
        for (name, value) in parse_scss_variables(&read(&layout.resolve(&layout.scss_colors))?) {
            scss_vars.entry(name).or_insert(value);
        }

        let theme = Self {
            local_vars: collect_local_vars(sources, layout),
            css_globals: collect_css_globals(&globals, layout),
            css_to_scss: parse_scss_bridge(&bridge),
            scss_vars,
        };
        tracing::debug!(
            "theme tables: {} local, {} globals, {} bridged, {} scss",
            theme.local_vars.len(),
            theme.css_globals.len(),
            theme.css_to_scss.len(),
            theme.scss_vars.len()
        );
        Ok(theme)
    }

    pub fn global(&self, property: &str) -> Option<&str> {
        self.css_globals.get(property).map(String::as_str)
    }

    pub fn local(&self, property: &str, selector: &str) -> Option<SelectorMatch<'_>> {
        self.local_vars.get(property)?.best_match(selector)
    }

    pub fn scss_for_global(&self, property: &str) -> Option<&str> {
        self.css_to_scss.get(property).map(String::as_str)
    }

    pub fn scss(&self, variable: &str) -> Option<&str> {
        self.scss_vars.get(variable).map(String::as_str)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Index every custom property declaration by the selectors it appears
/// under. Sources come shallowest first; earlier definitions win.
pub fn collect_local_vars(
    sources: &[SourceFile],
    layout: &SourceLayout,
) -> HashMap<String, SelectorIndex> {
    let mut vars: HashMap<String, SelectorIndex> = HashMap::new();
    for source in sources {
        for rule in &source.stylesheet {
            if layout.is_dark_theme_rule(rule) {
                continue;
            }
            for decl in rule.declarations.iter().filter(|d| d.property.starts_with("--")) {
                let index = vars.entry(decl.property.clone()).or_default();
                for selector in &rule.selectors {
                    index.insert(selector.as_str(), decl.value.as_str());
                }
            }
        }
    }
    vars
}

pub fn collect_css_globals(stylesheet: &Stylesheet, layout: &SourceLayout) -> HashMap<String, String> {
    let mut globals = HashMap::new();
    for rule in stylesheet {
        if layout.is_dark_theme_rule(rule) {
            continue;
        }
        for decl in rule.declarations.iter().filter(|d| d.property.starts_with("--")) {
            globals
                .entry(decl.property.clone())
                .or_insert_with(|| decl.value.clone());
        }
    }
    globals
}

fn bridge_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(--pf-[\w-]+)\s*:\s*(?:#\{\s*)?(\$pf-[\w-]+)")
            .expect("bridge pattern is valid")
    })
}

fn scss_variable_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(\$pf-[\w-]+)\s*:\s*([^;]+?)\s*(?:!default\s*)?;")
            .expect("scss variable pattern is valid")
    })
}

/// Extract `--pf-...: #{$pf-...}` pairs.
pub fn parse_scss_bridge(src: &str) -> HashMap<String, String> {
    bridge_pattern()
        .captures_iter(src)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Extract `$pf-...: value;` definitions. The first definition of a name wins.
pub fn parse_scss_variables(src: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for caps in scss_variable_pattern().captures_iter(src) {
        vars.entry(caps[1].to_string())
            .or_insert_with(|| caps[2].to_string());
    }
    vars
}
