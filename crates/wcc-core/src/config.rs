use crate::ast::Rule;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the upstream design-system sources live, relative to `package_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    pub package_dir: PathBuf,
    /// Component and layout stylesheets scanned for tokens.
    pub component_globs: Vec<String>,
    /// Named stylesheets scanned in addition to the globbed ones.
    pub extra_files: Vec<String>,
    /// Stylesheet defining the global custom properties.
    pub globals_css: String,
    /// SCSS file bridging global custom properties to SCSS variables.
    pub scss_bridge: String,
    pub scss_variables: String,
    pub scss_colors: String,
    /// Class fragment marking rules that only apply to the dark theme.
    pub dark_theme_marker: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            package_dir: PathBuf::from("node_modules/@patternfly/patternfly"),
            component_globs: vec!["components/**/*.css".into(), "layouts/**/*.css".into()],
            extra_files: vec!["patternfly-base.css".into(), "patternfly-charts.css".into()],
            globals_css: "patternfly-base.css".into(),
            scss_bridge: "base/patternfly-variables.scss".into(),
            scss_variables: "sass-utilities/_scss-variables.scss".into(),
            scss_colors: "sass-utilities/_colors.scss".into(),
            dark_theme_marker: "pf-v5-theme-dark".into(),
        }
    }
}

impl SourceLayout {
    /// Load a layout from YAML. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_yaml::from_str(&data).map_err(|source| Error::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = dir.into();
        self
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.package_dir.join(relative)
    }

    pub fn is_dark_theme_selector(&self, selector: &str) -> bool {
        !self.dark_theme_marker.is_empty() && selector.contains(&self.dark_theme_marker)
    }

    /// A rule belongs to the dark theme only when every one of its selectors does.
    pub fn is_dark_theme_rule(&self, rule: &Rule) -> bool {
        !rule.selectors.is_empty()
            && rule.selectors.iter().all(|s| self.is_dark_theme_selector(s))
    }
}
