use crate::ast::Stylesheet;
use crate::config::SourceLayout;
use crate::error::{Error, Result};
use crate::parser;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const TRANSFORMATION_GLOB: &str = "**/*.wcc.yaml";

/// A parsed upstream stylesheet.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File basename, the key tokens are grouped under.
    pub name: String,
    pub stylesheet: Stylesheet,
}

/// List the upstream stylesheets to scan, shallowest first.
///
/// Deeper paths sort last so that per-selector lookups see component
/// definitions before the generic ones. Path depth is only an approximation
/// of "generic"; there is no explicit list.
pub fn discover_sources(layout: &SourceLayout) -> Result<Vec<PathBuf>> {
    let root = &layout.package_dir;
    let globs = build_globset(&layout.component_globs)?;
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root.as_path()).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if globs.is_match(relative) && seen.insert(relative.to_path_buf()) {
            found.push(relative.to_path_buf());
        }
    }

    for extra in &layout.extra_files {
        let relative = PathBuf::from(extra);
        let absolute = root.join(&relative);
        if !absolute.is_file() {
            return Err(Error::io(
                absolute,
                std::io::Error::new(std::io::ErrorKind::NotFound, "upstream file not found"),
            ));
        }
        if seen.insert(relative.clone()) {
            found.push(relative);
        }
    }

    sort_by_depth(&mut found);
    Ok(found.into_iter().map(|relative| root.join(relative)).collect())
}

fn sort_by_depth(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });
}

pub fn load_sources(layout: &SourceLayout) -> Result<Vec<SourceFile>> {
    discover_sources(layout)?
        .into_iter()
        .map(|path| read_source(&path))
        .collect()
}

pub fn read_source(path: &Path) -> Result<SourceFile> {
    tracing::debug!("parsing {}", path.display());
    let stylesheet = parser::parse_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SourceFile {
        path: path.to_path_buf(),
        name,
        stylesheet,
    })
}

/// Find every transformation spec under `root`, skipping dependency,
/// build and hidden directories.
pub fn discover_transformations(root: &Path) -> Result<Vec<PathBuf>> {
    let globs = build_globset(&[TRANSFORMATION_GLOB.to_string()])?;
    let mut found = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io(path, e.into())
        })?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if entry.file_type().is_file() && globs.is_match(relative) {
            found.push(entry.path().to_path_buf());
        }
    }

    found.sort();
    Ok(found)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir()
        && (name.starts_with('.') || name == "node_modules" || name == "target")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| Error::InvalidGlob {
            pattern: pattern.clone(),
            message: err.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| Error::InvalidGlob {
        pattern: patterns.join(", "),
        message: err.to_string(),
    })
}
