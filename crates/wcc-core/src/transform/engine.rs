use super::request::{SelectorSource, TransformationRequest, TransformationSpec};
use super::rules::RuleSet;
use super::template::SelectorTemplate;
use crate::ast::{Declaration, Rule};
use crate::cleaner::{clean_rules, rebox, strip_component_prefix, CleanRule};
use crate::error::{Error, Result};
use crate::parser::split_selector_terms;
use crate::tokens::{TokenComponents, TokenRules};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The two rule sets generated for one component.
#[derive(Debug, Clone, Default)]
pub struct ComponentStylesheets {
    /// Rules for the component's shadow root.
    pub host: RuleSet,
    /// Custom properties for the document's `:root`.
    pub root: RuleSet,
}

/// Paths written for one transformation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltStylesheet {
    pub spec: PathBuf,
    pub host: PathBuf,
    pub root: PathBuf,
}

/// Outcome of a batch: every file is attempted, failures don't stop the rest.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub built: Vec<BuiltStylesheet>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn build_stylesheets(paths: &[PathBuf], tokens: &TokenComponents) -> BuildReport {
    let mut report = BuildReport::default();
    for path in paths {
        match build_stylesheet(path, tokens) {
            Ok(built) => report.built.push(built),
            Err(err) => {
                tracing::error!("{}", err);
                report.failed.push((path.clone(), err));
            }
        }
    }
    report
}

/// Transform one spec file and write `X.css` and `X.root.css` beside it.
pub fn build_stylesheet(path: &Path, tokens: &TokenComponents) -> Result<BuiltStylesheet> {
    let spec = TransformationSpec::load(path)?;
    let sheets = transform(&spec, tokens)?;
    let (host_path, root_path) = output_paths(path);

    fs::write(&host_path, sheets.host.to_css()).map_err(|e| Error::io(&host_path, e))?;
    fs::write(&root_path, sheets.root.to_css()).map_err(|e| Error::io(&root_path, e))?;

    tracing::info!(
        "{} -> {} ({} host rules)",
        spec.output.as_deref().unwrap_or(&spec.import),
        host_path.display(),
        sheets.host.len()
    );
    Ok(BuiltStylesheet {
        spec: path.to_path_buf(),
        host: host_path,
        root: root_path,
    })
}

/// `button.wcc.yaml` -> (`button.css`, `button.root.css`)
pub fn output_paths(spec: &Path) -> (PathBuf, PathBuf) {
    let name = spec
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = [".wcc.yaml", ".wcc.yml", ".yaml", ".yml"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(&name);
    (
        spec.with_file_name(format!("{}.css", stem)),
        spec.with_file_name(format!("{}.root.css", stem)),
    )
}

pub fn transform(spec: &TransformationSpec, tokens: &TokenComponents) -> Result<ComponentStylesheets> {
    let rules = tokens
        .get(spec.import_name())
        .ok_or_else(|| Error::MissingImport {
            file: spec.path.clone(),
            import: spec.import.clone(),
        })?;

    let mut sheets = ComponentStylesheets::default();
    add_custom_properties(&mut sheets, rules, &spec.base);

    let clean = clean_rules(rules, &spec.base);
    for (selector, request) in &spec.host {
        let template = SelectorTemplate::parse(selector);
        match &request.from {
            None => add_literal(&mut sheets.host, spec, selector, &template, request)?,
            Some(from) => match &template {
                SelectorTemplate::Literal(_) => {
                    add_merged(&mut sheets.host, spec, selector, from, request, &clean)
                }
                SelectorTemplate::Parameterized(_) => {
                    check_captures(spec, selector, &template, from)?;
                    add_fanned_out(&mut sheets.host, spec, selector, &template, from, request, &clean)
                }
            },
        }
    }

    Ok(sheets)
}

/// Custom property prefix owned by a component, e.g. `--pf-v5-c-button`.
pub fn custom_property_prefix(base: &str) -> String {
    format!("--{}", base.trim_start_matches('.'))
}

fn owns_property(prefix: &str, property: &str) -> bool {
    match property.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with("--") || rest.starts_with("__"),
        None => false,
    }
}

/// `:host` gets short names falling back to the literal; `:root` gets the
/// long names pointing at what upstream declared. The first definition of a
/// property, in source order, is the one exported.
fn add_custom_properties(sheets: &mut ComponentStylesheets, rules: &TokenRules, base: &str) {
    let prefix = custom_property_prefix(base);
    let mut seen = HashSet::new();
    let mut host = Vec::new();
    let mut root = Vec::new();

    for token in rules.values().flat_map(|decls| decls.values()) {
        if !owns_property(&prefix, &token.property) || !seen.insert(token.property.as_str()) {
            continue;
        }
        host.push(Declaration::new(
            strip_component_prefix(&token.property),
            format!("var({}, {})", token.property, token.value),
        ));
        let root_value = match token.values.first() {
            Some(first) => rebox(first),
            None => token.value.clone(),
        };
        root.push(Declaration::new(token.property.as_str(), root_value));
    }

    if !host.is_empty() {
        sheets.host.add_declarations(":host", host);
    }
    if !root.is_empty() {
        sheets.root.add_declarations(":root", root);
    }
}

fn invalid(spec: &TransformationSpec, selector: &str, reason: &str) -> Error {
    Error::InvalidTransformation {
        file: spec.path.clone(),
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

/// Every placeholder must name a group the `$from` regex actually has.
fn check_captures(
    spec: &TransformationSpec,
    selector: &str,
    template: &SelectorTemplate,
    from: &SelectorSource,
) -> Result<()> {
    let Some(highest) = template.max_capture() else {
        return Ok(());
    };
    match from {
        SelectorSource::Exact(_) => Err(invalid(
            spec,
            selector,
            "capture placeholders require a /regex/ $from",
        )),
        SelectorSource::Pattern(regex) if highest >= regex.captures_len() => Err(invalid(
            spec,
            selector,
            &format!("placeholder \\{} has no matching group in $from", highest),
        )),
        SelectorSource::Pattern(_) => Ok(()),
    }
}

fn add_literal(
    host: &mut RuleSet,
    spec: &TransformationSpec,
    selector: &str,
    template: &SelectorTemplate,
    request: &TransformationRequest,
) -> Result<()> {
    if template.is_parameterized() {
        return Err(invalid(spec, selector, "capture placeholders require $from"));
    }
    if request.include.is_some() || request.exclude.is_some() {
        return Err(invalid(spec, selector, "$include/$exclude require $from"));
    }
    if !request.declarations.is_empty() {
        host.add_declarations(selector, request.declarations.clone());
    }
    Ok(())
}

fn filtered(rule: &CleanRule, request: &TransformationRequest) -> Vec<Declaration> {
    let mut declarations = request
        .filter()
        .apply(rule.declarations.iter().cloned(), |d| d.property.as_str());
    declarations.extend(request.declarations.iter().cloned());
    declarations
}

fn add_merged(
    host: &mut RuleSet,
    spec: &TransformationSpec,
    selector: &str,
    from: &SelectorSource,
    request: &TransformationRequest,
    clean: &[CleanRule],
) {
    let matched: Vec<&CleanRule> = clean.iter().filter(|r| from.is_match(&r.selector)).collect();
    if matched.is_empty() {
        warn_unmatched(spec, selector);
    }

    let filter = request.filter();
    let mut declarations = filter.apply(
        matched.iter().flat_map(|r| r.declarations.iter().cloned()),
        |d| d.property.as_str(),
    );
    declarations.extend(request.declarations.iter().cloned());

    if !declarations.is_empty() {
        host.add_declarations(selector, declarations);
    }
}

fn add_fanned_out(
    host: &mut RuleSet,
    spec: &TransformationSpec,
    selector: &str,
    template: &SelectorTemplate,
    from: &SelectorSource,
    request: &TransformationRequest,
    clean: &[CleanRule],
) {
    let mut matches = 0;
    for rule in clean {
        let Some(groups) = from.captures(&rule.selector) else {
            continue;
        };
        matches += 1;
        let declarations = filtered(rule, request);
        if declarations.is_empty() {
            continue;
        }
        host.add(Rule {
            selectors: split_selector_terms(&template.render(&groups)),
            declarations,
        });
    }
    if matches == 0 {
        warn_unmatched(spec, selector);
    }
}

fn warn_unmatched(spec: &TransformationSpec, selector: &str) {
    tracing::warn!(
        "{}: '{}' matched no rules in {}",
        spec.path.display(),
        selector,
        spec.import_name()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Token, TokenDeclarations};
    use pretty_assertions::assert_eq;

    fn tokens(entries: &[(&str, Vec<Token>)]) -> TokenComponents {
        let rules: TokenRules = entries
            .iter()
            .map(|(selector, tokens)| {
                let decls: TokenDeclarations = tokens
                    .iter()
                    .map(|t| (t.property.clone(), t.clone()))
                    .collect();
                (selector.to_string(), decls)
            })
            .collect();
        let mut components = TokenComponents::new();
        components.insert("button.css".to_string(), rules);
        components
    }

    fn chained(property: &str, values: &[&str]) -> Token {
        Token {
            property: property.into(),
            value: values.last().unwrap().to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn spec(host: &str) -> TransformationSpec {
        let src = format!("import: button.css\nbase: .pf-v5-c-button\nhost:\n{}", host);
        TransformationSpec::from_yaml(&src, Path::new("pf-button.wcc.yaml")).unwrap()
    }

    fn button_tokens() -> TokenComponents {
        tokens(&[
            (
                ".pf-v5-c-button",
                vec![
                    chained(
                        "--pf-v5-c-button--Color",
                        &["--pf-v5-global--Color--100", "#151515"],
                    ),
                    Token::literal("--pf-v5-c-button--PaddingTop", "6px"),
                    Token::literal("color", "var(--pf-v5-c-button--Color)"),
                    Token::literal("padding-top", "var(--pf-v5-c-button--PaddingTop)"),
                ],
            ),
            (
                ".pf-v5-c-button.pf-m-danger.pf-m-primary:hover",
                vec![
                    Token::literal("--pf-v5-c-button--Color", "red"),
                    Token::literal("background", "darkred"),
                ],
            ),
            (
                ".pf-v5-c-button.pf-m-warning.pf-m-secondary:focus",
                vec![Token::literal("--pf-v5-c-button--Color", "orange")],
            ),
            (
                ".pf-v5-c-button.pf-m-plain",
                vec![Token::literal("color", "gray")],
            ),
        ])
    }

    #[test]
    fn derives_host_and_root_custom_properties() {
        let sheets = transform(&spec("  '#x':\n    color: red\n"), &button_tokens()).unwrap();

        let host = sheets.host.get(":host").unwrap();
        assert_eq!(
            host.declarations,
            vec![
                Declaration::new("--button--Color", "var(--pf-v5-c-button--Color, #151515)"),
                Declaration::new("--button--PaddingTop", "var(--pf-v5-c-button--PaddingTop, 6px)"),
            ]
        );

        let root = sheets.root.get(":root").unwrap();
        assert_eq!(
            root.declarations,
            vec![
                Declaration::new("--pf-v5-c-button--Color", "var(--pf-v5-global--Color--100)"),
                Declaration::new("--pf-v5-c-button--PaddingTop", "6px"),
            ]
        );
    }

    #[test]
    fn fans_out_over_capture_groups() {
        let spec = spec(
            "  ':host([sev=\"\\1\"][variant=\"\\2\"]:\\3)':\n    $from: /\\.pf-m-(danger|warning)\\.pf-m-(primary|secondary):(hover|focus)/\n",
        );
        let sheets = transform(&spec, &button_tokens()).unwrap();
        let rules = sheets.host.rules();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].first_selector(), ":host([sev=\"danger\"][variant=\"primary\"]:hover)");
        assert_eq!(
            rules[1].declarations,
            vec![
                Declaration::new("--button--Color", "red"),
                Declaration::new("background", "darkred"),
            ]
        );
        assert_eq!(rules[2].first_selector(), ":host([sev=\"warning\"][variant=\"secondary\"]:focus)");
        assert_eq!(rules[2].declarations, vec![Declaration::new("--button--Color", "orange")]);
    }

    #[test]
    fn merges_matches_under_one_selector() {
        let spec = spec(
            "  '#container':\n    $from: /\\$base|\\.pf-m-plain/\n    $include: color\n    cursor: pointer\n  '#container ':\n    $from: $base\n    $exclude: /^--/\n",
        );
        let sheets = transform(&spec, &button_tokens()).unwrap();
        let container = sheets.host.get("#container").unwrap();
        assert_eq!(
            container.declarations,
            vec![
                Declaration::new("color", "var(--button--Color)"),
                Declaration::new("color", "gray"),
                Declaration::new("cursor", "pointer"),
                Declaration::new("color", "var(--button--Color)"),
                Declaration::new("padding-top", "var(--button--PaddingTop)"),
            ]
        );
    }

    #[test]
    fn literal_requests_are_copied() {
        let sheets = transform(&spec("  '#icon, #text':\n    display: none\n"), &button_tokens()).unwrap();
        let rule = sheets.host.get("#icon").unwrap();
        assert_eq!(rule.selectors, vec!["#icon", "#text"]);
        assert_eq!(rule.declarations, vec![Declaration::new("display", "none")]);
    }

    #[test]
    fn placeholders_without_from_are_fatal() {
        let err = transform(&spec("  'selector\\1':\n    color: red\n"), &button_tokens()).unwrap_err();
        assert!(matches!(err, Error::InvalidTransformation { .. }));
    }

    #[test]
    fn include_without_from_is_fatal() {
        let err = transform(&spec("  ':host':\n    $include: color\n"), &button_tokens()).unwrap_err();
        assert!(err.to_string().contains("$include/$exclude require $from"));
    }

    #[test]
    fn exclude_without_from_is_fatal() {
        let err = transform(&spec("  '#icon':\n    $exclude: /^--/\n    display: none\n"), &button_tokens())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransformation { .. }));
        assert!(err.to_string().contains("$include/$exclude require $from"));
    }

    #[test]
    fn placeholders_with_exact_from_are_fatal() {
        let err = transform(&spec("  '\\1':\n    $from: $base\n"), &button_tokens()).unwrap_err();
        assert!(err.to_string().contains("require a /regex/ $from"));
    }

    #[test]
    fn placeholders_beyond_the_regex_groups_are_fatal() {
        let spec = spec("  ':host(\\2)':\n    $from: /\\.pf-m-(plain)/\n");
        let err = transform(&spec, &button_tokens()).unwrap_err();
        assert!(err.to_string().contains("placeholder \\2 has no matching group"));
    }

    #[test]
    fn unknown_import_is_reported() {
        let spec = TransformationSpec::from_yaml(
            "import: card.css\nbase: .pf-v5-c-card\n",
            Path::new("pf-card.wcc.yaml"),
        )
        .unwrap();
        let err = transform(&spec, &button_tokens()).unwrap_err();
        assert!(matches!(err, Error::MissingImport { .. }));
    }

    #[test]
    fn unmatched_from_emits_nothing() {
        let sheets = transform(&spec("  '#nothing':\n    $from: .pf-m-link\n"), &button_tokens()).unwrap();
        assert!(sheets.host.get("#nothing").is_none());
    }

    #[test]
    fn output_paths_replace_the_suffix() {
        let (host, root) = output_paths(Path::new("elements/pf-button/pf-button.wcc.yaml"));
        assert_eq!(host, PathBuf::from("elements/pf-button/pf-button.css"));
        assert_eq!(root, PathBuf::from("elements/pf-button/pf-button.root.css"));
    }

    #[test]
    fn property_ownership_respects_block_boundaries() {
        let prefix = custom_property_prefix(".pf-v5-c-button");
        assert!(owns_property(&prefix, "--pf-v5-c-button--Color"));
        assert!(owns_property(&prefix, "--pf-v5-c-button__icon--Color"));
        assert!(!owns_property(&prefix, "--pf-v5-c-button-group--Gap"));
        assert!(!owns_property(&prefix, "color"));
    }
}
