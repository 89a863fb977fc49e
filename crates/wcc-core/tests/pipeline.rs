use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use wcc_core::loader::discover_transformations;
use wcc_core::transform::{build_stylesheet, build_stylesheets};
use wcc_core::{Error, SourceLayout, TokenComponents};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn layout() -> SourceLayout {
    SourceLayout::default().with_package_dir(fixtures().join("patternfly"))
}

fn tokens() -> TokenComponents {
    wcc_core::generate(&layout()).unwrap()
}

/// Copy the button spec into a scratch directory so outputs land there.
fn scratch_spec(dir: &Path) -> PathBuf {
    let spec = dir.join("pf-button.wcc.yaml");
    fs::copy(fixtures().join("elements/pf-button/pf-button.wcc.yaml"), &spec).unwrap();
    spec
}

#[test]
fn tokens_cover_every_source_file() {
    let tokens = tokens();
    let mut names: Vec<_> = tokens.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(names, vec!["button.css", "patternfly-base.css", "patternfly-charts.css"]);
}

#[test]
fn chains_pass_through_the_scss_layer() {
    let tokens = tokens();
    let button = &tokens["button.css"];

    let color = &button[".pf-v5-c-button"]["--pf-v5-c-button--Color"];
    assert_eq!(color.value, "#151515");
    assert_eq!(
        color.values,
        vec![
            "--pf-v5-global--Color--100",
            "$pf-v5-global--Color--100",
            "$pf-v5-color-black-850",
            "#151515",
        ]
    );

    let primary = &button[".pf-v5-c-button.pf-m-primary"]["--pf-v5-c-button--Color"];
    assert_eq!(
        primary.values,
        vec![
            "--pf-v5-c-button--m-primary--Color",
            "--pf-v5-global--Color--light-100",
            "$pf-v5-global--Color--light-100",
            "$pf-v5-color-white",
            "#fff",
        ]
    );
}

#[test]
fn dark_theme_and_at_rules_are_left_out() {
    let tokens = tokens();
    let selectors: Vec<_> = tokens["button.css"].keys().map(String::as_str).collect();
    assert_eq!(
        selectors,
        vec![
            ".pf-v5-c-button",
            ".pf-v5-c-button.pf-m-primary",
            ".pf-v5-c-button.pf-m-danger.pf-m-primary:hover",
        ]
    );
    assert_eq!(
        tokens["patternfly-base.css"][":root"]["--pf-v5-global--Color--100"].value,
        "#151515"
    );
}

#[test]
fn builds_host_and_root_stylesheets() {
    let dir = tempfile::tempdir().unwrap();
    let spec = scratch_spec(dir.path());

    let built = build_stylesheet(&spec, &tokens()).unwrap();
    assert_eq!(built.host, dir.path().join("pf-button.css"));
    assert_eq!(built.root, dir.path().join("pf-button.root.css"));

    let host = fs::read_to_string(&built.host).unwrap();
    assert_eq!(
        host,
        r#":host {
  --button--PaddingTop: var(--pf-v5-c-button--PaddingTop, 0.5rem);
  --button--BorderRadius: var(--pf-v5-c-button--BorderRadius, 3px);
  --button--Color: var(--pf-v5-c-button--Color, #151515);
  --button--m-primary--Color: var(--pf-v5-c-button--m-primary--Color, #fff);
  --button--m-danger--BackgroundColor: var(--pf-v5-c-button--m-danger--BackgroundColor, #c9190b);
}

#button {
  padding-top: var(--button--PaddingTop);
  border-radius: var(--button--BorderRadius);
  color: var(--button--Color);
}

:host([variant="primary"]) #button {
  --button--Color: var(--button--m-primary--Color);
}

:host([danger][variant="primary"]:hover) #button {
  background-color: var(--button--m-danger--BackgroundColor);
}

:host([disabled]) #button {
  cursor: not-allowed;
}
"#
    );

    let root = fs::read_to_string(&built.root).unwrap();
    assert_eq!(
        root,
        r#":root {
  --pf-v5-c-button--PaddingTop: var(--pf-v5-global--spacer--sm);
  --pf-v5-c-button--BorderRadius: var(--pf-v5-global--BorderRadius--sm);
  --pf-v5-c-button--Color: var(--pf-v5-global--Color--100);
  --pf-v5-c-button--m-primary--Color: var(--pf-v5-global--Color--light-100);
  --pf-v5-c-button--m-danger--BackgroundColor: var(--pf-v5-global--danger-color--100);
}
"#
    );
}

#[test]
fn batch_keeps_going_after_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    scratch_spec(dir.path());
    let nested = dir.path().join("elements/pf-card");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("pf-card.wcc.yaml"),
        "import: card.css\nbase: .pf-v5-c-card\n",
    )
    .unwrap();
    let ignored = dir.path().join("node_modules/pkg");
    fs::create_dir_all(&ignored).unwrap();
    fs::write(ignored.join("x.wcc.yaml"), "import: [").unwrap();

    let specs = discover_transformations(dir.path()).unwrap();
    assert_eq!(specs.len(), 2);

    let report = build_stylesheets(&specs, &tokens());
    assert!(!report.is_success());
    assert_eq!(report.built.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].1, Error::MissingImport { .. }));
    assert!(dir.path().join("pf-button.css").exists());
}

#[test]
fn missing_scss_sources_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("patternfly");
    fs::create_dir_all(package.join("components")).unwrap();
    fs::write(package.join("patternfly-base.css"), ":root { --pf-v5-global--x: 1px; }").unwrap();
    fs::write(package.join("patternfly-charts.css"), "").unwrap();

    let layout = SourceLayout::default().with_package_dir(&package);
    let err = wcc_core::generate(&layout).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
