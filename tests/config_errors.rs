// tests/config_errors.rs

use std::fs;
use std::path::Path;

use sitepipe::config::{load_and_validate, load_from_path, load_or_default};
use sitepipe::errors::SitepipeError;
use tempfile::TempDir;

fn write_config(dir: &TempDir, toml: &str) -> std::path::PathBuf {
    let path = dir.path().join("Sitepipe.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn config_error(toml: &str) -> String {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, toml);
    match load_and_validate(&path) {
        Err(SitepipeError::ConfigError(msg)) => msg,
        Err(other) => panic!("expected a config error, got {other}"),
        Ok(cfg) => panic!("expected a config error, got {cfg:?}"),
    }
}

#[test]
fn full_config_is_anchored_at_its_directory() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[paths]
src = "web"
dist = "out"
html_pages = ["*.html"]

[capabilities]
css_postprocess = "npx postcss --config {design_tokens}"

[watch]
use_hash = true
exclude = ["web/**/*.tmp"]
"#,
    );

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.root(), dir.path());
    assert_eq!(cfg.dist_dir(), dir.path().join("out"));
    assert_eq!(cfg.package_path(), dir.path().join("package.json"));
    assert_eq!(cfg.paths().src, "web");
    assert_eq!(cfg.paths().public, "public");
    assert_eq!(
        cfg.capabilities().css_postprocess.as_deref(),
        Some("npx postcss --config {design_tokens}")
    );
    assert!(cfg.capabilities().js_transpile.is_none());
    assert!(cfg.watch().use_hash);
}

#[test]
fn empty_file_means_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.paths().dist, "dist");
    assert_eq!(cfg.paths().html_pages, ["*.html", "en/**/*.html"]);
    assert!(!cfg.watch().use_hash);
}

#[test]
fn dist_at_project_root_is_rejected() {
    assert!(config_error("[paths]\ndist = \".\"\n").contains("project root"));
}

#[test]
fn dist_containing_sources_is_rejected() {
    let msg = config_error("[paths]\ndist = \"site\"\nsrc = \"site/src\"\n");
    assert!(msg.contains("must not contain [paths].src"), "{msg}");
}

#[test]
fn dist_inside_public_is_rejected() {
    let msg = config_error("[paths]\ndist = \"public/out\"\n");
    assert!(msg.contains("must not live inside [paths].public"), "{msg}");
}

#[test]
fn blank_capability_is_rejected() {
    let msg = config_error("[capabilities]\njs_transpile = \"  \"\n");
    assert!(msg.contains("js_transpile is set but empty"), "{msg}");
}

#[test]
fn broken_exclude_glob_is_rejected() {
    let msg = config_error("[watch]\nexclude = [\"src/[oops\"]\n");
    assert!(msg.contains("[watch].exclude"), "{msg}");
}

#[test]
fn unknown_fields_fail_to_parse() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[paths]\nsource = \"src\"\n");

    assert!(matches!(load_from_path(&path), Err(SitepipeError::TomlError(_))));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(load_or_default(&missing), Err(SitepipeError::IoError(_))));
    assert!(!Path::new(&missing).exists());
}
