// src/package.rs

//! Package metadata (`package.json`): loading, patch bumps and the banner
//! comment stamped onto stylesheet and script outputs.
//!
//! Metadata is never cached. Every task invocation that needs it reads the
//! file again, so a `version` bump earlier in the same pipeline is visible to
//! later tasks.

use std::path::Path;

use chrono::Datelike;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::{Result, SitepipeError};
use crate::fs::FileSystem;

/// The subset of `package.json` the pipeline cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub license: String,
}

/// `author` is either `"Jane Doe <jane@example.com>"` or `{ "name": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Person { name: String },
}

impl Default for Author {
    fn default() -> Self {
        Author::Name(String::new())
    }
}

impl Author {
    pub fn name(&self) -> &str {
        match self {
            Author::Name(name) | Author::Person { name } => name,
        }
    }
}

/// Read and parse package metadata.
pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<PackageMetadata> {
    let text = fs
        .read_to_string(path)
        .map_err(|e| SitepipeError::PackageError(format!("{e:#}")))?;
    let pkg: PackageMetadata = serde_json::from_str(&text)?;
    Ok(pkg)
}

/// Render the banner for `pkg`, stamped with `year`.
///
/// The result ends with a newline so it can be prepended directly.
pub fn banner(pkg: &PackageMetadata, year: i32) -> String {
    [
        "/**".to_string(),
        format!(" * Copyright (c) {year} {}", pkg.author.name()),
        format!(" * {} - {}", pkg.name, pkg.description),
        format!(" * @version v{}", pkg.version),
        format!(" * @link {}", pkg.homepage),
        format!(" * @license {}", pkg.license),
        " */".to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Banner for the current local year.
pub fn banner_now(pkg: &PackageMetadata) -> String {
    banner(pkg, chrono::Local::now().year())
}

/// Increment the patch component of a semantic version.
///
/// A pre-release is promoted to its release (`1.2.3-rc.1` → `1.2.3`), build
/// metadata is dropped, and a leading `v` is preserved.
pub fn bump_patch(version: &str) -> Result<String> {
    let trimmed = version.trim();
    let (prefix, rest) = match trimmed.strip_prefix('v') {
        Some(rest) => ("v", rest),
        None => ("", trimmed),
    };
    let core_and_pre = rest.split('+').next().unwrap_or(rest);
    let (core, pre) = match core_and_pre.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (core_and_pre, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    let numbers: Option<Vec<u64>> = parts.iter().map(|p| p.parse::<u64>().ok()).collect();
    let (major, minor, patch) = match numbers.as_deref() {
        Some([major, minor, patch]) => (*major, *minor, *patch),
        _ => {
            return Err(SitepipeError::PackageError(format!(
                "'{version}' is not a semantic version (expected MAJOR.MINOR.PATCH)"
            )));
        }
    };

    let patch = match pre {
        Some(pre) if !pre.is_empty() => patch,
        _ => patch + 1,
    };
    Ok(format!("{prefix}{major}.{minor}.{patch}"))
}

/// Bump the patch version stored in the package file at `path`.
///
/// Key order, indentation and the trailing newline of the file are kept.
/// Returns `(old, new)`.
pub fn bump_package_file(fs: &dyn FileSystem, path: &Path) -> Result<(String, String)> {
    let text = fs
        .read_to_string(path)
        .map_err(|e| SitepipeError::PackageError(format!("{e:#}")))?;
    let mut doc: Value = serde_json::from_str(&text)?;

    let old = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SitepipeError::PackageError(format!(
                "{} has no string \"version\" field",
                path.display()
            ))
        })?
        .to_string();
    let new = bump_patch(&old)?;
    doc["version"] = Value::String(new.clone());

    let mut out = to_json_with_indent(&doc, &detect_indent(&text))?;
    if text.ends_with('\n') {
        out.push('\n');
    }
    fs.write(path, out.as_bytes())?;

    info!(path = %path.display(), from = %old, to = %new, "bumped package version");
    Ok((old, new))
}

/// Indentation of the first indented line, defaulting to two spaces.
fn detect_indent(text: &str) -> String {
    text.lines()
        .skip(1)
        .find_map(|line| {
            let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
            (!indent.is_empty()).then_some(indent)
        })
        .unwrap_or_else(|| "  ".to_string())
}

fn to_json_with_indent(doc: &Value, indent: &str) -> Result<String> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| SitepipeError::PackageError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn pkg() -> PackageMetadata {
        serde_json::from_str(
            r#"{
                "name": "acme-site",
                "version": "1.2.3",
                "author": { "name": "Acme Ltd", "email": "web@acme.test" },
                "description": "Marketing site",
                "homepage": "https://acme.test",
                "license": "MIT"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn banner_interpolates_metadata() {
        let b = banner(&pkg(), 2026);
        assert_eq!(
            b,
            "/**\n * Copyright (c) 2026 Acme Ltd\n * acme-site - Marketing site\n * @version v1.2.3\n * @link https://acme.test\n * @license MIT\n */\n"
        );
    }

    #[test]
    fn author_may_be_a_plain_string() {
        let p: PackageMetadata =
            serde_json::from_str(r#"{"name":"x","version":"0.0.1","author":"Jo"}"#).unwrap();
        assert_eq!(p.author.name(), "Jo");
        assert_eq!(p.license, "");
    }

    #[test]
    fn bump_patch_cases() {
        assert_eq!(bump_patch("1.2.3").unwrap(), "1.2.4");
        assert_eq!(bump_patch("0.9.99").unwrap(), "0.9.100");
        assert_eq!(bump_patch("1.2.3-rc.1").unwrap(), "1.2.3");
        assert_eq!(bump_patch("1.2.3+build.7").unwrap(), "1.2.4");
        assert_eq!(bump_patch("v2.0.0").unwrap(), "v2.0.1");
        assert!(bump_patch("1.2").is_err());
        assert!(bump_patch("one.two.three").is_err());
    }

    #[test]
    fn bump_preserves_layout() {
        let fs = MockFileSystem::new();
        let path = Path::new("./package.json");
        fs.add_file(
            path,
            "{\n    \"name\": \"acme\",\n    \"version\": \"1.2.3\",\n    \"scripts\": {\n        \"build\": \"sitepipe\"\n    }\n}\n",
        );

        let (old, new) = bump_package_file(&fs, path).unwrap();
        assert_eq!((old.as_str(), new.as_str()), ("1.2.3", "1.2.4"));
        assert_eq!(
            fs.contents(path).unwrap(),
            "{\n    \"name\": \"acme\",\n    \"version\": \"1.2.4\",\n    \"scripts\": {\n        \"build\": \"sitepipe\"\n    }\n}\n"
        );
    }

    #[test]
    fn missing_version_field_is_an_error() {
        let fs = MockFileSystem::new();
        let path = Path::new("./package.json");
        fs.add_file(path, r#"{"name":"acme"}"#);
        assert!(matches!(
            bump_package_file(&fs, path),
            Err(SitepipeError::PackageError(_))
        ));
    }
}
