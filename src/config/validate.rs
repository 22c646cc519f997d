// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SitepipeError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SitepipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.paths, raw.capabilities, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_dist_placement(cfg)?;
    validate_capabilities(cfg)?;
    validate_globs(cfg)?;
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let p = &cfg.paths;
    for (key, value) in [
        ("src", &p.src),
        ("dist", &p.dist),
        ("public", &p.public),
        ("package", &p.package),
        ("design_tokens", &p.design_tokens),
    ] {
        if value.trim().is_empty() {
            return Err(SitepipeError::ConfigError(format!(
                "[paths].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

/// `clean` deletes `dist` recursively, so it must never cover sources.
fn validate_dist_placement(cfg: &RawConfigFile) -> Result<()> {
    let dist = normalize(&cfg.paths.dist);
    if dist.as_os_str().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[paths].dist must not be the project root".to_string(),
        ));
    }

    for (key, value) in [("src", &cfg.paths.src), ("public", &cfg.paths.public)] {
        let other = normalize(value);
        if other.starts_with(&dist) {
            return Err(SitepipeError::ConfigError(format!(
                "[paths].dist ('{}') must not contain [paths].{key} ('{}')",
                cfg.paths.dist, value
            )));
        }
        // An empty `other` is the project root, which contains every `dist`.
        if dist.starts_with(&other) {
            return Err(SitepipeError::ConfigError(format!(
                "[paths].dist ('{}') must not live inside [paths].{key} ('{}')",
                cfg.paths.dist, value
            )));
        }
    }
    Ok(())
}

fn validate_capabilities(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.capabilities;
    for (key, value) in [
        ("css_postprocess", &c.css_postprocess),
        ("js_transpile", &c.js_transpile),
        ("image_optimizer", &c.image_optimizer),
        ("html_beautify", &c.html_beautify),
    ] {
        if let Some(cmd) = value {
            if cmd.trim().is_empty() {
                return Err(SitepipeError::ConfigError(format!(
                    "[capabilities].{key} is set but empty; remove it to pass files through"
                )));
            }
        }
    }
    Ok(())
}

fn validate_globs(cfg: &RawConfigFile) -> Result<()> {
    let patterns = cfg
        .paths
        .html_pages
        .iter()
        .map(|p| ("[paths].html_pages", p))
        .chain(cfg.watch.exclude.iter().map(|p| ("[watch].exclude", p)));

    for (key, pat) in patterns {
        if let Err(err) = GlobBuilder::new(pat).literal_separator(true).build() {
            return Err(SitepipeError::ConfigError(format!(
                "{key} contains an invalid glob '{pat}': {err}"
            )));
        }
    }
    Ok(())
}

/// Lexically normalize a relative path: drop `.` components and trailing
/// separators so `./dist/` and `dist` compare equal.
fn normalize(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawConfigFile {
        RawConfigFile::default()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ConfigFile::try_from(raw()).is_ok());
    }

    #[test]
    fn dist_at_root_is_rejected() {
        let mut cfg = raw();
        cfg.paths.dist = "./".to_string();
        let err = ConfigFile::try_from(cfg).unwrap_err();
        assert!(err.to_string().contains("project root"));
    }

    #[test]
    fn dist_containing_src_is_rejected() {
        let mut cfg = raw();
        cfg.paths.dist = "site".to_string();
        cfg.paths.src = "site/src".to_string();
        let err = ConfigFile::try_from(cfg).unwrap_err();
        assert!(err.to_string().contains("must not contain"));
    }

    #[test]
    fn dist_inside_public_is_rejected() {
        let mut cfg = raw();
        cfg.paths.dist = "public/out".to_string();
        let err = ConfigFile::try_from(cfg).unwrap_err();
        assert!(err.to_string().contains("must not live inside"));
    }

    #[test]
    fn sources_at_project_root_are_rejected() {
        for key in ["src", "public"] {
            let mut cfg = raw();
            match key {
                "src" => cfg.paths.src = ".".to_string(),
                _ => cfg.paths.public = "./".to_string(),
            }
            let err = ConfigFile::try_from(cfg).unwrap_err();
            assert!(
                err.to_string().contains(&format!("must not live inside [paths].{key}")),
                "{err}"
            );
        }
    }

    #[test]
    fn blank_capability_is_rejected() {
        let mut cfg = raw();
        cfg.capabilities.js_transpile = Some("  ".to_string());
        assert!(matches!(
            ConfigFile::try_from(cfg),
            Err(SitepipeError::ConfigError(_))
        ));
    }

    #[test]
    fn invalid_exclude_glob_is_rejected() {
        let mut cfg = raw();
        cfg.watch.exclude.push("src/[".to_string());
        let err = ConfigFile::try_from(cfg).unwrap_err();
        assert!(err.to_string().contains("[watch].exclude"));
    }
}
