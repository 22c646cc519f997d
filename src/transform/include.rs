// src/transform/include.rs

//! `@@include('partial.html', {"title": "Home"})` expansion.
//!
//! Paths are resolved relative to the file containing the directive. The
//! optional JSON object provides `@@name` substitutions inside the included
//! file; it is delimited by brace matching that skips JSON strings, so values
//! may contain `)` or `}`. Includes nest; cycles, missing files and malformed
//! directives are reported as errors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::Value;

use crate::context::BuildContext;
use crate::transform::{code_frame, Artifact, TextTransform, TransformError};

const PLUGIN: &str = "file-include";
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct FileInclude {
    directive: Regex,
}

impl Default for FileInclude {
    fn default() -> Self {
        Self::new()
    }
}

impl FileInclude {
    pub fn new() -> Self {
        // Only the head; the optional context and `)` are scanned by hand.
        let directive = Regex::new(r#"@@include\(\s*["']([^"']+)["']"#)
            .expect("include directive regex is valid");
        Self { directive }
    }

    fn expand(
        &self,
        text: &str,
        file: &Path,
        ctx: &BuildContext,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, TransformError> {
        if stack.len() > MAX_DEPTH {
            return Err(TransformError::new(
                PLUGIN,
                format!("includes nested deeper than {MAX_DEPTH} levels"),
            )
            .with_file(file));
        }

        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        while let Some(caps) = self.directive.captures_at(text, last) {
            let Some(head) = caps.get(0) else {
                break;
            };
            out.push_str(&text[last..head.start()]);

            let fail = |message: String| {
                TransformError::new(PLUGIN, message)
                    .with_code_frame(code_frame(text, head.start()))
                    .with_file(file)
            };

            let (context, end) = directive_tail(text, head.end()).ok_or_else(|| {
                fail("malformed @@include: expected `)` or `, {...})`".to_string())
            })?;
            last = end;

            let target = dir.join(&caps[1]);
            if stack.contains(&target) {
                return Err(fail(format!(
                    "include cycle: '{}' is already being included",
                    &caps[1]
                )));
            }

            let vars = parse_vars(context).map_err(fail)?;
            let included = ctx.fs().read_to_string(&target).map_err(|e| {
                fail(format!("cannot include '{}': {e:#}", &caps[1]))
            })?;
            let included = substitute(&included, &vars);

            stack.push(target.clone());
            let expanded = self.expand(&included, &target, ctx, stack)?;
            stack.pop();

            out.push_str(&expanded);
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl TextTransform for FileInclude {
    fn id(&self) -> &str {
        PLUGIN
    }

    fn transform_text(
        &self,
        text: &str,
        artifact: &Artifact,
        ctx: &BuildContext,
    ) -> Result<String, TransformError> {
        let mut stack = vec![artifact.source.clone()];
        self.expand(text, &artifact.source, ctx, &mut stack)
    }
}

/// Parse what follows the quoted path: optional `, {json}` then `)`.
/// Returns the JSON text (if any) and the offset just past `)`.
fn directive_tail(text: &str, at: usize) -> Option<(Option<&str>, usize)> {
    let mut pos = skip_blanks(text, at);
    let mut context = None;
    if text[pos..].starts_with(',') {
        let start = skip_blanks(text, pos + 1);
        let len = json_object_len(&text[start..])?;
        context = Some(&text[start..start + len]);
        pos = skip_blanks(text, start + len);
    }
    text[pos..].starts_with(')').then_some((context, pos + 1))
}

fn skip_blanks(text: &str, at: usize) -> usize {
    let rest = &text[at..];
    at + (rest.len() - rest.trim_start().len())
}

/// Byte length of the JSON object at the start of `s`, braces inside strings
/// excluded.
fn json_object_len(s: &str) -> Option<usize> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_vars(raw: Option<&str>) -> Result<BTreeMap<String, String>, String> {
    let Some(raw) = raw else {
        return Ok(BTreeMap::new());
    };
    let value: Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid include context {raw}: {e}"))?;
    let Value::Object(map) = value else {
        return Err("include context must be a JSON object".to_string());
    };
    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, rendered)
        })
        .collect())
}

/// Replace `@@name` markers. Longer names go first so `@@titleSuffix` is not
/// clobbered by `@@title`.
fn substitute(text: &str, vars: &BTreeMap<String, String>) -> String {
    if vars.is_empty() {
        return text.to_string();
    }
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let mut out = text.to_string();
    for key in keys {
        out = out.replace(&format!("@@{key}"), &vars[key]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildContext;
    use crate::fs::mock::MockFileSystem;
    use std::sync::Arc;

    fn ctx(fs: &MockFileSystem) -> BuildContext {
        BuildContext::with_defaults(Arc::new(fs.clone()))
    }

    fn artifact(path: &str, text: &str) -> Artifact {
        Artifact {
            source: PathBuf::from(path),
            relative: PathBuf::from("index.html"),
            contents: text.as_bytes().to_vec(),
        }
    }

    fn run(fs: &MockFileSystem, path: &str) -> Result<String, TransformError> {
        let text = fs.contents(path).unwrap();
        FileInclude::new().transform_text(&text, &artifact(path, &text), &ctx(fs))
    }

    #[test]
    fn expands_nested_includes_with_context() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "./src/index.html",
            "<body>@@include('partials/head.html', {\"title\": \"Home\"})</body>",
        );
        fs.add_file(
            "./src/partials/head.html",
            "<h1>@@title</h1>@@include(\"nav.html\")",
        );
        fs.add_file("./src/partials/nav.html", "<nav></nav>");

        assert_eq!(
            run(&fs, "./src/index.html").unwrap(),
            "<body><h1>Home</h1><nav></nav></body>"
        );
    }

    #[test]
    fn missing_include_reports_location() {
        let fs = MockFileSystem::new();
        fs.add_file("./src/index.html", "<p>\n@@include('gone.html')\n</p>");

        let err = run(&fs, "./src/index.html").unwrap_err();
        assert_eq!(err.plugin, "file-include");
        assert!(err.message.contains("gone.html"));
        assert!(err.code_frame.unwrap().starts_with("2 | @@include"));
    }

    #[test]
    fn include_cycle_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_file("./src/a.html", "@@include('b.html')");
        fs.add_file("./src/b.html", "@@include('a.html')");

        let err = run(&fs, "./src/a.html").unwrap_err();
        assert!(err.message.contains("include cycle"));
    }

    #[test]
    fn context_values_may_contain_parens_and_braces() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "./src/index.html",
            "<h1>@@include('t.html', {\"title\": \"A (B) {c}\", \"n\": {\"x\": 1}})</h1>!",
        );
        fs.add_file("./src/t.html", "@@title/@@n");

        assert_eq!(
            run(&fs, "./src/index.html").unwrap(),
            "<h1>A (B) {c}/{\"x\":1}</h1>!"
        );
    }

    #[test]
    fn unclosed_directive_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_file("./src/index.html", "@@include('t.html', {\"a\": 1}");
        fs.add_file("./src/t.html", "x");

        let err = run(&fs, "./src/index.html").unwrap_err();
        assert!(err.message.starts_with("malformed @@include"), "{}", err.message);
    }

    #[test]
    fn longer_variable_names_win() {
        let mut vars = BTreeMap::new();
        vars.insert("title".to_string(), "A".to_string());
        vars.insert("titleSuffix".to_string(), "B".to_string());
        assert_eq!(substitute("@@title|@@titleSuffix", &vars), "A|B");
    }
}
