// src/transform/css.rs

//! Conservative CSS minifier.
//!
//! Drops comments (except `/*! ... */`), collapses whitespace and removes it
//! where the grammar does not need it, and drops the last `;` of a block.
//! String contents are copied verbatim.

use crate::context::BuildContext;
use crate::transform::{code_frame, Artifact, TextTransform, TransformError};

const PLUGIN: &str = "css-minify";

/// No space is needed after these.
const TIGHT_AFTER: &[char] = &['{', '}', ';', ':', ',', '>', '('];
/// No space is needed before these. `:` and `(` are absent on purpose:
/// `a :hover` and `and (min-width…)` depend on the space.
const TIGHT_BEFORE: &[char] = &['{', '}', ';', ',', '>', ')', '!'];

#[derive(Debug, Clone, Default)]
pub struct CssMinify;

impl CssMinify {
    pub fn new() -> Self {
        Self
    }
}

impl TextTransform for CssMinify {
    fn id(&self) -> &str {
        PLUGIN
    }

    fn transform_text(
        &self,
        text: &str,
        _artifact: &Artifact,
        _ctx: &BuildContext,
    ) -> Result<String, TransformError> {
        minify(text)
    }
}

pub fn minify(css: &str) -> Result<String, TransformError> {
    let mut out = String::with_capacity(css.len());
    let mut pending_space = false;
    let mut chars = css.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '/' if chars.peek().map(|&(_, n)| n) == Some('*') => {
                chars.next();
                let body_start = i + 2;
                let Some(len) = css[body_start..].find("*/") else {
                    return Err(TransformError::new(PLUGIN, "unterminated comment")
                        .with_code_frame(code_frame(css, i)));
                };
                let end = body_start + len + 2;
                if css[body_start..].starts_with('!') {
                    emit(&mut out, &mut pending_space, &css[i..end]);
                } else {
                    pending_space = true;
                }
                while chars.peek().is_some_and(|&(j, _)| j < end) {
                    chars.next();
                }
            }
            '"' | '\'' => {
                let mut end = None;
                let mut escaped = false;
                for (j, n) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if n == '\\' {
                        escaped = true;
                    } else if n == c {
                        end = Some(j + n.len_utf8());
                        break;
                    } else if n == '\n' {
                        break;
                    }
                }
                let Some(end) = end else {
                    return Err(TransformError::new(PLUGIN, "unterminated string")
                        .with_code_frame(code_frame(css, i)));
                };
                emit(&mut out, &mut pending_space, &css[i..end]);
            }
            c if c.is_whitespace() => pending_space = true,
            '}' => {
                if out.ends_with(';') {
                    out.pop();
                }
                pending_space = false;
                out.push('}');
            }
            _ => {
                let mut buf = [0u8; 4];
                emit(&mut out, &mut pending_space, c.encode_utf8(&mut buf));
            }
        }
    }

    Ok(out)
}

/// Append `token`, inserting a single space first if whitespace preceded it
/// and neither neighbour makes the space redundant.
fn emit(out: &mut String, pending_space: &mut bool, token: &str) {
    if *pending_space {
        let prev = out.chars().last();
        let next = token.chars().next();
        let needed = match (prev, next) {
            (Some(p), Some(n)) => !TIGHT_AFTER.contains(&p) && !TIGHT_BEFORE.contains(&n),
            _ => false,
        };
        if needed {
            out.push(' ');
        }
        *pending_space = false;
    }
    out.push_str(token);
}
