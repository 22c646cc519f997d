// src/transform/js.rs

//! Conservative JavaScript minifier.
//!
//! Removes comments (keeping `/*! ... */`), collapses runs of blanks and drops
//! blanks that separate punctuation. Line breaks are kept as single `\n` so
//! automatic semicolon insertion behaves exactly as in the source. Strings,
//! template literals and regular expression literals are copied verbatim.

use crate::context::BuildContext;
use crate::transform::{code_frame, Artifact, TextTransform, TransformError};

const PLUGIN: &str = "js-minify";

/// After these a `/` starts a regular expression rather than a division.
const REGEX_PRECEDERS: &[char] = &[
    '(', ',', '=', ':', '[', '!', '&', '|', '?', '{', '}', ';', '+', '-', '*', '%', '<', '>', '~',
    '^', '\n',
];
const REGEX_KEYWORDS: &[&str] = &["return", "typeof", "case", "do", "else", "in", "of", "void"];

#[derive(Debug, Clone, Default)]
pub struct JsMinify;

impl JsMinify {
    pub fn new() -> Self {
        Self
    }
}

impl TextTransform for JsMinify {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    None,
    Space,
    Newline,
}

pub fn minify(js: &str) -> Result<String, TransformError> {
    let bytes: Vec<(usize, char)> = js.char_indices().collect();
    let mut out = String::with_capacity(js.len());
    let mut gap = Gap::None;
    let mut i = 0;

    let fail = |message: &str, at: usize| {
        TransformError::new(PLUGIN, message).with_code_frame(code_frame(js, at))
    };

    while i < bytes.len() {
        let (pos, c) = bytes[i];
        let next = bytes.get(i + 1).map(|&(_, n)| n);

        match c {
            '/' if next == Some('/') => {
                while i < bytes.len() && bytes[i].1 != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if next == Some('*') => {
                let Some(len) = js[pos + 2..].find("*/") else {
                    return Err(fail("unterminated comment", pos));
                };
                let end = pos + 2 + len + 2;
                let comment = &js[pos..end];
                if comment.starts_with("/*!") {
                    push_token(&mut out, &mut gap, comment);
                } else if comment.contains('\n') {
                    gap = gap.max_with(Gap::Newline);
                } else {
                    gap = gap.max_with(Gap::Space);
                }
                while i < bytes.len() && bytes[i].0 < end {
                    i += 1;
                }
                continue;
            }
            '"' | '\'' | '`' => {
                let end =
                    scan_quoted(&bytes, i, c).ok_or_else(|| fail("unterminated string", pos))?;
                push_token(&mut out, &mut gap, &js[pos..end_offset(js, &bytes, end)]);
                i = end;
                continue;
            }
            '/' if starts_regex(&out) => {
                let end = scan_regex(&bytes, i)
                    .ok_or_else(|| fail("unterminated regular expression", pos))?;
                push_token(&mut out, &mut gap, &js[pos..end_offset(js, &bytes, end)]);
                i = end;
                continue;
            }
            '\n' | '\r' => gap = gap.max_with(Gap::Newline),
            c if c.is_whitespace() => gap = gap.max_with(Gap::Space),
            _ => {
                let mut buf = [0u8; 4];
                push_token(&mut out, &mut gap, c.encode_utf8(&mut buf));
            }
        }
        i += 1;
    }

    Ok(out)
}

impl Gap {
    fn max_with(self, other: Gap) -> Gap {
        match (self, other) {
            (Gap::Newline, _) | (_, Gap::Newline) => Gap::Newline,
            (Gap::Space, _) | (_, Gap::Space) => Gap::Space,
            _ => Gap::None,
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn push_token(out: &mut String, gap: &mut Gap, token: &str) {
    let prev = out.chars().last();
    let next = token.chars().next();
    match (*gap, prev, next) {
        (Gap::Newline, Some(p), Some(_)) if p != '\n' => out.push('\n'),
        (Gap::Space, Some(p), Some(n)) if space_needed(p, n) => out.push(' '),
        _ => {}
    }
    *gap = Gap::None;
    out.push_str(token);
}

fn space_needed(prev: char, next: char) -> bool {
    (is_word(prev) && is_word(next))
        || (prev == next && matches!(prev, '+' | '-' | '/'))
        || (prev == '/' && next == '*')
}

/// A `/` at this point opens a regex literal if the previous token cannot end
/// an expression.
fn starts_regex(out: &str) -> bool {
    let trimmed = out.trim_end_matches(' ');
    let Some(last) = trimmed.chars().last() else {
        return true;
    };
    // Postfix `x++ / 2` is a division.
    if trimmed.ends_with("++") || trimmed.ends_with("--") {
        return false;
    }
    if REGEX_PRECEDERS.contains(&last) {
        return true;
    }
    if is_word(last) {
        let word: String = trimmed
            .chars()
            .rev()
            .take_while(|c| is_word(*c))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        return REGEX_KEYWORDS.contains(&word.as_str());
    }
    false
}

/// Index (into `bytes`) just past the closing `quote`, or `None`.
fn scan_quoted(bytes: &[(usize, char)], start: usize, quote: char) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i].1 {
            '\\' => i += 2,
            '\n' if quote != '`' => return None,
            c if c == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Index (into `bytes`) just past the regex body and its flags, or `None`.
fn scan_regex(bytes: &[(usize, char)], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i].1 {
            '\\' => i += 2,
            '\n' => return None,
            '[' => {
                in_class = true;
                i += 1;
            }
            ']' => {
                in_class = false;
                i += 1;
            }
            '/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].1.is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => i += 1,
        }
    }
    None
}

/// Byte offset in `js` for char index `idx` (which may be one past the end).
fn end_offset(js: &str, bytes: &[(usize, char)], idx: usize) -> usize {
    bytes.get(idx).map(|&(pos, _)| pos).unwrap_or(js.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blanks() {
        let js = "// helpers\nfunction add(a, b) {\n  /* sum */\n  return a + b;\n}\n\n\nconst x = add(1, 2);\n";
        assert_eq!(
            minify(js).unwrap(),
            "function add(a,b){\nreturn a+b;\n}\nconst x=add(1,2);"
        );
    }

    #[test]
    fn keeps_strings_templates_and_regexes() {
        let js = "const s = 'a  // b';\nconst t = `x  ${ s }`;\nconst r = /\\/\\/ +[/]/g.test(s);\nreturn /a b/.source;";
        assert_eq!(
            minify(js).unwrap(),
            "const s='a  // b';\nconst t=`x  ${ s }`;\nconst r=/\\/\\/ +[/]/g.test(s);\nreturn/a b/.source;"
        );
    }

    #[test]
    fn does_not_merge_increment_operators() {
        assert_eq!(minify("a + +b; c - -d;").unwrap(), "a+ +b;c- -d;");
    }

    #[test]
    fn division_is_not_a_regex() {
        assert_eq!(minify("x = a / b / c;").unwrap(), "x=a/b/c;");
    }

    #[test]
    fn division_after_postfix_operator() {
        assert_eq!(
            minify("let x = 1;\nconst y = x++ / 2;\nconst z = x-- / y;\n").unwrap(),
            "let x=1;\nconst y=x++/2;\nconst z=x--/y;"
        );
        assert_eq!(minify("a = b + /re/.source;").unwrap(), "a=b+/re/.source;");
    }

    #[test]
    fn unterminated_string_has_code_frame() {
        let err = minify("let a = 1;\nlet b = 'oops;\n").unwrap_err();
        assert_eq!(err.message, "unterminated string");
        assert!(err.code_frame.unwrap().starts_with("2 | let b = 'oops;"));
    }
}
