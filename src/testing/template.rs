//! `{key}` placeholder templates
//!
//! A placeholder is `{` + name + `}` where the name is made of ASCII
//! alphanumerics, `_`, `-`, `.` and `$`. Names starting with `$` are
//! built-ins supplied by the harness rather than state keys. Anything else in
//! braces is literal text.

use crate::common::{Error, Result};

/// Built-in placeholder for the run timestamp
pub const TIMESTAMP: &str = "$timestamp";

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '$')
}

fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
        let closes = after[name_len..].starts_with('}');

        if name_len > 0 && closes {
            if open > 0 {
                out.push(Segment::Literal(&rest[..open]));
            }
            out.push(Segment::Placeholder(&after[..name_len]));
            rest = &after[name_len + 1..];
        } else {
            out.push(Segment::Literal(&rest[..=open]));
            rest = after;
        }
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Placeholder names in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    segments(template)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// The placeholder name if the whole template is exactly one placeholder
pub fn sole_placeholder(template: &str) -> Option<&str> {
    match segments(template).as_slice() {
        [Segment::Placeholder(name)] => Some(name),
        _ => None,
    }
}

/// Whether a placeholder name refers to a built-in rather than state
pub fn is_builtin(name: &str) -> bool {
    name.starts_with('$')
}

/// Reject built-in names the harness does not provide
pub fn check_builtin(name: &str) -> Result<()> {
    if is_builtin(name) && name != TIMESTAMP {
        return Err(Error::InvalidTemplate(format!(
            "unknown built-in placeholder '{{{}}}'",
            name
        )));
    }
    Ok(())
}

/// Substitute every placeholder using `lookup`
pub fn render<F>(template: &str, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut out = String::with_capacity(template.len());
    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => out.push_str(&lookup(name)?),
        }
    }
    Ok(out)
}
