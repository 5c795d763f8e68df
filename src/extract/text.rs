//! Text primitives shared by the C# extractor: delimiter balancing,
//! comment stripping, parameter splitting and identifier case conversion.

use once_cell::sync::Lazy;
use regex::Regex;

/// Word followed by a capitalized run (`xConnection` -> `x_Connection`).
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("invalid word boundary regex"));

/// Lowercase or digit followed by a capital (`pB` -> `p_B`).
static CASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("invalid case boundary regex"));

/// Type names that are never dependencies or navigation targets.
const PRIMITIVE_TYPES: &[&str] = &[
    "bool",
    "byte",
    "sbyte",
    "char",
    "decimal",
    "double",
    "float",
    "int",
    "uint",
    "long",
    "ulong",
    "short",
    "ushort",
    "string",
    "object",
    "dynamic",
    "Boolean",
    "Byte",
    "Char",
    "Decimal",
    "Double",
    "Single",
    "Int16",
    "Int32",
    "Int64",
    "String",
    "Object",
    "Guid",
    "DateTime",
    "DateTimeOffset",
    "DateOnly",
    "TimeOnly",
    "TimeSpan",
];

/// Returns the text strictly between the delimiter at `open_pos` and its
/// matching closer.
///
/// `open_pos` must point at `{` or `(`. Returns `None` when it does not,
/// or when the text ends before the depth returns to zero.
#[must_use]
pub fn extract_balanced(text: &str, open_pos: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let open = *bytes.get(open_pos)?;
    let close = match open {
        b'{' => b'}',
        b'(' => b')',
        _ => return None,
    };

    let mut depth = 0usize;
    for (offset, &byte) in bytes[open_pos..].iter().enumerate() {
        if byte == open {
            depth += 1;
        } else if byte == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[open_pos + 1..open_pos + offset]);
            }
        }
    }
    None
}

/// Removes `//` comments from every line.
#[must_use]
pub fn strip_line_comments(text: &str) -> String {
    text.split('\n')
        .map(|line| line.find("//").map_or(line, |idx| &line[..idx]))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits a parameter list on commas that are not nested inside `<>` or `[]`.
#[must_use]
pub fn split_parameters(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in params.char_indices() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&params[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < params.len() {
        parts.push(&params[start..]);
    }
    parts
}

/// Converts `CamelCase` to `snake_case`, keeping acronyms together.
///
/// `HTTPSConnection` becomes `https_connection`.
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let first = WORD_BOUNDARY.replace_all(name, "${1}_${2}");
    CASE_BOUNDARY.replace_all(&first, "${1}_${2}").to_lowercase()
}

/// Lowercases the first character (`FirstName` -> `firstName`).
#[must_use]
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns `true` for built-in value and string types, ignoring `?` and `[]`.
#[must_use]
pub fn is_primitive(type_name: &str) -> bool {
    let bare = type_name.trim().trim_end_matches("[]").trim_end_matches('?');
    PRIMITIVE_TYPES.contains(&bare)
}

/// Returns at most `len` bytes of `text` starting at `start`, shortened to
/// the nearest character boundary.
#[must_use]
pub fn window(text: &str, start: usize, len: usize) -> &str {
    let start = start.min(text.len());
    let mut end = start.saturating_add(len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}
