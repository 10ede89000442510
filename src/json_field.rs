//! Textual field lookup for small JSON request bodies.
//!
//! This is deliberately not a JSON parser. [`extract_string_field`] finds
//! the first literal `"key"` anywhere in the body, jumps to the next `:`,
//! and reads a double-quoted string where any `\X` pair yields `X`
//! (no `\n` or `\u` decoding). [`extract_bool_field`] matches a literal
//! `true` / `false` at the value position. Any structural mismatch
//! yields `None`.
//!
//! Because the match is purely textual, `"key"` occurring inside another
//! field's string value can be picked up instead of the real field. The
//! auth bodies this serves are flat and small, so that is accepted.

/// `isspace` in the C locale, including vertical tab and form feed.
const fn is_json_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Byte offset of the value following `"key"` and its `:`, whitespace skipped.
fn value_start(body: &[u8], key: &str) -> Option<usize> {
    let pattern = format!("\"{key}\"");
    let key_pos = find(body, pattern.as_bytes(), 0)?;
    let colon = find(body, b":", key_pos + pattern.len())?;

    let mut pos = colon + 1;
    while pos < body.len() && is_json_space(body[pos]) {
        pos += 1;
    }
    Some(pos)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

#[must_use]
pub fn extract_string_field(body: &str, key: &str) -> Option<String> {
    let bytes = body.as_bytes();
    let mut pos = value_start(bytes, key)?;
    if bytes.get(pos) != Some(&b'"') {
        return None;
    }
    pos += 1;

    let mut out = Vec::with_capacity(64);
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() => {
                out.push(bytes[pos + 1]);
                pos += 2;
            }
            b'"' => return String::from_utf8(out).ok(),
            b => {
                out.push(b);
                pos += 1;
            }
        }
    }
    None
}

#[must_use]
pub fn extract_bool_field(body: &str, key: &str) -> Option<bool> {
    let bytes = body.as_bytes();
    let rest = bytes.get(value_start(bytes, key)?..)?;
    if rest.starts_with(b"true") {
        Some(true)
    } else if rest.starts_with(b"false") {
        Some(false)
    } else {
        None
    }
}

/// Field accessor over a raw request body.
///
/// Handlers read fields through this type only, so the lookup strategy
/// can change without touching them.
#[derive(Debug, Clone, Copy)]
pub struct BodyFields<'a>(&'a str);

impl<'a> BodyFields<'a> {
    #[must_use]
    pub const fn new(body: &'a str) -> Self {
        Self(body)
    }

    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        extract_string_field(self.0, key)
    }

    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        extract_bool_field(self.0, key)
    }
}
