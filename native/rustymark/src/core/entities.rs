//! Entity Decoding and Escaping
//!
//! Handles decoding of character references in text and attribute values:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Common HTML named entities (&nbsp; &copy; &mdash; ...)
//! - Numeric character references: &#123; &#x7B;
//!
//! Unknown references are kept verbatim. Uses Cow for zero-copy when no
//! entities are present.

use memchr::memchr;
use std::borrow::Cow;

/// Longest entity name we try to resolve, to bound the ';' search
const MAX_ENTITY_LEN: usize = 32;

/// Decode character references in text content
///
/// Returns Borrowed if no '&' is present (zero-copy).
pub fn decode_text(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &bytes[pos..]).map(|i| pos + i) {
        result.push_str(&input[pos..amp]);

        let window_end = (amp + 1 + MAX_ENTITY_LEN).min(bytes.len());
        let decoded = memchr(b';', &bytes[amp + 1..window_end]).and_then(|semi| {
            let end = amp + 1 + semi;
            decode_entity(&input[amp + 1..end]).map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, next)) => {
                result.push(c);
                pos = next;
            }
            None => {
                // Unknown entity or bare ampersand, keep as-is
                result.push('&');
                pos = amp + 1;
            }
        }
    }
    result.push_str(&input[pos..]);

    Cow::Owned(result)
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    let c = match entity {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(c)
}

/// Decode a numeric character reference (after the '#')
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    match codepoint {
        0 => Some('\u{FFFD}'),
        _ => char::from_u32(codepoint),
    }
}

/// Escape text content for markup output
pub fn encode_text(input: &str) -> Cow<'_, str> {
    escape(input, false)
}

/// Escape a value for use inside a double-quoted attribute
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    escape(input, true)
}

fn escape(input: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |b: u8| matches!(b, b'<' | b'>' | b'&') || (quotes && b == b'"');

    // Fast path: check if any escaping needed
    if !input.bytes().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' if quotes => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
