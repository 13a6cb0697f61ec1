//! Inline style helpers shared by the serializer and the parser.
//!
//! Style attributes are `key:value` pairs joined by `;`. Lengths carry a
//! two-letter unit (`px`, `pt`), colors are `rgba(r,g,b,alpha)` with alpha as a
//! 0-1 fraction.

use std::borrow::Cow;

use crate::ast::{Color, FontWeight};

/// Sentinel written for a transparent background
pub const NONE: &str = "none";

/// Decoded `key:value;key:value` attribute, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineStyle<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> InlineStyle<'a> {
    /// Split a style attribute. Fails with the offending segment when a
    /// non-empty segment has no `:`.
    pub fn parse(style: &'a str) -> Result<Self, &'a str> {
        let mut pairs = Vec::new();
        for segment in style.split(';') {
            if segment.trim().is_empty() {
                continue;
            }
            let (key, value) = segment.split_once(':').ok_or(segment)?;
            pairs.push((key.trim(), value.trim()));
        }
        Ok(Self { pairs })
    }

    /// Last value given for `key`
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }
}

pub fn encode_length(value: u32, unit: &str) -> String {
    format!("{}{}", value, unit)
}

/// Numeric prefix of a length such as `12pt` or `800px`
pub fn decode_length(value: &str) -> Option<u32> {
    let value = value.trim();
    let number = value.get(..value.len().checked_sub(2)?)?.trim();

    if let Ok(n) = number.parse::<u32>() {
        return Some(n);
    }
    let n = number.parse::<f64>().ok()?;
    (n.is_finite() && n >= 0.0 && n <= u32::MAX as f64).then(|| n.round() as u32)
}

/// Alpha as a 0-1 fraction with at most three decimals.
///
/// Three decimals keep the error under half a step of 1/255, so
/// [`decode_alpha`] recovers the exact byte.
pub fn encode_alpha(alpha: u8) -> String {
    match alpha {
        0 => "0".to_string(),
        255 => "1".to_string(),
        a => {
            let fraction = format!("{:.3}", a as f64 / 255.0);
            fraction.trim_end_matches('0').to_string()
        }
    }
}

pub fn decode_alpha(value: &str) -> Option<u8> {
    let fraction = value.trim().parse::<f64>().ok()?;
    (0.0..=1.0)
        .contains(&fraction)
        .then(|| (fraction * 255.0).round() as u8)
}

pub fn encode_color(color: Color) -> String {
    format!(
        "rgba({},{},{},{})",
        color.r,
        color.g,
        color.b,
        encode_alpha(color.a)
    )
}

/// Decode `rgba(r,g,b,a)` (or `rgb(r,g,b)`, taken as opaque)
pub fn decode_color(value: &str) -> Option<Color> {
    let value = value.trim();
    let (args, with_alpha) = if let Some(rest) = value.strip_prefix("rgba(") {
        (rest, true)
    } else if let Some(rest) = value.strip_prefix("rgb(") {
        (rest, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = args.strip_suffix(')')?.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<u8>().ok();

    match (with_alpha, parts.as_slice()) {
        (true, [r, g, b, a]) => Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, decode_alpha(a)?)),
        (false, [r, g, b]) => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
        _ => None,
    }
}

pub fn encode_background(background: Option<Color>) -> String {
    background.map(encode_color).unwrap_or_else(|| NONE.to_string())
}

/// `Some(None)` for the transparent sentinel, `None` when unreadable
pub fn decode_background(value: &str) -> Option<Option<Color>> {
    if value.trim().eq_ignore_ascii_case(NONE) {
        Some(None)
    } else {
        decode_color(value).map(Some)
    }
}

pub fn encode_weight(weight: FontWeight) -> String {
    match weight {
        FontWeight::NORMAL => "normal".to_string(),
        FontWeight::BOLD => "bold".to_string(),
        FontWeight(n) => n.to_string(),
    }
}

pub fn decode_weight(value: &str) -> Option<FontWeight> {
    match value.trim() {
        "normal" => Some(FontWeight::NORMAL),
        "bold" => Some(FontWeight::BOLD),
        n => n.parse::<u16>().ok().filter(|n| *n > 0).map(FontWeight),
    }
}

pub fn encode_italic(italic: bool) -> &'static str {
    if italic {
        "italic"
    } else {
        "normal"
    }
}

pub fn decode_italic(value: &str) -> Option<bool> {
    match value.trim() {
        "italic" | "oblique" => Some(true),
        "normal" => Some(false),
        _ => None,
    }
}

/// Characters a family name cannot carry literally inside a style attribute
const FAMILY_RESERVED: &[char] = &['%', ';', ':', '&', '"', '\'', '<', '>', '\\'];

/// Family names are written bare, with attribute-breaking characters and
/// edge whitespace as `%HH` byte escapes.
pub fn encode_family(family: &str) -> Cow<'_, str> {
    let core = family.trim();
    let lead = family.len() - family.trim_start().len();
    let needs_escape = core.len() != family.len() || family.contains(FAMILY_RESERVED);
    if !needs_escape {
        return Cow::Borrowed(family);
    }

    let mut encoded = String::with_capacity(family.len() + 8);
    for (index, c) in family.char_indices() {
        let edge = index < lead || index >= lead + core.len();
        if FAMILY_RESERVED.contains(&c) || (edge && c.is_whitespace()) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        } else {
            encoded.push(c);
        }
    }
    Cow::Owned(encoded)
}

/// Inverse of [`encode_family`]. Quotes around the raw value (other
/// writers' `'DejaVu Sans'`) are dropped first; a `%` without two hex digits
/// after it is kept as is. `None` when the escapes do not form UTF-8.
pub fn decode_family(value: &str) -> Option<String> {
    let raw = value.trim().trim_matches(|c| c == '\'' || c == '"').trim();
    if !raw.contains('%') {
        return Some(raw.to_string());
    }

    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let byte = raw
                .get(index + 1..index + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = byte {
                decoded.push(byte);
                index += 3;
                continue;
            }
        }
        decoded.push(bytes[index]);
        index += 1;
    }
    String::from_utf8(decoded).ok()
}

pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

pub fn unescape_text(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];

        let entity = [("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>'), ("&quot;", '"'), ("&#39;", '\'')]
            .iter()
            .find(|(name, _)| rest.starts_with(name));

        match entity {
            Some((name, c)) => {
                out.push(*c);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
