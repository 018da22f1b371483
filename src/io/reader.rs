//! Source decoding with declared-encoding detection.
//!
//! The first two lines are searched for a `coding: <name>` comment cookie;
//! a UTF-8 byte-order mark takes precedence. An unrecognized cookie is a
//! detection failure and falls back to Latin-1, which decodes any byte
//! sequence losslessly. A decode failure under a *detected* encoding is an
//! error the caller treats as a skipped file.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

static CODING_COOKIE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t\x0c]*#.*?coding[:=][ \t]*([-_.a-zA-Z0-9]+)").unwrap());

#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceEncoding {
    Utf8,
    Latin1,
    Ascii,
}

/// Decode raw file bytes into source text.
pub fn decode_source(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return decode_as(rest, SourceEncoding::Utf8);
    }
    let encoding = match declared_encoding(bytes) {
        Some(name) => match recognize(&name) {
            Some(encoding) => encoding,
            // Declared but unknown: detection failed, fall back lossless.
            None => SourceEncoding::Latin1,
        },
        None => SourceEncoding::Utf8,
    };
    decode_as(bytes, encoding)
}

fn decode_as(bytes: &[u8], encoding: SourceEncoding) -> Result<String, DecodeError> {
    match encoding {
        SourceEncoding::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| DecodeError(format!("invalid utf-8: {e}"))),
        SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        SourceEncoding::Ascii => {
            if bytes.is_ascii() {
                Ok(bytes.iter().map(|&b| b as char).collect())
            } else {
                Err(DecodeError("non-ascii byte under declared ascii".into()))
            }
        }
    }
}

/// The encoding name from a comment cookie in the first two lines, if any.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    for line in bytes.split(|&b| b == b'\n').take(2) {
        // The cookie itself is ASCII; inspect a lossless single-byte view.
        let view: String = line.iter().map(|&b| b as char).collect();
        if let Some(caps) = CODING_COOKIE.captures(&view) {
            return Some(caps[1].to_ascii_lowercase());
        }
    }
    None
}

fn recognize(name: &str) -> Option<SourceEncoding> {
    match name {
        "utf-8" | "utf8" | "utf_8" => Some(SourceEncoding::Utf8),
        "latin-1" | "latin1" | "latin_1" | "latin" | "l1" | "iso-8859-1" | "iso8859-1"
        | "iso_8859_1" | "cp819" => Some(SourceEncoding::Latin1),
        "ascii" | "us-ascii" => Some(SourceEncoding::Ascii),
        _ => None,
    }
}
