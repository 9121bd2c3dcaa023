//! Text encoding detection
//!
//! Candidate encodings are tried in a fixed order and the first one that
//! decodes the whole input wins.

use crate::error::{Error, Result};
use encoding_rs::{UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Encodings understood by the file analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "utf-8-sig")]
    Utf8Sig,
    #[serde(rename = "latin-1")]
    Latin1,
    #[serde(rename = "cp1252")]
    Windows1252,
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
}

/// Probe order used by [`detect_encoding`]
pub const CANDIDATE_ENCODINGS: [TextEncoding; 5] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
    TextEncoding::Iso8859_1,
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextEncoding {
    /// Label reported in analysis output
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "cp1252",
            TextEncoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decode `bytes` strictly, returning `None` on any malformed sequence.
    ///
    /// Plain UTF-8 keeps a leading byte-order mark as U+FEFF; `utf-8-sig`
    /// drops it.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
            TextEncoding::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(TextEncoding::Utf8Sig),
            "latin-1" | "latin1" | "l1" => Ok(TextEncoding::Latin1),
            "cp1252" | "windows-1252" => Ok(TextEncoding::Windows1252),
            "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Iso8859_1),
            other => Err(Error::invalid_value(
                "encoding",
                format!("unsupported encoding '{other}'"),
            )),
        }
    }
}

/// Pick the first candidate encoding that decodes all of `bytes`
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    CANDIDATE_ENCODINGS
        .iter()
        .copied()
        .find(|encoding| encoding.decode(bytes).is_some())
        .unwrap_or_default()
}

/// Detect the encoding of a file on disk
pub fn detect_file_encoding(path: impl AsRef<Path>) -> Result<TextEncoding> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(detect_encoding(&bytes))
}

/// Read a file and decode it, detecting the encoding unless one is given.
///
/// A forced encoding that cannot decode the file is an error.
pub fn read_text(
    path: impl AsRef<Path>,
    forced: Option<TextEncoding>,
) -> Result<(String, TextEncoding)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let encoding = forced.unwrap_or_else(|| detect_encoding(&bytes));

    let text = encoding.decode(&bytes).ok_or_else(|| {
        Error::validation(format!(
            "File '{}' cannot be decoded as {encoding}",
            path.display()
        ))
    })?;

    tracing::debug!(path = %path.display(), encoding = %encoding, "Decoded source file");
    Ok((text, encoding))
}
