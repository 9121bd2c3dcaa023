//! Source decoding module
//!
//! Works out how a delimited or JSON text file should be read before any
//! analysis happens.
//!
//! # Overview
//!
//! - Encoding detection over a fixed, ordered candidate list
//! - Delimiter sniffing from a short prefix of the decoded text

mod delimiter;
mod encoding;

pub use delimiter::{
    detect_delimiter, DelimiterSniffer, DEFAULT_CANDIDATES, DEFAULT_SAMPLE_CHARS,
    FALLBACK_DELIMITER,
};
pub use encoding::{
    detect_encoding, detect_file_encoding, read_text, TextEncoding, CANDIDATE_ENCODINGS,
};
