//! Delimiter sniffing for CSV-like text
//!
//! Runs the csv-nose dialect sniffer over a short prefix of the text and
//! accepts the result only when it is one of the known separators.

use csv_nose::{SampleSize, Sniffer};
use std::io::Cursor;
use tracing::debug;

/// Default number of characters inspected
pub const DEFAULT_SAMPLE_CHARS: usize = 1024;

/// Separator used when sniffing is inconclusive
pub const FALLBACK_DELIMITER: u8 = b',';

/// Separators the sniffer may report
pub const DEFAULT_CANDIDATES: [u8; 5] = [b',', b';', b'\t', b'|', b':'];

/// Dialect sniffer restricted to a set of candidate separators
#[derive(Debug, Clone)]
pub struct DelimiterSniffer {
    candidates: Vec<u8>,
    sample_chars: usize,
}

impl Default for DelimiterSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimiterSniffer {
    /// Create a sniffer with the default candidates and sample size
    pub fn new() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.to_vec(),
            sample_chars: DEFAULT_SAMPLE_CHARS,
        }
    }

    /// Replace the accepted separators
    #[must_use]
    pub fn with_candidates(mut self, candidates: &[u8]) -> Self {
        self.candidates = candidates.to_vec();
        self
    }

    /// Set how many characters of the input are inspected
    #[must_use]
    pub fn with_sample_chars(mut self, sample_chars: usize) -> Self {
        self.sample_chars = sample_chars.max(1);
        self
    }

    /// Sniff the delimiter, or `None` when the sniffer fails or reports a
    /// separator outside the candidates
    pub fn sniff(&self, text: &str) -> Option<u8> {
        let sample = self.sample(text);
        if sample.trim().is_empty() {
            return None;
        }

        let mut sniffer = Sniffer::new();
        sniffer.sample_size(SampleSize::Bytes(sample.len()));

        match sniffer.sniff_reader(Cursor::new(sample.as_bytes())) {
            Ok(metadata) => {
                let delimiter = metadata.dialect.delimiter;
                if self.candidates.contains(&delimiter) {
                    Some(delimiter)
                } else {
                    debug!(delimiter = %char::from(delimiter), "Sniffed delimiter not accepted");
                    None
                }
            }
            Err(e) => {
                debug!(error = %e, "Delimiter sniffing failed");
                None
            }
        }
    }

    /// Sniff the delimiter, falling back to a comma
    pub fn detect(&self, text: &str) -> u8 {
        self.sniff(text).unwrap_or(FALLBACK_DELIMITER)
    }

    /// The inspected prefix, cut back to the last complete line when truncated
    fn sample<'a>(&self, text: &'a str) -> &'a str {
        let cut = text
            .char_indices()
            .nth(self.sample_chars)
            .map_or(text.len(), |(idx, _)| idx);
        let sample = &text[..cut];
        if cut == text.len() {
            return sample;
        }
        match sample.rfind('\n') {
            Some(end) if end > 0 => &sample[..=end],
            _ => sample,
        }
    }
}

/// Sniff the delimiter of `text` with default settings, falling back to a comma
pub fn detect_delimiter(text: &str) -> u8 {
    DelimiterSniffer::new().detect(text)
}
