/*!
 * Parsing of free-text translation responses back into subtitle entries.
 *
 * Two strategies are tried in order:
 * - primary: `[index] start --> end` headers, each followed by a body running
 *   up to the next `[index]` marker or the end of the response
 * - fallback: blank-line separated blocks with marker and timestamp lines removed
 *
 * Whatever the response looks like, the result has exactly one entry per
 * original entry, in the original order. Index and timing always come from the
 * original entry; only the text is taken from the response. Entries without a
 * usable translation keep their original text and are reported.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::subtitle_processor::{SubtitleEntry, BLOCK_SEPARATOR_REGEX};

// @const: Echoed entry header `[index] start --> end` followed by a newline
static HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+)\]\s*(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})\s*\n").unwrap()
});

// @const: Any `[index]` marker, ends the body of the previous header
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d+\]").unwrap()
});

// @const: Marker at the start of a line
static LEADING_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\d+\]").unwrap()
});

/// Strategy that produced a parsed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Marker/timestamp headers were found
    Primary,
    /// No header matched; blank-line blocks were used
    Fallback,
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// One header match found by the primary strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoedEntry {
    /// Index as echoed by the service
    pub seq_num: Option<usize>,
    /// Start timestamp as echoed
    pub start: String,
    /// End timestamp as echoed
    pub end: String,
    /// Trimmed body text
    pub text: String,
}

/// Result of parsing one chunk response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChunk {
    /// One entry per original entry, same order
    pub entries: Vec<SubtitleEntry>,

    /// Strategy that produced the entries
    pub strategy: ParseStrategy,

    /// Human-readable discrepancies found while parsing
    pub warnings: Vec<String>,

    /// Indices of entries that kept their original text
    pub reverted: Vec<usize>,
}

impl ParsedChunk {
    /// Whether every entry got a translation from the response
    pub fn is_complete(&self) -> bool {
        self.reverted.is_empty()
    }
}

/// Parser for translation responses
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a response against the original entries of the chunk
    pub fn parse(&self, response: &str, originals: &[SubtitleEntry]) -> ParsedChunk {
        let normalized = response.replace("\r\n", "\n");

        let echoed = Self::extract_echoed(&normalized);
        if echoed.is_empty() {
            if !originals.is_empty() {
                warn!("No marked subtitles found in response, using fallback parsing");
            }
            return Self::parse_fallback(&normalized, originals);
        }

        Self::align_primary(echoed, originals)
    }

    /// Scan the response for `[index] start --> end` headers and their bodies
    pub fn extract_echoed(response: &str) -> Vec<EchoedEntry> {
        let mut echoed = Vec::new();
        let mut pos = 0;

        while let Some(caps) = HEADER_REGEX.captures_at(response, pos) {
            let Some(header) = caps.get(0) else { break };
            let body_start = header.end();
            let body_end = MARKER_REGEX
                .find_at(response, body_start)
                .map_or(response.len(), |m| m.start());

            echoed.push(EchoedEntry {
                seq_num: caps[1].parse().ok(),
                start: caps[2].to_string(),
                end: caps[3].to_string(),
                text: response[body_start..body_end].trim().to_string(),
            });

            pos = body_end;
        }

        echoed
    }

    fn align_primary(mut echoed: Vec<EchoedEntry>, originals: &[SubtitleEntry]) -> ParsedChunk {
        let mut warnings = Vec::new();
        let mut reverted = Vec::new();

        if echoed.len() != originals.len() {
            let message = format!("Expected {} subtitles, got {}", originals.len(), echoed.len());
            warn!("{}", message);
            warnings.push(message);
        }
        echoed.truncate(originals.len());

        let mut entries = Vec::with_capacity(originals.len());
        for (position, original) in originals.iter().enumerate() {
            match echoed.get(position) {
                Some(found) if !found.text.is_empty() => {
                    if found.seq_num != Some(original.seq_num) {
                        let message = format!(
                            "Response entry {} echoed index {}, expected {}",
                            position + 1,
                            found.seq_num.map_or_else(|| "?".to_string(), |n| n.to_string()),
                            original.seq_num
                        );
                        debug!("{}", message);
                        warnings.push(message);
                    }
                    entries.push(original.with_text(found.text.as_str()));
                }
                Some(_) => {
                    let message = format!("Empty translation for subtitle {}, keeping original", original.seq_num);
                    warn!("{}", message);
                    warnings.push(message);
                    reverted.push(original.seq_num);
                    entries.push(original.clone());
                }
                None => {
                    let message = format!("No translation for subtitle {}, keeping original", original.seq_num);
                    warn!("{}", message);
                    warnings.push(message);
                    reverted.push(original.seq_num);
                    entries.push(original.clone());
                }
            }
        }

        ParsedChunk { entries, strategy: ParseStrategy::Primary, warnings, reverted }
    }

    /// Blank-line blocks with marker and timestamp lines stripped, empty ones dropped
    ///
    /// A bare index line directly above a timestamp line counts as a marker,
    /// so plain SRT echoed back by the model yields only the text.
    pub fn fallback_blocks(response: &str) -> Vec<String> {
        BLOCK_SEPARATOR_REGEX
            .split(response)
            .map(|block| {
                let lines: Vec<&str> = block.lines().collect();
                lines
                    .iter()
                    .enumerate()
                    .filter(|&(i, line)| {
                        let index_line = Self::is_bare_index(line)
                            && lines.get(i + 1).is_some_and(|next| next.contains("-->"));
                        !line.contains("-->") && !LEADING_MARKER_REGEX.is_match(line) && !index_line
                    })
                    .map(|(_, line)| *line)
                    .collect::<Vec<_>>()
                    .join("\n")
                    .trim()
                    .to_string()
            })
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn is_bare_index(line: &str) -> bool {
        let trimmed = line.trim();
        !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
    }

    fn parse_fallback(response: &str, originals: &[SubtitleEntry]) -> ParsedChunk {
        let blocks = Self::fallback_blocks(response);
        let mut warnings = Vec::new();
        let mut reverted = Vec::new();

        if !originals.is_empty() {
            warnings.push(format!(
                "Fallback parsing used: {} text blocks for {} subtitles",
                blocks.len(),
                originals.len()
            ));
        }

        let mut entries = Vec::with_capacity(originals.len());
        for (position, original) in originals.iter().enumerate() {
            match blocks.get(position) {
                Some(text) => entries.push(original.with_text(text.as_str())),
                None => {
                    let message = format!("No translation for subtitle {}, keeping original", original.seq_num);
                    warn!("{}", message);
                    warnings.push(message);
                    reverted.push(original.seq_num);
                    entries.push(original.clone());
                }
            }
        }

        ParsedChunk { entries, strategy: ParseStrategy::Fallback, warnings, reverted }
    }
}
