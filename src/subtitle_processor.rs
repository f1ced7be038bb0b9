use std::fmt;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};
use serde::{Deserialize, Serialize};
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: Subtitle document model, SRT parsing and structural validation

// @const: Strict SRT timestamp range, anchored at the start of the line
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):([0-5]\d):([0-5]\d),(\d{3})\s*-->\s*(\d{2}):([0-5]\d):([0-5]\d),(\d{3})").unwrap()
});

// @const: Single SRT timestamp
static SINGLE_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):([0-5]\d):([0-5]\d),(\d{3})$").unwrap()
});

// @const: Blank-line block separator
pub(crate) static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number (1-based)
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, possibly multi-line
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry. No invariant is enforced here; see `validate`.
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Copy of this entry with replaced text; index and timing are kept.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num: self.seq_num,
            start_time_ms: self.start_time_ms,
            end_time_ms: self.end_time_ms,
            text: text.into(),
        }
    }

    /// Parse a strict `HH:MM:SS,mmm` timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let caps = SINGLE_TIMESTAMP_REGEX.captures(timestamp.trim())
            .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
        Ok(Self::captures_to_ms(&caps, 1))
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Signed duration; negative when the entry ends before it starts
    pub fn duration_ms(&self) -> i64 {
        self.end_time_ms as i64 - self.start_time_ms as i64
    }

    // Captures are guaranteed to be ASCII digits by the regex
    fn captures_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let part = |offset: usize| -> u64 {
            caps.get(start_idx + offset)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        (part(0) * 3600 + part(1) * 60 + part(2)) * 1000 + part(3)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)
    }
}

/// Result of leniently parsing SRT content
#[derive(Debug, Clone, Default)]
pub struct SrtParseOutcome {
    /// Well-formed entries, in input order
    pub entries: Vec<SubtitleEntry>,

    /// Blocks dropped because the index or timestamp line was malformed
    pub skipped_blocks: usize,
}

/// A single structural problem found by `SubtitleCollection::validate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Entry at 1-based `position` carries `found` instead of `position`
    IndexSequence { position: usize, found: usize },

    /// Entry ends before it starts
    NegativeDuration { seq_num: usize },

    /// Entry ends after the next one starts
    Overlap { seq_num: usize, end: String, next_start: String },

    /// Entry text is blank after trimming
    EmptyText { seq_num: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IndexSequence { position, found } => {
                write!(f, "Subtitle {}: Expected index {}, got {}", position, position, found)
            }
            Self::NegativeDuration { seq_num } => {
                write!(f, "Subtitle {}: Ends before it starts", seq_num)
            }
            Self::Overlap { seq_num, end, next_start } => write!(
                f,
                "Subtitle {}: Overlaps with next subtitle (ends at {}, next starts at {})",
                seq_num, end, next_start
            ),
            Self::EmptyText { seq_num } => write!(f, "Subtitle {}: Empty text", seq_num),
        }
    }
}

/// Structural soundness report. Invalidity is data, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub entry_count: usize,
    /// End time of the last entry, i.e. the running time covered
    pub total_duration_ms: u64,
}

/// Ordered collection of subtitle entries. Insertion order is canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,

    /// Malformed blocks skipped while parsing the source
    pub skipped_blocks: usize,
}

impl SubtitleCollection {
    /// Create a new, empty subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
            skipped_blocks: 0,
        }
    }

    /// Create a collection from already-built entries
    pub fn from_entries(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection {
            source_file,
            entries,
            skipped_blocks: 0,
        }
    }

    /// Parse SRT content into a collection, recording how many blocks were skipped
    pub fn from_srt_string(source_file: PathBuf, content: &str) -> Self {
        let outcome = Self::parse_srt_string(content);
        SubtitleCollection {
            source_file,
            entries: outcome.entries,
            skipped_blocks: outcome.skipped_blocks,
        }
    }

    /// Read and parse an SRT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let collection = Self::from_srt_string(path.to_path_buf(), &content);

        if collection.skipped_blocks > 0 {
            warn!("Skipped {} malformed subtitle block(s) in {:?}", collection.skipped_blocks, path);
        }
        debug!("Parsed {} subtitle entries from {:?}", collection.entries.len(), path);

        Ok(collection)
    }

    /// Parse SRT format string into subtitle entries.
    ///
    /// Blocks are separated by blank lines. A block needs an integer index line,
    /// a strict `HH:MM:SS,mmm --> HH:MM:SS,mmm` line and at least one text line;
    /// anything else is skipped and counted, never an error.
    pub fn parse_srt_string(content: &str) -> SrtParseOutcome {
        let normalized = content.replace("\r\n", "\n");
        let mut outcome = SrtParseOutcome::default();

        for block in BLOCK_SEPARATOR_REGEX.split(normalized.trim()) {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            match Self::parse_block(block) {
                Some(entry) => outcome.entries.push(entry),
                None => {
                    debug!("Skipping malformed subtitle block: {:?}", block.lines().next().unwrap_or(""));
                    outcome.skipped_blocks += 1;
                }
            }
        }

        outcome
    }

    fn parse_block(block: &str) -> Option<SubtitleEntry> {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            return None;
        }

        let seq_num = lines[0].trim().parse::<usize>().ok()?;
        let caps = TIMESTAMP_REGEX.captures(lines[1].trim())?;
        let start_time_ms = SubtitleEntry::captures_to_ms(&caps, 1);
        let end_time_ms = SubtitleEntry::captures_to_ms(&caps, 5);

        let text = lines[2..]
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n");

        Some(SubtitleEntry::new(seq_num, start_time_ms, end_time_ms, text.trim().to_string()))
    }

    /// Render the collection back to SRT, one block per entry, blocks joined by a blank line
    pub fn to_srt_string(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Check ordering, timing and text of every entry
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            let position = i + 1;
            if entry.seq_num != position {
                issues.push(ValidationIssue::IndexSequence { position, found: entry.seq_num });
            }
        }

        for entry in &self.entries {
            if entry.end_time_ms < entry.start_time_ms {
                issues.push(ValidationIssue::NegativeDuration { seq_num: entry.seq_num });
            }
        }

        for pair in self.entries.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.end_time_ms > next.start_time_ms {
                issues.push(ValidationIssue::Overlap {
                    seq_num: current.seq_num,
                    end: current.format_end_time(),
                    next_start: next.format_start_time(),
                });
            }
        }

        for entry in &self.entries {
            if entry.text.trim().is_empty() {
                issues.push(ValidationIssue::EmptyText { seq_num: entry.seq_num });
            }
        }

        ValidationReport {
            valid: issues.is_empty(),
            issues,
            entry_count: self.entries.len(),
            total_duration_ms: self.entries.last().map_or(0, |e| e.end_time_ms),
        }
    }

    /// Serialize to the JSON interchange document
    pub fn to_json_string(&self) -> Result<String> {
        let document = SubtitleJsonDocument {
            source_file: self.source_file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
            subtitle_count: self.entries.len(),
            subtitles: self.entries.iter().map(SubtitleJsonEntry::from).collect(),
        };
        serde_json::to_string_pretty(&document).context("Failed to serialize subtitles to JSON")
    }

    /// Build a collection from the JSON interchange document
    pub fn from_json_str(source_file: PathBuf, json: &str) -> Result<Self, SubtitleError> {
        let document: SubtitleJsonDocument = serde_json::from_str(json)
            .map_err(|e| SubtitleError::InvalidJson(e.to_string()))?;

        let entries = document.subtitles
            .into_iter()
            .map(|sub| -> Result<SubtitleEntry, SubtitleError> {
                Ok(SubtitleEntry::new(
                    sub.index,
                    SubtitleEntry::parse_timestamp(&sub.start_time)?,
                    SubtitleEntry::parse_timestamp(&sub.end_time)?,
                    sub.text.trim().to_string(),
                ))
            })
            .collect::<Result<Vec<_>, SubtitleError>>()?;

        Ok(Self::from_entries(source_file, entries))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// JSON interchange form of a collection
#[derive(Debug, Serialize, Deserialize)]
pub struct SubtitleJsonDocument {
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub subtitle_count: usize,
    pub subtitles: Vec<SubtitleJsonEntry>,
}

/// JSON interchange form of one entry
#[derive(Debug, Serialize, Deserialize)]
pub struct SubtitleJsonEntry {
    pub index: usize,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
    #[serde(default)]
    pub duration_ms: i64,
}

impl From<&SubtitleEntry> for SubtitleJsonEntry {
    fn from(entry: &SubtitleEntry) -> Self {
        Self {
            index: entry.seq_num,
            start_time: entry.format_start_time(),
            end_time: entry.format_end_time(),
            text: entry.text.clone(),
            duration_ms: entry.duration_ms(),
        }
    }
}
