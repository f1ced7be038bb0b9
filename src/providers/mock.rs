/*!
 * Mock chunk translators for testing.
 *
 * Each behavior reproduces a way the real service answers:
 * - `MockTranslator::echo()` - well-formed echo of every entry
 * - `MockTranslator::corrupted()` - echo with renumbered indices and shifted timestamps
 * - `MockTranslator::dropping(n)` - echo missing the last `n` entries
 * - `MockTranslator::prose_only()` - translated text blocks without any marker
 * - `MockTranslator::empty()` - empty response
 * - `MockTranslator::intermittent(n)` / `failing()` - invocation errors
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::subtitle_processor::SubtitleEntry;
use crate::translation::core::{ChunkRequest, ChunkResponse, ChunkTranslator};
use crate::translation::usage::UsageStats;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echoes every body entry in the expected format
    Echo,
    /// Echoes with wrong indices and timestamps
    Corrupted,
    /// Omits the last `count` entries of each chunk
    Dropping { count: usize },
    /// Answers with blank-line separated prose, no markers
    ProseOnly,
    /// Answers with nothing
    Empty,
    /// Fails the first `failures` calls, then echoes
    Intermittent { failures: usize },
    /// Always fails with an error
    Failing,
}

/// What the mock saw for one call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Chunk number
    pub chunk_number: usize,
    /// Indices of the body entries
    pub body: Vec<usize>,
    /// Texts of the previous context
    pub previous_context: Vec<String>,
    /// Texts of the next context
    pub next_context: Vec<String>,
    /// Target language
    pub target_language: String,
}

/// Scripted chunk translator
#[derive(Debug, Clone)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Call counter, shared between clones
    call_count: Arc<AtomicUsize>,
    /// Requests seen so far, shared between clones
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn corrupted() -> Self {
        Self::new(MockBehavior::Corrupted)
    }

    pub fn dropping(count: usize) -> Self {
        Self::new(MockBehavior::Dropping { count })
    }

    pub fn prose_only() -> Self {
        Self::new(MockBehavior::ProseOnly)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn intermittent(failures: usize) -> Self {
        Self::new(MockBehavior::Intermittent { failures })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Shared call counter
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }

    /// Snapshot of the requests seen so far
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The text the mock produces for an entry
    pub fn translated_text(entry: &SubtitleEntry, target_language: &str) -> String {
        format!("<{}> {}", target_language.to_uppercase(), entry.text)
    }

    /// Well-formed echo of entries
    pub fn generate_echo(entries: &[SubtitleEntry], target_language: &str) -> String {
        entries
            .iter()
            .map(|e| {
                format!(
                    "[{}] {} --> {}\n{}",
                    e.seq_num,
                    e.format_start_time(),
                    e.format_end_time(),
                    Self::translated_text(e, target_language)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn generate_corrupted(entries: &[SubtitleEntry], target_language: &str) -> String {
        let body = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                format!(
                    "[{}] {} --> {}\n{}",
                    100 + i,
                    SubtitleEntry::format_timestamp(e.start_time_ms + 61_000),
                    SubtitleEntry::format_timestamp(e.end_time_ms + 61_000),
                    Self::translated_text(e, target_language)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("Sure! Here are the translated subtitles:\n\n{}\n\nLet me know if you need changes.", body)
    }

    fn generate_prose(entries: &[SubtitleEntry], target_language: &str) -> String {
        entries
            .iter()
            .map(|e| Self::translated_text(e, target_language))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn usage_for(call: usize, entries: usize) -> UsageStats {
        let entries = entries as u64;
        if call == 0 {
            UsageStats::new(20 * entries, 0, 1000, 10 * entries)
        } else {
            UsageStats::new(20 * entries, 1000, 0, 10 * entries)
        }
    }

    fn record(&self, request: &ChunkRequest<'_>) {
        let chunk = &request.chunk;
        let texts = |entries: &[SubtitleEntry]| -> Vec<String> { entries.iter().map(|e| e.text.clone()).collect() };
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(RecordedRequest {
                chunk_number: chunk.number,
                body: chunk.entries.iter().map(|e| e.seq_num).collect(),
                previous_context: texts(chunk.previous_context),
                next_context: texts(chunk.next_context),
                target_language: request.target_language.to_string(),
            });
        }
    }
}

#[async_trait]
impl ChunkTranslator for MockTranslator {
    async fn translate_chunk(&self, request: &ChunkRequest<'_>) -> Result<ChunkResponse, ProviderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.record(request);

        let entries = request.chunk.entries;
        let language = request.target_language;
        let usage = Self::usage_for(call, entries.len());

        let text = match self.behavior {
            MockBehavior::Echo => Self::generate_echo(entries, language),
            MockBehavior::Corrupted => Self::generate_corrupted(entries, language),
            MockBehavior::Dropping { count } => {
                let keep = entries.len().saturating_sub(count);
                Self::generate_echo(&entries[..keep], language)
            }
            MockBehavior::ProseOnly => Self::generate_prose(entries, language),
            MockBehavior::Empty => String::new(),
            MockBehavior::Intermittent { failures } => {
                if call < failures {
                    return Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", call + 1),
                        status_code: 503,
                    });
                }
                Self::generate_echo(entries, language)
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                })
            }
        };

        Ok(ChunkResponse::new(text, usage))
    }
}
