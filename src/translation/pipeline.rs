/*!
 * Sequential chunked translation of a whole document.
 *
 * Chunks are processed strictly in order because the previous context of a
 * chunk is drawn from the translated output of the chunks before it. The
 * output is only ever appended to. An invocation failure aborts the run;
 * every other problem is recovered by the parser and reported in the run.
 */

use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::errors::TranslationError;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::translation::chunking::ChunkPlanner;
use crate::translation::core::{ChunkRequest, ChunkTranslator};
use crate::translation::parser::{ParseStrategy, ResponseParser};
use crate::translation::usage::UsageStats;

/// Per-run parameters passed through to every chunk request
#[derive(Debug, Clone, Default)]
pub struct TranslationJob {
    /// Target language code
    pub target_language: String,

    /// Rendered style profile
    pub style_profile: String,

    /// Optional title of the content
    pub title: Option<String>,
}

impl TranslationJob {
    pub fn new(target_language: impl Into<String>, style_profile: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            style_profile: style_profile.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOutcome {
    /// 1-based chunk number
    pub number: usize,

    /// Number of body entries
    pub entry_count: usize,

    /// Parser strategy that produced the entries
    pub strategy: ParseStrategy,

    /// Parse discrepancies
    pub warnings: Vec<String>,

    /// Indices that kept their original text
    pub reverted: Vec<usize>,

    /// Usage reported for the chunk
    pub usage: UsageStats,

    /// Time spent in the invocation
    pub duration: Duration,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct TranslationRun {
    /// Translated document, one entry per input entry
    pub output: SubtitleCollection,

    /// Usage summed over all chunks
    pub usage: UsageStats,

    /// Number of chunks processed
    pub chunk_count: usize,

    /// Per-chunk outcomes in order
    pub outcomes: Vec<ChunkOutcome>,

    /// Number of input entries
    pub input_count: usize,
}

impl TranslationRun {
    /// Whether the output has exactly as many entries as the input
    pub fn count_matches(&self) -> bool {
        self.output.len() == self.input_count
    }

    /// All indices that kept their original text
    pub fn reverted(&self) -> Vec<usize> {
        self.outcomes.iter().flat_map(|o| o.reverted.iter().copied()).collect()
    }

    /// Number of chunks that needed the fallback parser
    pub fn fallback_chunks(&self) -> usize {
        self.outcomes.iter().filter(|o| o.strategy == ParseStrategy::Fallback).count()
    }

    /// Number of chunks with at least one parse warning
    pub fn chunks_with_warnings(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.warnings.is_empty()).count()
    }
}

/// Orchestrates planning, invocation, parsing and reassembly
#[derive(Debug)]
pub struct ChunkedTranslator<T> {
    translator: T,
    planner: ChunkPlanner,
    parser: ResponseParser,
}

impl<T: ChunkTranslator> ChunkedTranslator<T> {
    /// Create an orchestrator; the planner must satisfy `overlap < chunk_size`
    pub fn new(translator: T, planner: ChunkPlanner) -> Result<Self, TranslationError> {
        planner.validate()?;
        Ok(Self {
            translator,
            planner,
            parser: ResponseParser::new(),
        })
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn planner(&self) -> &ChunkPlanner {
        &self.planner
    }

    /// Translate a document without progress reporting
    pub async fn translate_document(
        &self,
        document: &SubtitleCollection,
        job: &TranslationJob,
    ) -> Result<TranslationRun, TranslationError> {
        self.translate_document_with_progress(document, job, |_, _| {}).await
    }

    /// Translate a document, calling `progress_callback(completed, total)` after each chunk
    pub async fn translate_document_with_progress<F>(
        &self,
        document: &SubtitleCollection,
        job: &TranslationJob,
        progress_callback: F,
    ) -> Result<TranslationRun, TranslationError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let source = &document.entries;
        let spans = self.planner.plan(source.len());
        let total = spans.len();

        info!(
            "Translating {} subtitles in {} chunks (chunk size {}, overlap {})",
            source.len(),
            total,
            self.planner.chunk_size(),
            self.planner.overlap()
        );

        let mut output: Vec<SubtitleEntry> = Vec::with_capacity(source.len());
        let mut outcomes = Vec::with_capacity(total);
        let mut usage = UsageStats::default();

        for span in &spans {
            let chunk = span.materialize(source, &output);
            let request = ChunkRequest::new(chunk, &job.target_language, &job.style_profile)
                .with_title(job.title.as_deref());

            debug!(
                "Translating chunk {}/{} ({} subtitles, {} previous, {} upcoming)",
                span.number,
                total,
                chunk.entries.len(),
                chunk.previous_context.len(),
                chunk.next_context.len()
            );

            let start_time = Instant::now();
            let response = self.translator.translate_chunk(&request).await.map_err(|source| {
                error!("Translation of chunk {}/{} failed: {}", span.number, total, source);
                TranslationError::ChunkFailed {
                    chunk_number: span.number,
                    total_chunks: total,
                    source,
                }
            })?;
            let duration = start_time.elapsed();

            let parsed = self.parser.parse(&response.raw_text, chunk.entries);
            if parsed.strategy == ParseStrategy::Fallback {
                warn!("Chunk {}/{} parsed with fallback strategy", span.number, total);
            }
            debug!("Chunk {}/{} usage: {}", span.number, total, response.usage.compact());

            usage += response.usage;
            outcomes.push(ChunkOutcome {
                number: span.number,
                entry_count: chunk.entries.len(),
                strategy: parsed.strategy,
                warnings: parsed.warnings,
                reverted: parsed.reverted,
                usage: response.usage,
                duration,
            });
            output.extend(parsed.entries);

            progress_callback(span.number, total);
        }

        let run = TranslationRun {
            output: SubtitleCollection::from_entries(document.source_file.clone(), output),
            usage,
            chunk_count: total,
            outcomes,
            input_count: source.len(),
        };

        if run.count_matches() {
            info!("Translation complete: {} subtitles", run.output.len());
        } else {
            warn!(
                "Subtitle count mismatch: {} in, {} out",
                run.input_count,
                run.output.len()
            );
        }

        Ok(run)
    }
}
