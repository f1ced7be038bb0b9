/*!
 * Windowing of a subtitle document into translation chunks.
 *
 * A document is cut into consecutive, disjoint bodies of at most `chunk_size`
 * entries. Each chunk is framed by up to `overlap` entries on both sides:
 * - previous context: the tail of the already translated output
 * - next context: the upcoming source entries, lookahead only
 *
 * Context entries are never translated or committed as part of the chunk.
 */

use std::ops::Range;

use crate::errors::TranslationError;
use crate::subtitle_processor::SubtitleEntry;

/// Plans chunk spans for a document of a given length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlanner {
    /// Entries per chunk body
    chunk_size: usize,

    /// Context entries on each side of a body
    overlap: usize,
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self { chunk_size: 25, overlap: 3 }
    }
}

impl ChunkPlanner {
    /// Create a planner; a zero chunk size can never make progress and is rejected
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, TranslationError> {
        if chunk_size == 0 {
            return Err(TranslationError::InvalidChunking { chunk_size, overlap });
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Check the caller-side precondition `overlap < chunk_size`
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.overlap >= self.chunk_size {
            return Err(TranslationError::InvalidChunking {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// Number of chunks a document of `len` entries is cut into
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size)
    }

    /// Plan the spans for a document of `len` entries
    pub fn plan(&self, len: usize) -> Vec<ChunkSpan> {
        let total = self.chunk_count(len);
        let mut spans = Vec::with_capacity(total);
        let mut start = 0;

        while start < len {
            let end = (start + self.chunk_size).min(len);
            spans.push(ChunkSpan {
                number: spans.len() + 1,
                total,
                body: start..end,
                previous: start.saturating_sub(self.overlap)..start,
                next: end..(end + self.overlap).min(len),
            });
            start = end;
        }

        spans
    }
}

/// Position of one chunk inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    /// 1-based chunk number
    pub number: usize,

    /// Number of chunks in the plan
    pub total: usize,

    /// Entries translated by this chunk
    pub body: Range<usize>,

    /// Entries shown as already translated context
    pub previous: Range<usize>,

    /// Entries shown as lookahead context
    pub next: Range<usize>,
}

impl ChunkSpan {
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.number == 1
    }

    pub fn is_last(&self) -> bool {
        self.number == self.total
    }

    /// Bind the span to the source document and the translated output so far.
    ///
    /// `translated` holds the committed output of all previous chunks, so the
    /// previous range always lies inside it once earlier chunks are done.
    pub fn materialize<'a>(
        &self,
        source: &'a [SubtitleEntry],
        translated: &'a [SubtitleEntry],
    ) -> Chunk<'a> {
        Chunk {
            number: self.number,
            total: self.total,
            offset: self.body.start,
            entries: source.get(self.body.clone()).unwrap_or_default(),
            previous_context: translated.get(self.previous.clone()).unwrap_or_default(),
            next_context: source.get(self.next.clone()).unwrap_or_default(),
        }
    }
}

/// A chunk ready to be sent for translation
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// 1-based chunk number
    pub number: usize,

    /// Number of chunks in the run
    pub total: usize,

    /// Position of the first body entry in the source document
    pub offset: usize,

    /// Body entries to translate
    pub entries: &'a [SubtitleEntry],

    /// Tail of the translated output, for continuity
    pub previous_context: &'a [SubtitleEntry],

    /// Upcoming source entries, for flow
    pub next_context: &'a [SubtitleEntry],
}

impl Chunk<'_> {
    /// 1-based positions of the first and last body entries
    pub fn position_range(&self) -> (usize, usize) {
        (self.offset + 1, self.offset + self.entries.len())
    }

    /// Subtitle numbers of the first and last body entries
    pub fn seq_range(&self) -> Option<(usize, usize)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.seq_num, last.seq_num)),
            _ => None,
        }
    }
}
