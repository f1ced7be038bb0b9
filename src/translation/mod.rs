/*!
 * Chunked, context-aware subtitle translation.
 *
 * This module is split into several submodules:
 *
 * - `chunking`: Windowing of a document into bounded, context-framed chunks
 * - `core`: The invocation seam toward the text-generation service
 * - `prompts`: Prompt construction for a chunk
 * - `parser`: Defensive parsing of free-text responses
 * - `pipeline`: Sequential orchestration and reassembly
 * - `style_profile`: Loading of the style/terminology profile
 * - `usage`: Usage accounting
 */

// Re-export main types for easier usage
pub use self::chunking::{Chunk, ChunkPlanner, ChunkSpan};
pub use self::core::{ChunkRequest, ChunkResponse, ChunkTranslator, RetryingTranslator, TranslationService};
pub use self::parser::{ParseStrategy, ParsedChunk, ResponseParser};
pub use self::pipeline::{ChunkOutcome, ChunkedTranslator, TranslationJob, TranslationRun};
pub use self::style_profile::{StyleProfile, StyleProfileLoader};
pub use self::usage::{UsageReport, UsageStats};

// Submodules
pub mod chunking;
pub mod core;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod style_profile;
pub mod usage;
