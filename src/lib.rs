/*!
 * # subchunk - chunked, context-aware subtitle translation
 *
 * A Rust library for translating SRT subtitle files through a large language
 * model while keeping every cue's index and timing intact.
 *
 * ## Features
 *
 * - Lenient SRT parsing with skipped-block diagnostics
 * - Structural validation (index sequence, overlaps, empty text)
 * - Chunking with translated look-behind and source lookahead context
 * - Defensive response parsing with a fallback strategy
 * - Anthropic API client with prompt caching of the style profile
 * - Usage accounting including cache reads and writes
 * - JSON interchange of subtitle documents
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle document model, parsing and validation
 * - `translation`: Chunked translation:
 *   - `translation::chunking`: Windowing engine
 *   - `translation::core`: Invocation interface and retry wrapper
 *   - `translation::parser`: Response parser
 *   - `translation::pipeline`: Reassembly orchestrator
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, ValidationReport};
pub use translation::{ChunkedTranslator, TranslationRun, TranslationService};
pub use language_utils::{normalize_to_part2t, get_language_name};
pub use errors::{ProviderError, SubtitleError, TranslationError};
