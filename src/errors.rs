/*!
 * Error types for the subchunk application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Only `TranslationError::ChunkFailed` (and the provider errors it wraps) is
 * fatal for a pipeline run. Data-quality problems such as validation issues or
 * parse mismatches are reported as data and never surface here.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a retry has any chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::RequestFailed(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The document contains no usable entries
    #[error("No valid subtitle entries were found")]
    EmptyDocument,

    /// A timestamp did not match HH:MM:SS,mmm
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The JSON interchange document could not be read
    #[error("Invalid subtitle JSON document: {0}")]
    InvalidJson(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The invocation for a chunk failed; the run is aborted
    #[error("Translation of chunk {chunk_number}/{total_chunks} failed: {source}")]
    ChunkFailed {
        /// 1-based chunk number
        chunk_number: usize,
        /// Number of chunks in the run
        total_chunks: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// Chunking parameters violate `chunk_size >= 1` and `overlap < chunk_size`
    #[error("Invalid chunking parameters: chunk_size={chunk_size}, overlap={overlap}")]
    InvalidChunking {
        /// Entries per chunk body
        chunk_size: usize,
        /// Context entries on each side
        overlap: usize,
    },
}
