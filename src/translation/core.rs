/*!
 * Core translation invocation types.
 *
 * `ChunkTranslator` is the seam between the pipeline and the external
 * text-generation service. The pipeline only ever sees raw response text and
 * usage counters; prompt layout and HTTP mechanics live behind the trait.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error, warn};
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest, ContentBlock};
use crate::translation::chunking::Chunk;
use crate::translation::prompts::ChunkPrompt;
use crate::translation::usage::UsageStats;

/// Everything needed to translate one chunk
#[derive(Debug, Clone, Copy)]
pub struct ChunkRequest<'a> {
    /// Body entries and their context
    pub chunk: Chunk<'a>,

    /// Target language code
    pub target_language: &'a str,

    /// Rendered style profile, passed through untouched
    pub style_profile: &'a str,

    /// Optional title of the content, e.g. the video name
    pub title: Option<&'a str>,
}

impl<'a> ChunkRequest<'a> {
    pub fn new(chunk: Chunk<'a>, target_language: &'a str, style_profile: &'a str) -> Self {
        Self {
            chunk,
            target_language,
            style_profile,
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<&'a str>) -> Self {
        self.title = title;
        self
    }
}

/// Raw service answer for a chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkResponse {
    /// Unparsed response text
    pub raw_text: String,

    /// Usage reported for the call
    pub usage: UsageStats,
}

impl ChunkResponse {
    pub fn new(raw_text: impl Into<String>, usage: UsageStats) -> Self {
        Self { raw_text: raw_text.into(), usage }
    }
}

/// Contract toward the text-generation service
///
/// A returned error is fatal for the pipeline run.
#[async_trait]
pub trait ChunkTranslator: Send + Sync {
    /// Translate one chunk, returning the raw response and its usage
    async fn translate_chunk(&self, request: &ChunkRequest<'_>) -> Result<ChunkResponse, ProviderError>;
}

#[async_trait]
impl<T: ChunkTranslator + ?Sized> ChunkTranslator for Box<T> {
    async fn translate_chunk(&self, request: &ChunkRequest<'_>) -> Result<ChunkResponse, ProviderError> {
        (**self).translate_chunk(request).await
    }
}

#[async_trait]
impl<T: ChunkTranslator + ?Sized> ChunkTranslator for &T {
    async fn translate_chunk(&self, request: &ChunkRequest<'_>) -> Result<ChunkResponse, ProviderError> {
        (**self).translate_chunk(request).await
    }
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Provider-backed chunk translator
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let provider = match config.provider {
            TranslationProvider::Anthropic => {
                let api_key = config.get_api_key();
                if api_key.is_empty() {
                    return Err(anyhow!("Anthropic API key is not configured"));
                }
                TranslationProviderImpl::Anthropic {
                    client: Anthropic::new_with_timeout(
                        api_key,
                        config.get_endpoint(),
                        config.get_timeout_secs(),
                    ),
                }
            }
        };

        Ok(Self { provider, config })
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        match &self.provider {
            TranslationProviderImpl::Anthropic { client } => client
                .test_connection()
                .await
                .map_err(|e| anyhow!("Failed to connect to Anthropic API: {}", e)),
        }
    }
}

#[async_trait]
impl ChunkTranslator for TranslationService {
    async fn translate_chunk(&self, request: &ChunkRequest<'_>) -> Result<ChunkResponse, ProviderError> {
        let prompt = ChunkPrompt::build(request);
        let start_time = Instant::now();

        match &self.provider {
            TranslationProviderImpl::Anthropic { client } => {
                let mut blocks = Vec::with_capacity(2);
                if !prompt.profile.trim().is_empty() {
                    blocks.push(ContentBlock::cached_text(prompt.profile));
                }
                blocks.push(ContentBlock::text(prompt.instructions));

                let api_request = AnthropicRequest::new(self.config.get_model(), self.config.common.max_tokens)
                    .system(prompt.system)
                    .temperature(self.config.common.temperature)
                    .add_blocks("user", blocks);

                let response = client.complete(api_request).await.inspect_err(|e| {
                    error!("Translation failed for chunk {}: {}", request.chunk.number, e);
                })?;

                let usage = UsageStats::new(
                    response.usage.input_tokens,
                    response.usage.cache_read_input_tokens,
                    response.usage.cache_creation_input_tokens,
                    response.usage.output_tokens,
                );
                debug!(
                    "Chunk {}/{} answered in {:?}: {}",
                    request.chunk.number,
                    request.chunk.total,
                    start_time.elapsed(),
                    usage.compact()
                );

                Ok(ChunkResponse::new(Anthropic::extract_text(&response), usage))
            }
        }
    }
}

/// Bounded retry wrapper around another translator
///
/// Retries only errors that can succeed on a second attempt, with exponential
/// backoff. With `retry_count == 0` the first failure is returned as is.
#[derive(Debug)]
pub struct RetryingTranslator<T> {
    inner: T,
    retry_count: u32,
    backoff_base_ms: u64,
}

impl<T: ChunkTranslator> RetryingTranslator<T> {
    pub fn new(inner: T, retry_count: u32, backoff_base_ms: u64) -> Self {
        Self { inner, retry_count, backoff_base_ms }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Backoff before retry number `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

#[async_trait]
impl<T: ChunkTranslator> ChunkTranslator for RetryingTranslator<T> {
    async fn translate_chunk(&self, request: &ChunkRequest<'_>) -> Result<ChunkResponse, ProviderError> {
        let mut attempt = 0;

        loop {
            match self.inner.translate_chunk(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry_count && e.is_retryable() => {
                    attempt += 1;
                    let backoff = self.backoff(attempt);
                    warn!(
                        "Chunk {} failed ({}), retry {}/{} in {:?}",
                        request.chunk.number, e, attempt, self.retry_count, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
