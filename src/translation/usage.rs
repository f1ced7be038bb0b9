/*!
 * Resource usage accounting for translation runs.
 *
 * Counters are opaque accounting units reported by the service. They are
 * summed across chunks and never interpreted (no pricing arithmetic).
 */

use std::ops::AddAssign;
use std::time::{Duration, Instant};

/// Usage reported for one invocation, or accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    /// Input units processed without cache
    pub fresh_input: u64,

    /// Input units served from the prompt cache
    pub cache_read: u64,

    /// Input units written into the prompt cache
    pub cache_write: u64,

    /// Generated output units
    pub output: u64,
}

impl UsageStats {
    pub fn new(fresh_input: u64, cache_read: u64, cache_write: u64, output: u64) -> Self {
        Self { fresh_input, cache_read, cache_write, output }
    }

    /// Add another usage record into this one
    pub fn add(&mut self, other: &UsageStats) {
        self.fresh_input += other.fresh_input;
        self.cache_read += other.cache_read;
        self.cache_write += other.cache_write;
        self.output += other.output;
    }

    /// All input units regardless of cache state
    pub fn total_input(&self) -> u64 {
        self.fresh_input + self.cache_read + self.cache_write
    }

    pub fn total(&self) -> u64 {
        self.total_input() + self.output
    }

    /// Share of input units served from cache, 0.0 when nothing was sent
    pub fn cache_hit_ratio(&self) -> f64 {
        let input = self.total_input();
        if input == 0 {
            0.0
        } else {
            self.cache_read as f64 / input as f64
        }
    }

    /// One-line form used for per-chunk debug logging
    pub fn compact(&self) -> String {
        format!(
            "in={} cache_read={} cache_write={} out={}",
            self.fresh_input, self.cache_read, self.cache_write, self.output
        )
    }
}

impl AddAssign for UsageStats {
    fn add_assign(&mut self, rhs: Self) {
        self.add(&rhs);
    }
}

/// Run-level usage with timing, printed at the end of a translation
#[derive(Debug, Clone)]
pub struct UsageReport {
    /// Summed counters
    pub totals: UsageStats,

    /// Number of invocations that contributed
    pub requests: usize,

    /// Time spent waiting on the service
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,

    start_time: Instant,
}

impl Default for UsageReport {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageReport {
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create a report labelled with provider and model
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            totals: UsageStats::default(),
            requests: 0,
            api_duration: Duration::from_secs(0),
            provider,
            model,
            start_time: Instant::now(),
        }
    }

    /// Record one invocation
    pub fn record(&mut self, usage: &UsageStats, duration: Duration) {
        self.totals.add(usage);
        self.requests += 1;
        self.api_duration += duration;
    }

    /// Output units per minute of service time, falling back to wall time
    pub fn output_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.totals.output as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of usage
    pub fn summary(&self) -> String {
        let elapsed_minutes = self.start_time.elapsed().as_secs_f64() / 60.0;
        let api_minutes = self.api_duration.as_secs_f64() / 60.0;

        format!(
            "Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Requests: {}\n\
             Input tokens: {}\n\
             Cache read tokens: {}\n\
             Cache write tokens: {}\n\
             Output tokens: {}\n\
             Cache hit ratio: {:.1}%\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Output tokens per minute: {:.2}",
            self.provider,
            self.model,
            self.requests,
            self.totals.fresh_input,
            self.totals.cache_read,
            self.totals.cache_write,
            self.totals.output,
            self.totals.cache_hit_ratio() * 100.0,
            elapsed_minutes,
            api_minutes,
            self.output_per_minute()
        )
    }
}
