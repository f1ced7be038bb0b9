/*!
 * Common test utilities for the subchunk test suite
 */

use anyhow::Result;
use indicatif::{MultiProgress, ProgressDrawTarget};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subchunk::app_config::Config;
use subchunk::subtitle_processor::{SubtitleCollection, SubtitleEntry};

/// Routes library logs to the test output, once per process
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds `count` well-formed entries, 2s apart, texts `Line 1`..`Line count`
pub fn sample_entries(count: usize) -> Vec<SubtitleEntry> {
    (1..=count)
        .map(|i| {
            let start = i as u64 * 2000;
            SubtitleEntry::new(i, start, start + 1500, format!("Line {}", i))
        })
        .collect()
}

/// Builds a collection of `count` sample entries
pub fn sample_document(count: usize) -> SubtitleCollection {
    SubtitleCollection::from_entries(PathBuf::from("sample.srt"), sample_entries(count))
}

/// Renders `count` sample entries as SRT text
pub fn sample_srt(count: usize) -> String {
    sample_document(count).to_srt_string()
}

/// Creates an SRT file with `count` sample entries
pub fn create_test_subtitle(dir: &Path, filename: &str, count: usize) -> Result<PathBuf> {
    create_test_file(dir, filename, &sample_srt(count))
}

/// Config usable without network or environment
pub fn test_config(target_language: &str) -> Config {
    let mut config = Config::default();
    config.target_language = target_language.to_string();
    config.translation.active_provider_config_mut().api_key = "test-key".to_string();
    config
}

/// Progress container that draws nothing
pub fn hidden_progress() -> MultiProgress {
    MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
}
