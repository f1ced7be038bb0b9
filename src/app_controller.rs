use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleCollection, ValidationReport};
use crate::translation::{
    ChunkPlanner, ChunkTranslator, ChunkedTranslator, RetryingTranslator, StyleProfile,
    StyleProfileLoader, TranslationJob, TranslationRun, TranslationService, UsageReport,
};

// @module: Application controller for subtitle processing

/// Name of the issues log appended to next to translated files
pub const ISSUES_LOG_FILE: &str = "subchunk.issues.log";

/// Result of translating one file
#[derive(Debug)]
pub struct FileTranslation {
    /// Where the translated SRT was written
    pub output_path: PathBuf,
    /// The pipeline run report
    pub run: TranslationRun,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Style profile loader, shared across files of a folder run
    profile_loader: Mutex<StyleProfileLoader>,

    // @field: Whether to load and send the style profile
    use_style_profile: bool,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let profile_loader = Mutex::new(StyleProfileLoader::new(config.style_profile.clone()));
        Ok(Self {
            config,
            profile_loader,
            use_style_profile: true,
        })
    }

    /// Translate without a style profile
    pub fn without_style_profile(mut self) -> Self {
        self.use_style_profile = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the provider-backed translator described by the configuration
    pub fn build_translator(&self) -> Result<RetryingTranslator<TranslationService>> {
        let service = TranslationService::new(self.config.translation.clone())?;
        Ok(RetryingTranslator::new(
            service,
            self.config.translation.common.retry_count,
            self.config.translation.common.retry_backoff_ms,
        ))
    }

    /// Check that the configured provider answers with the configured key
    pub async fn check_connection(&self) -> Result<()> {
        let translator = self.build_translator()?;
        translator.inner().test_connection().await
    }

    /// Run the main workflow on one SRT file
    pub async fn run(&self, input_file: PathBuf, output_file: Option<PathBuf>, force_overwrite: bool) -> Result<FileTranslation> {
        let translator = self.build_translator()?;
        let multi_progress = MultiProgress::new();
        self.run_with_translator(&translator, &input_file, output_file, force_overwrite, &multi_progress).await
    }

    /// Run the workflow on one file with the given translator
    pub async fn run_with_translator<T: ChunkTranslator>(
        &self,
        translator: T,
        input_file: &Path,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
        multi_progress: &MultiProgress,
    ) -> Result<FileTranslation> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Source file not found: {}", input_file.display()));
        }

        let output_path = output_file.unwrap_or_else(|| {
            FileManager::generate_output_path(input_file, &self.config.target_language)
        });
        if output_path.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {} (use -f to force overwrite)",
                output_path.display()
            ));
        }

        info!("Source: {}", input_file.display());
        info!(
            "Target: {} | chunk size {} | overlap {}",
            self.config.target_language.to_uppercase(),
            self.config.chunking.chunk_size,
            self.config.chunking.overlap
        );

        let subtitles = SubtitleCollection::from_srt_file(input_file)?;
        if subtitles.is_empty() {
            return Err(SubtitleError::EmptyDocument)
                .with_context(|| format!("No subtitles found in {}", input_file.display()));
        }
        let report = subtitles.validate();
        Self::log_validation_report(&report);

        let profile = self.load_style_profile().await?;

        let planner = ChunkPlanner::new(self.config.chunking.chunk_size, self.config.chunking.overlap)?;
        let pipeline = ChunkedTranslator::new(translator, planner)?;
        let job = TranslationJob::new(self.config.target_language.clone(), profile.render())
            .with_title(self.config.context_title.clone());

        let total_chunks = planner.chunk_count(subtitles.len()) as u64;
        let progress_bar = multi_progress.add(ProgressBar::new(total_chunks));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        info!(
            "subchunk: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        let pb = progress_bar.clone();
        let run = pipeline
            .translate_document_with_progress(&subtitles, &job, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();
        let run = run?;

        let mut usage = UsageReport::with_provider_info(
            self.config.translation.provider.display_name().to_string(),
            self.config.translation.get_model(),
        );
        for outcome in &run.outcomes {
            usage.record(&outcome.usage, outcome.duration);
        }

        if !run.count_matches() {
            error!(
                "Number of entries changed during translation! Before: {}, After: {}",
                run.input_count,
                run.output.len()
            );
        }

        run.output.write_to_srt(&output_path)?;
        info!("Success: {}", output_path.display());

        if run.chunks_with_warnings() > 0 {
            info!(
                "Translation completed with warnings in {} of {} chunks ({} subtitles kept their original text)",
                run.chunks_with_warnings(),
                run.chunk_count,
                run.reverted().len()
            );
            let log_dir = output_path.parent().unwrap_or_else(|| Path::new("."));
            let log_file = log_dir.join(ISSUES_LOG_FILE);
            let context = format!(
                "{} -> {} - {} ({})",
                input_file.display(),
                output_path.display(),
                self.config.translation.get_model(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            match Self::write_issues_log(&run, &log_file, &context) {
                Ok(()) => info!("Issues written to {}", log_file.display()),
                Err(e) => warn!("Failed to write issues log: {}", e),
            }
        }

        if usage.totals.total() > 0 {
            info!("{}", usage.summary());
        }
        info!("Done in {}", Self::format_duration(start_time.elapsed()));

        Ok(FileTranslation { output_path, run })
    }

    /// Run the workflow on every SRT file of a directory
    /// Files that are translations themselves or already translated are skipped
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let translator = self.build_translator()?;
        self.run_folder_with_translator(&translator, &input_dir, force_overwrite).await
    }

    /// Folder workflow with the given translator
    pub async fn run_folder_with_translator<T: ChunkTranslator>(
        &self,
        translator: T,
        input_dir: &Path,
        force_overwrite: bool,
    ) -> Result<()> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
        }

        let suffix = format!("_{}", self.config.target_language);
        let srt_files: Vec<PathBuf> = FileManager::find_files(input_dir, "srt")?
            .into_iter()
            .filter(|path| {
                !path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().ends_with(&suffix))
                    .unwrap_or(false)
            })
            .collect();

        if srt_files.is_empty() {
            return Err(anyhow!("No SRT files found in directory: {}", input_dir.display()));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(srt_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for srt_file in &srt_files {
            let file_name = srt_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_path = FileManager::generate_output_path(srt_file, &self.config.target_language);
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {}, translation already exists (use -f to force overwrite)", file_name);
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            match self
                .run_with_translator(&translator, srt_file, Some(output_path), force_overwrite, &multi_progress)
                .await
            {
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            success_count, skip_count, error_count
        );

        Ok(())
    }

    /// Parse and validate an SRT file, logging every issue
    pub fn validate_file(input_file: &Path) -> Result<(SubtitleCollection, ValidationReport)> {
        let subtitles = SubtitleCollection::from_srt_file(input_file)?;
        let report = subtitles.validate();
        Self::log_validation_report(&report);
        Ok((subtitles, report))
    }

    /// Convert an SRT file to the JSON interchange document
    pub fn export_json(input_file: &Path, output_file: Option<PathBuf>) -> Result<PathBuf> {
        let subtitles = SubtitleCollection::from_srt_file(input_file)?;
        let output_path = output_file.unwrap_or_else(|| input_file.with_extension("json"));
        let json = subtitles.to_json_string()?;
        FileManager::write_to_file(&output_path, &json)?;
        info!("Wrote {} subtitles to {}", subtitles.len(), output_path.display());
        Ok(output_path)
    }

    /// Convert a JSON interchange document back to SRT
    pub fn import_json(input_file: &Path, output_file: Option<PathBuf>) -> Result<PathBuf> {
        let json = FileManager::read_to_string(input_file)?;
        let subtitles = SubtitleCollection::from_json_str(input_file.to_path_buf(), &json)
            .with_context(|| format!("Failed to read subtitle JSON: {}", input_file.display()))?;
        let output_path = output_file.unwrap_or_else(|| input_file.with_extension("srt"));
        subtitles.write_to_srt(&output_path)?;
        info!("Wrote {} subtitles to {}", subtitles.len(), output_path.display());
        Ok(output_path)
    }

    async fn load_style_profile(&self) -> Result<Arc<StyleProfile>> {
        if !self.use_style_profile {
            return Ok(Arc::new(StyleProfile::empty()));
        }
        let mut loader = self.profile_loader.lock().await;
        loader.load(&self.config.target_language)
    }

    fn log_validation_report(report: &ValidationReport) {
        info!(
            "Found {} subtitles, total duration {:.1} minutes",
            report.entry_count,
            report.total_duration_ms as f64 / 60_000.0
        );
        if report.valid {
            info!("Source subtitles are structurally valid");
        } else {
            warn!("Source subtitles have {} structural issues", report.issues.len());
            for issue in &report.issues {
                warn!("  {}", issue);
            }
        }
    }

    /// Append one section with the chunk warnings of a run to the issues log
    fn write_issues_log(run: &TranslationRun, file_path: &Path, translation_context: &str) -> Result<()> {
        let mut log_content = String::new();

        log_content.push_str(&format!("Translation Log - {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        log_content.push_str(&format!("Context: {}\n\n", translation_context));

        for outcome in run.outcomes.iter().filter(|o| !o.warnings.is_empty()) {
            log_content.push_str(&format!(
                "[CHUNK {}/{}] {} parser, {} subtitles\n",
                outcome.number, run.chunk_count, outcome.strategy, outcome.entry_count
            ));
            for warning in &outcome.warnings {
                log_content.push_str(&format!("[WARN] {}\n", warning));
            }
        }

        log_content.push('\n');

        FileManager::append_to_file(file_path, &log_content)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
