/*!
 * Integration tests for the file-level subtitle workflows
 */

use anyhow::Result;
use std::fs;

use subchunk::app_controller::{Controller, ISSUES_LOG_FILE};
use subchunk::file_utils::FileManager;
use subchunk::providers::mock::MockTranslator;
use subchunk::subtitle_processor::SubtitleCollection;
use subchunk::{SubtitleError, TranslationError};

use crate::common;

fn controller(target_language: &str) -> Result<Controller> {
    common::init_test_logging();
    Ok(Controller::with_config(common::test_config(target_language))?.without_style_profile())
}

#[tokio::test]
async fn test_run_withEchoTranslator_shouldWriteTranslatedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 30)?;

    let result = controller("es")?
        .run_with_translator(MockTranslator::echo(), &input, None, false, &common::hidden_progress())
        .await?;

    assert_eq!(result.output_path, temp_dir.path().join("talk_es.srt"));
    let translated = SubtitleCollection::from_srt_file(&result.output_path)?;
    let original = SubtitleCollection::from_srt_file(&input)?;
    assert_eq!(translated.len(), 30);
    for (out, orig) in translated.entries.iter().zip(&original.entries) {
        assert_eq!(out.seq_num, orig.seq_num);
        assert_eq!(out.start_time_ms, orig.start_time_ms);
        assert_eq!(out.end_time_ms, orig.end_time_ms);
        assert_eq!(out.text, format!("<ES> {}", orig.text));
    }
    assert!(!temp_dir.path().join(ISSUES_LOG_FILE).exists());
    Ok(())
}

#[tokio::test]
async fn test_run_existingOutput_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 3)?;
    let output = common::create_test_file(temp_dir.path(), "talk_fr.srt", "keep me")?;
    let controller = controller("fr")?;
    let progress = common::hidden_progress();

    let refused = controller
        .run_with_translator(MockTranslator::echo(), &input, None, false, &progress)
        .await;
    assert!(refused.is_err());
    assert_eq!(fs::read_to_string(&output)?, "keep me");

    controller
        .run_with_translator(MockTranslator::echo(), &input, None, true, &progress)
        .await?;
    assert!(fs::read_to_string(&output)?.contains("<FR> Line 1"));
    Ok(())
}

#[tokio::test]
async fn test_run_withDroppedEntries_shouldWriteIssuesLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 8)?;
    let output = temp_dir.path().join("out").join("talk.es.srt");

    let result = controller("es")?
        .run_with_translator(MockTranslator::dropping(1), &input, Some(output.clone()), false, &common::hidden_progress())
        .await?;

    assert_eq!(result.output_path, output);
    assert_eq!(result.run.reverted().len(), 1);
    let log = fs::read_to_string(temp_dir.path().join("out").join(ISSUES_LOG_FILE))?;
    assert!(log.contains("[CHUNK 1/1] primary parser, 8 subtitles"));
    assert!(log.contains("[WARN] No translation for subtitle 8, keeping original"));
    Ok(())
}

#[tokio::test]
async fn test_runFolder_severalFilesWithWarnings_shouldKeepEveryFileInIssuesLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "a.srt", 4)?;
    common::create_test_subtitle(temp_dir.path(), "b.srt", 4)?;

    controller("es")?
        .run_folder_with_translator(MockTranslator::dropping(1), temp_dir.path(), false)
        .await?;

    let log = fs::read_to_string(temp_dir.path().join(ISSUES_LOG_FILE))?;
    assert!(log.contains("a.srt -> "), "{}", log);
    assert!(log.contains("b.srt -> "), "{}", log);
    assert_eq!(log.matches("Translation Log - ").count(), 2);
    assert_eq!(log.matches("[WARN] No translation for subtitle 4, keeping original").count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_emptyDocument_shouldFailWithEmptyDocumentError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "empty.srt", "not a subtitle\n")?;
    let mock = MockTranslator::echo();
    let calls = mock.call_counter();

    let err = controller("es")?
        .run_with_translator(&mock, &input, None, false, &common::hidden_progress())
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<SubtitleError>(), Some(SubtitleError::EmptyDocument)));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(!temp_dir.path().join("empty_es.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_checkConnection_unreachableEndpoint_shouldFail() -> Result<()> {
    let mut config = common::test_config("es");
    config.translation.active_provider_config_mut().endpoint = "http://127.0.0.1:9".to_string();
    config.translation.active_provider_config_mut().timeout_secs = 5;

    let result = Controller::with_config(config)?.check_connection().await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Failed to connect to Anthropic API"), "{}", message);
    Ok(())
}

#[tokio::test]
async fn test_run_failingTranslator_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 5)?;

    let err = controller("es")?
        .run_with_translator(MockTranslator::failing(), &input, None, false, &common::hidden_progress())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TranslationError>(),
        Some(TranslationError::ChunkFailed { chunk_number: 1, .. })
    ));
    assert!(!temp_dir.path().join("talk_es.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_missingStyleProfile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 2)?;
    let mut config = common::test_config("es");
    config.style_profile.root = temp_dir.path().join("skills");

    let result = Controller::with_config(config)?
        .run_with_translator(MockTranslator::echo(), &input, None, false, &common::hidden_progress())
        .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Style profile not found"), "{}", message);
    Ok(())
}

#[tokio::test]
async fn test_run_withStyleProfile_shouldTranslate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 2)?;
    common::create_test_file(temp_dir.path(), "skills/kobo-translation/SKILL.md", "Use formal address.")?;
    let mut config = common::test_config("es");
    config.style_profile.root = temp_dir.path().join("skills");

    let result = Controller::with_config(config)?
        .run_with_translator(MockTranslator::echo(), &input, None, false, &common::hidden_progress())
        .await?;

    assert!(result.run.count_matches());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_shouldSkipTranslatedFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "a.srt", 4)?;
    common::create_test_subtitle(temp_dir.path(), "nested/b.srt", 4)?;
    common::create_test_subtitle(temp_dir.path(), "c_de.srt", 4)?;
    let mock = MockTranslator::echo();

    controller("de")?.run_folder_with_translator(&mock, temp_dir.path(), false).await?;

    assert!(FileManager::file_exists(temp_dir.path().join("a_de.srt")));
    assert!(FileManager::file_exists(temp_dir.path().join("nested/b_de.srt")));
    assert!(!FileManager::file_exists(temp_dir.path().join("c_de_de.srt")));
    assert_eq!(mock.recorded_requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withoutSrtFiles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "nothing here")?;

    let result = controller("es")?
        .run_folder_with_translator(MockTranslator::echo(), temp_dir.path(), false)
        .await;

    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_exportThenImportJson_shouldRestoreTheSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.srt", 6)?;

    let json_path = Controller::export_json(&input, None)?;
    assert_eq!(json_path, temp_dir.path().join("talk.json"));

    let restored_path = Controller::import_json(&json_path, Some(temp_dir.path().join("restored.srt")))?;
    assert_eq!(fs::read_to_string(restored_path)?, fs::read_to_string(&input)?);
    Ok(())
}

#[test]
fn test_validateFile_shouldReportOverlaps() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "overlap.srt",
        "1\n00:00:01,000 --> 00:00:05,000\nFirst\n\n2\n00:00:04,000 --> 00:00:06,000\nSecond\n",
    )?;

    let (subtitles, report) = Controller::validate_file(&input)?;

    assert_eq!(subtitles.len(), 2);
    assert!(!report.valid);
    assert_eq!(report.issues.len(), 1);
    Ok(())
}
