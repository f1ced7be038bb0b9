/*!
 * Whole-document translation runs against scripted translators
 */

use std::sync::atomic::Ordering;

use subchunk::providers::mock::MockTranslator;
use subchunk::translation::{
    ChunkPlanner, ChunkedTranslator, ParseStrategy, RetryingTranslator, TranslationJob, UsageStats,
};
use subchunk::TranslationError;

use crate::common;

fn planner(chunk_size: usize, overlap: usize) -> ChunkPlanner {
    ChunkPlanner::new(chunk_size, overlap).unwrap()
}

#[tokio::test]
async fn test_translateDocument_sixtyEntries_shouldPreserveStructureAndUsage() {
    common::init_test_logging();
    let doc = common::sample_document(60);
    let mock = MockTranslator::echo();
    let pipeline = ChunkedTranslator::new(mock.clone(), planner(25, 3)).unwrap();

    let run = pipeline.translate_document(&doc, &TranslationJob::new("es", "")).await.unwrap();

    assert_eq!(run.chunk_count, 3);
    assert!(run.count_matches());
    for (out, orig) in run.output.entries.iter().zip(&doc.entries) {
        assert_eq!(out.seq_num, orig.seq_num);
        assert_eq!((out.start_time_ms, out.end_time_ms), (orig.start_time_ms, orig.end_time_ms));
        assert_eq!(out.text, format!("<ES> {}", orig.text));
    }
    assert_eq!(run.usage, UsageStats::new(1200, 2000, 1000, 600));

    let bodies: Vec<(usize, usize)> = mock
        .recorded_requests()
        .iter()
        .map(|r| (r.body[0], *r.body.last().unwrap()))
        .collect();
    assert_eq!(bodies, vec![(1, 25), (26, 50), (51, 60)]);
    assert!(run.output.validate().valid);
}

#[tokio::test]
async fn test_translateDocument_corruptedEcho_shouldKeepOriginalIndicesAndTimes() {
    let doc = common::sample_document(10);
    let pipeline = ChunkedTranslator::new(MockTranslator::corrupted(), planner(5, 1)).unwrap();

    let run = pipeline.translate_document(&doc, &TranslationJob::new("fr", "")).await.unwrap();

    assert!(run.count_matches());
    assert!(run.reverted().is_empty());
    assert_eq!(run.chunks_with_warnings(), 2);
    for (out, orig) in run.output.entries.iter().zip(&doc.entries) {
        assert_eq!(out.seq_num, orig.seq_num);
        assert_eq!(out.start_time_ms, orig.start_time_ms);
        // The last entry of a chunk runs to the end of the response, trailing prose included
        let expected = if orig.seq_num % 5 == 0 {
            format!("<FR> {}\n\nLet me know if you need changes.", orig.text)
        } else {
            format!("<FR> {}", orig.text)
        };
        assert_eq!(out.text, expected);
    }
}

#[tokio::test]
async fn test_translateDocument_droppedEntries_shouldRevertOnlyThose() {
    common::init_test_logging();
    let doc = common::sample_document(10);
    let pipeline = ChunkedTranslator::new(MockTranslator::dropping(2), planner(5, 1)).unwrap();

    let run = pipeline.translate_document(&doc, &TranslationJob::new("es", "")).await.unwrap();

    assert!(run.count_matches());
    assert_eq!(run.reverted(), vec![4, 5, 9, 10]);
    assert_eq!(run.output.entries[3], doc.entries[3]);
    assert_eq!(run.output.entries[5].text, "<ES> Line 6");
    assert_eq!(run.fallback_chunks(), 0);
}

#[tokio::test]
async fn test_translateDocument_proseOnly_shouldUseFallbackForEveryChunk() {
    let doc = common::sample_document(7);
    let pipeline = ChunkedTranslator::new(MockTranslator::prose_only(), planner(3, 1)).unwrap();

    let run = pipeline.translate_document(&doc, &TranslationJob::new("it", "")).await.unwrap();

    assert_eq!(run.fallback_chunks(), 3);
    assert!(run.outcomes.iter().all(|o| o.strategy == ParseStrategy::Fallback));
    assert!(run.reverted().is_empty());
    assert_eq!(run.output.entries[6].text, "<IT> Line 7");
}

#[tokio::test]
async fn test_translateDocument_failingProvider_shouldAbortOnFirstChunk() {
    let doc = common::sample_document(10);
    let mock = MockTranslator::failing();
    let calls = mock.call_counter();
    let pipeline = ChunkedTranslator::new(mock, planner(5, 1)).unwrap();

    let err = pipeline.translate_document(&doc, &TranslationJob::new("es", "")).await.unwrap_err();

    assert!(matches!(err, TranslationError::ChunkFailed { chunk_number: 1, total_chunks: 2, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_translateDocument_transientFailuresWithRetries_shouldComplete() {
    let doc = common::sample_document(10);
    let mock = MockTranslator::intermittent(2);
    let calls = mock.call_counter();
    let pipeline = ChunkedTranslator::new(RetryingTranslator::new(mock, 3, 1), planner(5, 1)).unwrap();

    let run = pipeline.translate_document(&doc, &TranslationJob::new("es", "")).await.unwrap();

    assert!(run.reverted().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_translateDocument_transientFailureWithoutRetries_shouldAbort() {
    let doc = common::sample_document(10);
    let pipeline = ChunkedTranslator::new(RetryingTranslator::new(MockTranslator::intermittent(1), 0, 1), planner(5, 1))
        .unwrap();

    let result = pipeline.translate_document(&doc, &TranslationJob::new("es", "")).await;

    assert!(matches!(result, Err(TranslationError::ChunkFailed { chunk_number: 1, .. })));
}

#[tokio::test]
async fn test_translateDocument_emptyDocument_shouldNotCallTranslator() {
    let doc = common::sample_document(0);
    let mock = MockTranslator::echo();
    let calls = mock.call_counter();
    let pipeline = ChunkedTranslator::new(mock, ChunkPlanner::default()).unwrap();

    let run = pipeline.translate_document(&doc, &TranslationJob::new("es", "")).await.unwrap();

    assert_eq!(run.chunk_count, 0);
    assert!(run.output.is_empty());
    assert_eq!(run.usage, UsageStats::default());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
