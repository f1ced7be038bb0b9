/*!
 * Tests for chunk windowing
 */

use subchunk::translation::{ChunkPlanner, ChunkSpan};
use subchunk::TranslationError;

use crate::common;

#[test]
fn test_plan_sixtyEntries_shouldMatchDocumentedWindows() {
    let spans = ChunkPlanner::new(25, 3).unwrap().plan(60);

    assert_eq!(
        spans,
        vec![
            ChunkSpan { number: 1, total: 3, body: 0..25, previous: 0..0, next: 25..28 },
            ChunkSpan { number: 2, total: 3, body: 25..50, previous: 22..25, next: 50..53 },
            ChunkSpan { number: 3, total: 3, body: 50..60, previous: 47..50, next: 60..60 },
        ]
    );
}

#[test]
fn test_plan_bodies_shouldPartitionTheDocument() {
    for (len, size, overlap) in [(1, 1, 0), (7, 3, 2), (50, 25, 3), (101, 10, 9), (24, 25, 3)] {
        let planner = ChunkPlanner::new(size, overlap).unwrap();
        let spans = planner.plan(len);

        assert_eq!(spans.len(), planner.chunk_count(len));
        let covered: Vec<usize> = spans.iter().flat_map(|s| s.body.clone()).collect();
        assert_eq!(covered, (0..len).collect::<Vec<_>>(), "len={} size={}", len, size);
        for span in &spans {
            assert!(span.len() <= size);
            assert!(span.previous.len() <= overlap);
            assert!(span.next.len() <= overlap);
            assert_eq!(span.previous.end, span.body.start);
            assert_eq!(span.next.start, span.body.end);
        }
    }
}

#[test]
fn test_plan_emptyDocument_shouldHaveNoChunks() {
    let planner = ChunkPlanner::default();
    assert!(planner.plan(0).is_empty());
    assert_eq!(planner.chunk_count(0), 0);
}

#[test]
fn test_plan_zeroOverlap_shouldHaveNoContext() {
    let spans = ChunkPlanner::new(4, 0).unwrap().plan(10);
    assert!(spans.iter().all(|s| s.previous.is_empty() && s.next.is_empty()));
}

#[test]
fn test_new_zeroChunkSize_shouldFail() {
    assert!(matches!(
        ChunkPlanner::new(0, 0),
        Err(TranslationError::InvalidChunking { chunk_size: 0, overlap: 0 })
    ));
}

#[test]
fn test_validate_overlapEqualToChunkSize_shouldFail() {
    assert!(ChunkPlanner::new(5, 5).unwrap().validate().is_err());
    assert!(ChunkPlanner::new(5, 4).unwrap().validate().is_ok());
}

#[test]
fn test_materialize_shouldDrawPreviousFromTranslatedOutput() {
    let source = common::sample_entries(10);
    let translated: Vec<_> = source[..4].iter().map(|e| e.with_text(format!("T{}", e.seq_num))).collect();
    let spans = ChunkPlanner::new(4, 2).unwrap().plan(source.len());

    let chunk = spans[1].materialize(&source, &translated);

    let previous: Vec<&str> = chunk.previous_context.iter().map(|e| e.text.as_str()).collect();
    let next: Vec<&str> = chunk.next_context.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(previous, vec!["T3", "T4"]);
    assert_eq!(next, vec!["Line 9", "Line 10"]);
    assert_eq!(chunk.position_range(), (5, 8));
    assert_eq!(chunk.seq_range(), Some((5, 8)));
}

#[test]
fn test_spanFlags_shouldMarkFirstAndLast() {
    let spans = ChunkPlanner::new(3, 1).unwrap().plan(7);
    assert!(spans[0].is_first() && !spans[0].is_last());
    assert!(spans[2].is_last());
    assert_eq!(spans[2].len(), 1);
}
