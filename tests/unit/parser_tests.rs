/*!
 * Tests for the translation response parser
 */

use subchunk::providers::mock::MockTranslator;
use subchunk::translation::{ParseStrategy, ResponseParser};

use crate::common;

#[test]
fn test_parse_mockEcho_shouldTranslateEveryEntry() {
    let originals = common::sample_entries(5);
    let response = MockTranslator::generate_echo(&originals, "de");

    let parsed = ResponseParser::new().parse(&response, &originals);

    assert_eq!(parsed.strategy, ParseStrategy::Primary);
    assert!(parsed.is_complete());
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.entries[4].text, "<DE> Line 5");
}

#[test]
fn test_parse_rewrittenIndicesAndTimes_shouldKeepOriginalOnes() {
    let originals = common::sample_entries(2);
    let response = "Here you go:\n\n[7] 09:00:00,000 --> 09:00:01,000\nUno\n\n[8] 09:00:02,000 --> 09:00:03,000\nDos";

    let parsed = ResponseParser::new().parse(response, &originals);

    assert_eq!(parsed.entries[0].seq_num, 1);
    assert_eq!(parsed.entries[0].start_time_ms, originals[0].start_time_ms);
    assert_eq!(parsed.entries[1].end_time_ms, originals[1].end_time_ms);
    assert_eq!(parsed.entries[1].text, "Dos");
    assert_eq!(parsed.warnings.len(), 2);
    assert!(parsed.reverted.is_empty());
}

#[test]
fn test_parse_windowsLineEndings_shouldStillMatchHeaders() {
    let originals = common::sample_entries(1);
    let response = "[1] 00:00:02,000 --> 00:00:03,500\r\nHola\r\n";

    let parsed = ResponseParser::new().parse(response, &originals);

    assert_eq!(parsed.strategy, ParseStrategy::Primary);
    assert_eq!(parsed.entries[0].text, "Hola");
}

#[test]
fn test_parse_fewerEntries_shouldRevertTheMissingTail() {
    let originals = common::sample_entries(4);
    let response = MockTranslator::generate_echo(&originals[..2], "it");

    let parsed = ResponseParser::new().parse(&response, &originals);

    assert_eq!(parsed.entries.len(), 4);
    assert_eq!(parsed.reverted, vec![3, 4]);
    assert_eq!(parsed.entries[2], originals[2]);
    assert_eq!(parsed.warnings[0], "Expected 4 subtitles, got 2");
}

#[test]
fn test_parse_proseBlocks_shouldUseFallbackPositionally() {
    let originals = common::sample_entries(3);
    let response = "Uno\n\nDos\n\nTres";

    let parsed = ResponseParser::new().parse(response, &originals);

    assert_eq!(parsed.strategy, ParseStrategy::Fallback);
    let texts: Vec<&str> = parsed.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Uno", "Dos", "Tres"]);
    assert!(parsed.reverted.is_empty());
}

#[test]
fn test_fallbackBlocks_shouldStripMarkerAndTimestampLines() {
    let response = "[1] something odd\nHola\n\n00:00:01,000 --> 00:00:02,000\nAdios\n\n[3]\n\n";

    assert_eq!(ResponseParser::fallback_blocks(response), vec!["Hola", "Adios"]);
}

#[test]
fn test_fallbackBlocks_plainSrtBlocks_shouldDropIndexLines() {
    let response = "1\n00:00:01,000 --> 00:00:02,000\nHola\n\n2\n00:00:03,000 --> 00:00:04,000\nAdios\n\n42\n";

    assert_eq!(ResponseParser::fallback_blocks(response), vec!["Hola", "Adios", "42"]);
}

#[test]
fn test_parse_emptyResponse_shouldKeepEveryOriginal() {
    let originals = common::sample_entries(3);

    let parsed = ResponseParser::new().parse("", &originals);

    assert_eq!(parsed.entries, originals);
    assert_eq!(parsed.reverted, vec![1, 2, 3]);
}

#[test]
fn test_extractEchoed_shouldReadIndexAndTimes() {
    let echoed = ResponseParser::extract_echoed("[12] 00:01:00,000 --> 00:01:02,500\nText\nmore\n[13] nope");

    assert_eq!(echoed.len(), 1);
    assert_eq!(echoed[0].seq_num, Some(12));
    assert_eq!(echoed[0].start, "00:01:00,000");
    assert_eq!(echoed[0].end, "00:01:02,500");
    assert_eq!(echoed[0].text, "Text\nmore");
}
