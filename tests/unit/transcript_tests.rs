/*!
 * Tests for transcript assembly
 */

use podscript::errors::TranscriptError;
use podscript::ttml::{assemble, convert, parse_document, Transcript, TranscriptOptions, PARAGRAPH_SEPARATOR};
use crate::common;

fn lines(ttml: &str, include_timestamps: bool) -> Vec<String> {
    assemble(&parse_document(ttml).unwrap(), include_timestamps).unwrap()
}

#[test]
fn test_assemble_withPlainParagraphs_shouldProduceOneLineEach() {
    let result = lines(&common::sample_ttml(), false);

    assert_eq!(result, vec!["Hello world", "Second paragraph here", "Third"]);
}

#[test]
fn test_assemble_withTimestamps_shouldPrefixBeginTimes() {
    let result = lines(&common::sample_ttml(), true);

    assert_eq!(
        result,
        vec![
            "[00:00:01] Hello world",
            "[00:00:10] Second paragraph here",
            "[00:00:20] Third",
        ]
    );
}

#[test]
fn test_assemble_withSentenceSpans_shouldSplitParagraph() {
    let ttml = common::ttml_document(&format!(
        r#"<p begin="0"><span podcasts:unit="sentence" begin="1">{} {}</span><span podcasts:unit="sentence" begin="65">{}</span></p>"#,
        common::word("Good"),
        common::word("morning."),
        common::word("Welcome."),
    ));

    assert_eq!(lines(&ttml, false), vec!["Good morning.", "Welcome."]);
    assert_eq!(lines(&ttml, true), vec!["[00:00:01] Good morning.", "[00:01:05] Welcome."]);
}

#[test]
fn test_assemble_withWordSpansOnly_shouldJoinWords() {
    let ttml = common::ttml_document(&format!(
        "<p>{}{}{}</p>",
        common::word("Hello"),
        common::word("there"),
        common::word("friend")
    ));

    assert_eq!(lines(&ttml, false), vec!["Hello there friend"]);
}

#[test]
fn test_assemble_withNestedSentences_shouldUseOutermostOnly() {
    let ttml = common::ttml_document(
        r#"<p><span podcasts:unit="sentence">outer <span podcasts:unit="sentence">inner</span></span></p>"#,
    );

    assert_eq!(lines(&ttml, false), vec!["outer inner"]);
}

#[test]
fn test_assemble_withMultipleDivs_shouldVisitAll() {
    let ttml = r#"<tt xmlns="http://www.w3.org/ns/ttml"><body>
        <div><p>first</p></div>
        <div><p>second</p><p>third</p></div>
    </body></tt>"#;

    assert_eq!(lines(ttml, false), vec!["first", "second", "third"]);
}

#[test]
fn test_assemble_withAndWithoutNamespace_shouldProduceSameLines() {
    let namespaced = r#"<tt xmlns="http://www.w3.org/ns/ttml"><body><div><p>a  b</p><p>c</p></div></body></tt>"#;
    let plain = r#"<tt><body><div><p>a  b</p><p>c</p></div></body></tt>"#;

    assert_eq!(lines(namespaced, false), lines(plain, false));
}

#[test]
fn test_assemble_withEmptyParagraphs_shouldSkipThem() {
    let ttml = common::ttml_document(r#"<p begin="1">  </p><p begin="2">kept</p><p/>"#);

    assert_eq!(lines(&ttml, true), vec!["[00:00:02] kept"]);
}

#[test]
fn test_assemble_withMissingBegin_shouldOmitTimestamp() {
    let ttml = common::ttml_document(r#"<p>no time</p><p begin="3s">timed</p>"#);

    assert_eq!(lines(&ttml, true), vec!["no time", "[00:00:03] timed"]);
}

#[test]
fn test_assemble_withUnparseableBegin_shouldOmitTimestamp() {
    let ttml = common::ttml_document(r#"<p begin="later">text</p>"#);

    assert_eq!(lines(&ttml, true), vec!["text"]);
}

#[test]
fn test_assemble_withoutBody_shouldReturnStructureError() {
    let root = parse_document(r#"<tt xmlns="http://www.w3.org/ns/ttml"><head/></tt>"#).unwrap();

    assert!(matches!(assemble(&root, false), Err(TranscriptError::Structure(_))));
}

#[test]
fn test_assemble_withoutDiv_shouldReturnStructureError() {
    let root = parse_document(r#"<tt><body><p>orphan</p></body></tt>"#).unwrap();

    match assemble(&root, false) {
        Err(TranscriptError::Structure(message)) => assert!(message.contains("div")),
        other => panic!("expected structure error, got {:?}", other),
    }
}

#[test]
fn test_assemble_withEmptyDiv_shouldReturnNoLines() {
    let root = parse_document("<tt><body><div/></body></tt>").unwrap();

    assert!(assemble(&root, false).unwrap().is_empty());
}

#[test]
fn test_convert_shouldJoinWithParagraphSeparator() {
    let text = convert(&common::sample_ttml(), TranscriptOptions::default()).unwrap();

    assert_eq!(text, ["Hello world", "Second paragraph here", "Third"].join(PARAGRAPH_SEPARATOR));
    assert!(!text.ends_with('\n'));
}

#[test]
fn test_convert_withMalformedInput_shouldReturnParseError() {
    let result = convert("<tt><body><div><p>oops</div>", TranscriptOptions::default());

    assert!(matches!(result, Err(TranscriptError::Parse(_))));
}

#[test]
fn test_transcript_render_shouldMatchDisplay() {
    let transcript = Transcript::from_ttml(&common::sample_ttml(), TranscriptOptions::with_timestamps(true)).unwrap();

    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.to_string(), transcript.render());
}

#[test]
fn test_transcript_lines_shouldHaveNoInnerWhitespaceRuns() {
    let transcript = Transcript::from_ttml(&common::word_level_ttml(5, 12), TranscriptOptions::default()).unwrap();

    assert_eq!(transcript.len(), 5);
    for line in &transcript.lines {
        assert!(!line.is_empty());
        assert!(!line.contains('\n'));
        assert!(!line.contains("  "));
        assert_eq!(line.trim(), line);
    }
}
