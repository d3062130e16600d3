/*!
 * End-to-end tests for single document conversion
 */

use std::fs;
use anyhow::Result;
use podscript::batch::convert_document;
use podscript::errors::{AppError, TranscriptError};
use podscript::ttml::{Transcript, TranscriptOptions};
use crate::common;

#[test]
fn test_convert_document_withTimestamps_shouldWriteThreeLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_ttml(temp_dir.path(), "input.ttml")?;
    let output = temp_dir.path().join("output.txt");

    let count = convert_document(&input, &output, TranscriptOptions::with_timestamps(true))?;

    assert_eq!(count, 3);
    assert_eq!(
        fs::read_to_string(&output)?,
        "[00:00:01] Hello world\n\n[00:00:10] Second paragraph here\n\n[00:00:20] Third"
    );

    Ok(())
}

#[test]
fn test_convert_document_withoutTimestamps_shouldWritePlainLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_ttml(temp_dir.path(), "input.ttml")?;
    let output = temp_dir.path().join("nested/output.txt");

    convert_document(&input, &output, TranscriptOptions::default())?;

    assert_eq!(fs::read_to_string(&output)?, "Hello world\n\nSecond paragraph here\n\nThird");

    Ok(())
}

#[test]
fn test_convert_document_withMalformedInput_shouldNotCreateOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "broken.ttml", "<tt><body><div><p>cut off")?;
    let output = temp_dir.path().join("broken.txt");

    let result = convert_document(&input, &output, TranscriptOptions::default());

    assert!(matches!(&result, Err(e) if e.kind() == "parse"));
    assert!(!output.exists());

    Ok(())
}

#[test]
fn test_convert_document_withStructureError_shouldKeepExistingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "nobody.ttml", "<tt><head/></tt>")?;
    let output = common::create_test_file(temp_dir.path(), "nobody.txt", "previous")?;

    let result = convert_document(&input, &output, TranscriptOptions::default());

    assert!(matches!(&result, Err(e) if e.kind() == "structure"));
    assert_eq!(fs::read_to_string(&output)?, "previous");

    Ok(())
}

#[test]
fn test_convert_document_withMissingInput_shouldReturnFileError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let result = convert_document(
        &temp_dir.path().join("missing.ttml"),
        &temp_dir.path().join("out.txt"),
        TranscriptOptions::default(),
    );

    assert!(matches!(result, Err(AppError::File(_))));

    Ok(())
}

#[test]
fn test_convert_document_withNoParagraphs_shouldWriteEmptyFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "empty.ttml", &common::ttml_document(""))?;
    let output = temp_dir.path().join("empty.txt");

    assert_eq!(convert_document(&input, &output, TranscriptOptions::default())?, 0);
    assert_eq!(fs::read_to_string(&output)?, "");

    Ok(())
}

#[test]
fn test_convert_document_withSentencesAndPlainParagraph_shouldWriteOneLinePerUnit() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let ttml = common::ttml_document(&format!(
        r#"      <p begin="1.5">
        <span podcasts:unit="sentence" begin="1.5">{}{}</span>
        <span podcasts:unit="sentence" begin="10.25">{}{}</span>
      </p>
      <p begin="20">Plain closing paragraph.</p>"#,
        common::word("Welcome"),
        common::word("back."),
        common::word("Today's"),
        common::word("topic."),
    ));
    let input = common::create_test_file(temp_dir.path(), "scenario.ttml", &ttml)?;
    let output = temp_dir.path().join("scenario.txt");

    let count = convert_document(&input, &output, TranscriptOptions::with_timestamps(true))?;

    assert_eq!(count, 3);
    assert_eq!(
        fs::read_to_string(&output)?,
        "[00:00:01] Welcome back.\n\n[00:00:10] Today's topic.\n\n[00:00:20] Plain closing paragraph."
    );

    Ok(())
}

#[test]
fn test_convert_document_withDirectoryAsOutput_shouldReturnSinkErrorAndLeaveNoFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_ttml(temp_dir.path(), "input.ttml")?;
    let output = temp_dir.path().join("taken");
    fs::create_dir(&output)?;

    let result = convert_document(&input, &output, TranscriptOptions::default());

    assert!(matches!(&result, Err(AppError::Transcript(TranscriptError::Sink(_)))));
    assert!(matches!(&result, Err(e) if e.kind() == "sink"));
    assert!(output.is_dir());
    assert_eq!(fs::read_dir(&output)?.count(), 0);
    // Only the input and the blocking directory remain; the temporary file is gone
    let mut names: Vec<String> = fs::read_dir(temp_dir.path())?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    names.sort();
    assert_eq!(names, vec!["input.ttml", "taken"]);

    Ok(())
}

#[test]
fn test_transcript_write_to_withUnwritableDestination_shouldKeepPreviousContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let blocker = common::create_test_file(temp_dir.path(), "blocker", "previous")?;
    let transcript = Transcript::from_ttml(&common::sample_ttml(), TranscriptOptions::default())?;

    // A regular file where a parent directory is expected
    let result = transcript.write_to(blocker.join("out.txt"));

    assert!(matches!(result, Err(TranscriptError::Sink(_))));
    assert_eq!(fs::read_to_string(&blocker)?, "previous");
    assert_eq!(fs::read_dir(temp_dir.path())?.count(), 1);

    Ok(())
}
