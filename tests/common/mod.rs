/*!
 * Common test utilities for the podscript test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories as needed
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Wraps paragraphs in a namespaced TTML document with one div
pub fn ttml_document(paragraphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<tt xmlns="http://www.w3.org/ns/ttml" xmlns:podcasts="http://podcasts.apple.com/transcript-ttml-internal">
  <body>
    <div>
{}
    </div>
  </body>
</tt>"#,
        paragraphs
    )
}

/// A word-level span using the podcasts-namespaced unit attribute
pub fn word(text: &str) -> String {
    format!(r#"<span podcasts:unit="word">{}</span>"#, text)
}

/// Three paragraphs with begin times 1.5, 10.25 and 20
pub fn sample_ttml() -> String {
    ttml_document(
        r#"      <p begin="1.5">Hello world</p>
      <p begin="10.25">Second paragraph here</p>
      <p begin="20">Third</p>"#,
    )
}

/// Writes [`sample_ttml`] into `dir`
pub fn create_test_ttml(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, &sample_ttml())
}

/// Word-level document with `paragraphs` paragraphs of `words` words each
pub fn word_level_ttml(paragraphs: usize, words: usize) -> String {
    let body: Vec<String> = (0..paragraphs)
        .map(|p| {
            let spans: Vec<String> = (0..words).map(|w| word(&format!("w{}_{}", p, w))).collect();
            format!(
                r#"      <p begin="{}"><span podcasts:unit="sentence">{}</span></p>"#,
                p * 5,
                spans.join("\n")
            )
        })
        .collect();
    ttml_document(&body.join("\n"))
}

/// Creates a podcast library database with one show and two episodes.
///
/// "Comets" has transcript `PodcastContent221/transcript_10.ttml`;
/// "Meteors" is newer and has no transcript.
pub fn create_library_database(path: &Path) -> Result<()> {
    let conn = rusqlite::Connection::open(path)?;
    conn.execute_batch(
        r#"
        CREATE TABLE ZMTPODCAST (
            Z_PK INTEGER PRIMARY KEY,
            ZUUID VARCHAR,
            ZTITLE VARCHAR,
            ZAUTHOR VARCHAR,
            ZCATEGORY VARCHAR,
            ZSTORECOLLECTIONID INTEGER
        );
        CREATE TABLE ZMTEPISODE (
            Z_PK INTEGER PRIMARY KEY,
            ZPODCAST INTEGER,
            ZPODCASTUUID VARCHAR,
            ZUUID VARCHAR,
            ZTITLE VARCHAR,
            ZPUBDATE TIMESTAMP,
            ZDURATION FLOAT,
            ZSTORETRACKID INTEGER,
            ZTRANSCRIPTIDENTIFIER VARCHAR
        );
        INSERT INTO ZMTPODCAST VALUES (1, 'show-uuid', 'Night Sky', 'Observatory', 'Science', 1483081827);
        INSERT INTO ZMTEPISODE VALUES
            (1, 1, 'show-uuid', 'ep-1', 'Comets', 700000000.0, 1800.0, 1000714478537, 'PodcastContent221/transcript_10.ttml'),
            (2, 1, 'show-uuid', 'ep-2', 'Meteors', 710000000.0, 1500.0, 1000714478538, NULL);
        "#,
    )?;
    Ok(())
}
