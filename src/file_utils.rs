use anyhow::{Result, Context, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(extension) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Path of `path` relative to `base`, always with `/` separators
    pub fn relative_identifier<P1: AsRef<Path>, P2: AsRef<Path>>(path: P1, base: P2) -> Result<String> {
        let path = path.as_ref();
        let relative = path
            .strip_prefix(base.as_ref())
            .map_err(|_| anyhow!("{:?} is not inside {:?}", path, base.as_ref()))?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file through a temporary file in the same directory.
    ///
    /// The destination is replaced in one rename, so readers never observe
    /// a partially written file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        Self::write_bytes_atomic(path, content.as_bytes())
    }

    /// Byte variant of [`FileManager::write_atomic`]
    pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let mut file = Self::temp_file_beside(path)?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        Self::persist(file, path)
    }

    /// Temporary file in the directory that will hold `path`.
    ///
    /// Dropping it without [`FileManager::persist`] removes it.
    pub fn temp_file_beside<P: AsRef<Path>>(path: P) -> Result<NamedTempFile> {
        let parent = match path.as_ref().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))
    }

    /// Move a finished temporary file onto `path` in one rename
    pub fn persist<P: AsRef<Path>>(file: NamedTempFile, path: P) -> Result<()> {
        let path = path.as_ref();
        file.persist(path)
            .map_err(|e| anyhow!("Failed to write to file: {:?}: {}", path, e.error))?;
        Ok(())
    }
}
