use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::markdown;
use crate::parser::{AnnotationRecord, BookIdentity};

const MAX_KEY_CHARS: usize = 200;
const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const EXTENSION: &str = "md";

/// Filesystem-safe name for a book's document, stable across runs.
pub fn export_key(book: &BookIdentity) -> String {
    let raw = format!("{} - {}", book.title, book.author);
    let cleaned: String = raw.chars().filter(|c| !ILLEGAL.contains(c)).collect();
    cleaned
        .trim_matches(|c| c == '.' || c == ' ')
        .chars()
        .take(MAX_KEY_CHARS)
        .collect()
}

/// Whether a book needs to be (re)exported given the keys found at startup.
pub fn should_export(book: &BookIdentity, existing: &HashSet<String>, force: bool) -> bool {
    force || !existing.contains(&export_key(book))
}

/// Directory of per-book Markdown documents.
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        Ok(OutputStore { dir })
    }

    /// Opens `dir` only if it already exists; never creates anything.
    pub fn existing(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        dir.is_dir().then_some(OutputStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys of the documents already present.
    pub fn existing_keys(&self) -> Result<HashSet<String>> {
        let mut keys = HashSet::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {:?}", self.dir))?;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.insert(stem.to_string());
            }
        }
        Ok(keys)
    }

    pub fn path_for(&self, book: &BookIdentity) -> PathBuf {
        self.dir.join(format!("{}.{}", export_key(book), EXTENSION))
    }

    /// Render and write a book's document, replacing any earlier export.
    pub fn write(&self, book: &BookIdentity, records: &[AnnotationRecord]) -> Result<PathBuf> {
        let path = self.path_for(book);
        fs::write(&path, markdown::render(book, records))
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(path)
    }
}

// ── Tests ──
