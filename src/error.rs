use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort the whole run. Everything else is handled per book.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Session file not found: {}\nRun `kindle_export login` first to log in and save your session.", .0.display())]
    SessionMissing(PathBuf),

    #[error("Session expired. Please re-run `kindle_export login` to log in again.")]
    SessionExpired,

    #[error("Library did not render within {0}s. The session may have expired; re-run `kindle_export login`.")]
    LibraryTimeout(u64),
}
