use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::dom::{self, Renderer};
use crate::error::ExportError;
use crate::parser::{self, BookIdentity, LibraryBook};
use crate::session::is_signin_redirect;
use crate::settings::Waits;
use crate::store::{should_export, OutputStore};

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub books: usize,
    pub exported: usize,
    pub skipped: usize,
    pub empty: usize,
    pub failed: usize,
}

impl ExportStats {
    pub fn summary(&self) -> String {
        format!(
            "Done: {} exported, {} skipped (already exist)",
            self.exported, self.skipped
        )
    }
}

enum BookOutcome {
    Written { highlights: usize, file: String },
    ViewTimeout,
    Empty,
}

/// Export every book of the notebook the renderer is showing.
///
/// Only a sign-in redirect or a library that never renders abort the run;
/// anything that goes wrong with a single book is logged and the run moves on.
pub async fn export_all<R: Renderer>(
    dom: &R,
    store: &OutputStore,
    waits: &Waits,
    force: bool,
) -> Result<ExportStats> {
    let url = dom.current_url().await?;
    if is_signin_redirect(&url) {
        return Err(ExportError::SessionExpired.into());
    }

    let books = parser::enumerate_books(dom, waits.library).await?;
    let existing = store.existing_keys()?;
    println!("Found {} books", books.len());
    info!("{} documents already in {:?}", existing.len(), store.dir());

    let mut stats = ExportStats {
        books: books.len(),
        ..Default::default()
    };

    let pb = ProgressBar::new(books.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let total = books.len();
    for (i, book) in books.iter().enumerate() {
        pb.inc(1);
        let id = &book.identity;
        if !should_export(id, &existing, force) {
            stats.skipped += 1;
            continue;
        }

        pb.println(format!("  [{}/{}] {} by {}...", i + 1, total, id.title, id.author));
        pb.set_message(truncate(&id.title, 32));

        match export_book(dom, store, waits, book).await {
            Ok(BookOutcome::Written { highlights, file }) => {
                pb.println(format!("    Wrote {} highlights to {}", highlights, file));
                stats.exported += 1;
            }
            Ok(BookOutcome::ViewTimeout) => {
                pb.println("    Timeout waiting for annotations, skipping");
                warn!("Annotation view for {:?} did not render within {:?}", id.title, waits.view);
                stats.failed += 1;
            }
            Ok(BookOutcome::Empty) => {
                pb.println("    No highlights found, skipping");
                stats.empty += 1;
            }
            Err(e) => {
                pb.println(format!("    Failed: {:#}", e));
                warn!("Export of {:?} failed: {:#}", id.title, e);
                stats.failed += 1;
            }
        }
    }

    pb.finish_and_clear();
    info!(
        "{} books: {} exported, {} skipped, {} empty, {} failed",
        stats.books, stats.exported, stats.skipped, stats.empty, stats.failed
    );
    Ok(stats)
}

async fn export_book<R: Renderer>(
    dom: &R,
    store: &OutputStore,
    waits: &Waits,
    book: &LibraryBook<R::Node>,
) -> Result<BookOutcome> {
    dom.click(&book.handle).await?;

    if !dom.wait_for_visible(dom::ANNOTATIONS, waits.view).await? {
        return Ok(BookOutcome::ViewTimeout);
    }
    settle(waits).await;

    let records = parser::collect(dom, waits.rows, waits.settle).await?;
    if records.is_empty() {
        return Ok(BookOutcome::Empty);
    }

    let path = store.write(&book.identity, &records)?;
    Ok(BookOutcome::Written {
        highlights: records.len(),
        file: file_name(&path, &book.identity),
    })
}

async fn settle(waits: &Waits) {
    if !waits.settle.is_zero() {
        tokio::time::sleep(waits.settle).await;
    }
}

fn file_name(path: &std::path::Path, id: &BookIdentity) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.title.clone())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
