use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;

use crate::dom::{self, Renderer};
use crate::error::ExportError;

static BY_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^By:\s*").unwrap());

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookIdentity {
    pub title: String,
    pub author: String,
}

impl BookIdentity {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        BookIdentity {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// A library entry plus the node to click to open it.
pub struct LibraryBook<N> {
    pub identity: BookIdentity,
    pub handle: N,
}

/// Read the library sidebar in rendered order. A sidebar that never shows up is fatal.
pub async fn enumerate_books<R: Renderer>(
    dom: &R,
    timeout: Duration,
) -> Result<Vec<LibraryBook<R::Node>>> {
    if !dom.wait_for_visible(dom::LIBRARY_BOOKS, timeout).await? {
        return Err(ExportError::LibraryTimeout(timeout.as_secs()).into());
    }

    let mut books = Vec::new();
    for handle in dom.query_all(dom::LIBRARY_BOOKS).await? {
        let title = dom::child_text(dom, &handle, dom::BOOK_TITLE)
            .await?
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let author = dom::child_text(dom, &handle, dom::BOOK_AUTHOR)
            .await?
            .map(|a| clean_author(&a))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        books.push(LibraryBook {
            identity: BookIdentity::new(title, author),
            handle,
        });
    }
    Ok(books)
}

fn clean_author(raw: &str) -> String {
    BY_PREFIX_RE.replace(raw.trim(), "").to_string()
}

// ── Tests ──
