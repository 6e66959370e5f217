#[cfg(test)]
pub mod fake;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

// ── Notebook markup ──

pub const LIBRARY_BOOKS: &str = "#kp-notebook-library .kp-notebook-library-each-book";
pub const BOOK_TITLE: &str = "h2";
pub const BOOK_AUTHOR: &str = "p";

pub const ANNOTATIONS: &str = "#kp-notebook-annotations";
pub const ANNOTATION_ANY_ROW: &str = "#kp-notebook-annotations .a-row";
pub const ANNOTATION_BLOCKS: &str = "#kp-notebook-annotations > .a-row.a-spacing-base";
pub const HIGHLIGHT: &str = "#highlight";
pub const NOTE: &str = "#note";
pub const HIGHLIGHT_HEADER: &str = "#annotationHighlightHeader";
pub const NOTE_HEADER: &str = "#annotationNoteHeader";

/// Query access to a rendered page: the only capabilities the extraction code needs.
#[async_trait]
pub trait Renderer: Send + Sync {
    type Node: Send + Sync;

    async fn current_url(&self) -> Result<String>;

    /// Returns `false` if `selector` is still not visible after `timeout`.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    async fn query_within(&self, node: &Self::Node, selector: &str) -> Result<Option<Self::Node>>;

    /// Trimmed inner text; empty when the node renders none.
    async fn text(&self, node: &Self::Node) -> Result<String>;

    async fn click(&self, node: &Self::Node) -> Result<()>;
}

/// Text of the first `selector` match under `node`, or `None` if there is no such element.
pub async fn child_text<R: Renderer>(
    dom: &R,
    node: &R::Node,
    selector: &str,
) -> Result<Option<String>> {
    match dom.query_within(node, selector).await? {
        Some(child) => Ok(Some(dom.text(&child).await?)),
        None => Ok(None),
    }
}
