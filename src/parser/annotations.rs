use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use super::header::parse_header;
use crate::dom::{self, Renderer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub text: String,
    pub note: String,
    pub location: String,
    pub page: String,
    /// Parsed for completeness; the rendered document does not show it.
    #[allow(dead_code)]
    pub color: String,
}

impl AnnotationRecord {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.note.is_empty()
    }
}

/// Collect highlights and notes of the currently selected book in rendered order.
///
/// An annotation list that never gets a row within `rows_timeout` yields nothing;
/// that is indistinguishable from a book without highlights.
pub async fn collect<R: Renderer>(
    dom: &R,
    rows_timeout: Duration,
    settle: Duration,
) -> Result<Vec<AnnotationRecord>> {
    if !dom.wait_for_visible(dom::ANNOTATION_ANY_ROW, rows_timeout).await? {
        debug!("No annotation rows within {:?}", rows_timeout);
        return Ok(Vec::new());
    }
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    let mut records = Vec::new();
    for block in dom.query_all(dom::ANNOTATION_BLOCKS).await? {
        let record = read_block(dom, &block).await?;
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

async fn read_block<R: Renderer>(dom: &R, block: &R::Node) -> Result<AnnotationRecord> {
    let text = dom::child_text(dom, block, dom::HIGHLIGHT).await?.unwrap_or_default();
    let note = dom::child_text(dom, block, dom::NOTE).await?.unwrap_or_default();

    let header = match dom::child_text(dom, block, dom::HIGHLIGHT_HEADER).await? {
        Some(h) => h,
        None => dom::child_text(dom, block, dom::NOTE_HEADER)
            .await?
            .unwrap_or_default(),
    };
    let fields = parse_header(&header);

    Ok(AnnotationRecord {
        text,
        note,
        location: fields.location,
        page: fields.page,
        color: fields.color,
    })
}

// ── Tests ──
