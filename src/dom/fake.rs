//! In-memory notebook used by the extraction and pipeline tests.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::*;

#[derive(Debug, Clone, Default)]
pub struct FakeRow {
    pub highlight: Option<String>,
    pub note: Option<String>,
    pub highlight_header: Option<String>,
    pub note_header: Option<String>,
}

impl FakeRow {
    pub fn highlight(text: &str, header: &str) -> Self {
        FakeRow {
            highlight: Some(text.to_string()),
            highlight_header: Some(header.to_string()),
            ..Default::default()
        }
    }

    pub fn note(text: &str, header: &str) -> Self {
        FakeRow {
            note: Some(text.to_string()),
            note_header: Some(header.to_string()),
            ..Default::default()
        }
    }

    pub fn with_note(mut self, text: &str) -> Self {
        self.note = Some(text.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeBook {
    pub title: Option<String>,
    pub author: Option<String>,
    /// `None` models an annotation view that never finishes rendering.
    pub rows: Option<Vec<FakeRow>>,
    /// Clicking the entry fails, like a node detached mid-render.
    pub broken: bool,
}

impl FakeBook {
    pub fn new(title: &str, author: &str, rows: Vec<FakeRow>) -> Self {
        FakeBook {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            rows: Some(rows),
            broken: false,
        }
    }

    pub fn broken(title: &str, author: &str) -> Self {
        FakeBook {
            broken: true,
            ..FakeBook::new(title, author, Vec::new())
        }
    }

    pub fn stuck(title: &str, author: &str) -> Self {
        FakeBook {
            rows: None,
            ..FakeBook::new(title, author, Vec::new())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Highlight,
    Note,
    HighlightHeader,
    NoteHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeNode {
    Book(usize),
    Title(usize),
    Author(usize),
    Row(usize, usize),
    Part(usize, usize, Part),
}

pub struct FakeNotebook {
    pub url: String,
    pub library_rendered: bool,
    pub books: Vec<FakeBook>,
    selected: Mutex<Option<usize>>,
    clicks: Mutex<Vec<usize>>,
}

impl FakeNotebook {
    pub fn new(books: Vec<FakeBook>) -> Self {
        FakeNotebook {
            url: "https://read.amazon.com/notebook".to_string(),
            library_rendered: true,
            books,
            selected: Mutex::new(None),
            clicks: Mutex::new(Vec::new()),
        }
    }

    /// Open a single book directly, as if the user had clicked it.
    pub fn with_selected(self, book: usize) -> Self {
        *self.selected.lock().unwrap() = Some(book);
        self
    }

    /// Indices of the books clicked so far, in order.
    pub fn clicks(&self) -> Vec<usize> {
        self.clicks.lock().unwrap().clone()
    }

    fn selected_rows(&self) -> Option<(usize, &Vec<FakeRow>)> {
        let book = (*self.selected.lock().unwrap())?;
        self.books[book].rows.as_ref().map(|rows| (book, rows))
    }

    fn part_text(&self, book: usize, row: usize, part: Part) -> Option<&String> {
        let r = self.books[book].rows.as_ref()?.get(row)?;
        match part {
            Part::Highlight => r.highlight.as_ref(),
            Part::Note => r.note.as_ref(),
            Part::HighlightHeader => r.highlight_header.as_ref(),
            Part::NoteHeader => r.note_header.as_ref(),
        }
    }
}

#[async_trait]
impl Renderer for FakeNotebook {
    type Node = FakeNode;

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(match selector {
            LIBRARY_BOOKS => self.library_rendered && !self.books.is_empty(),
            ANNOTATIONS => self.selected_rows().is_some(),
            ANNOTATION_ANY_ROW => self
                .selected_rows()
                .map(|(_, rows)| !rows.is_empty())
                .unwrap_or(false),
            _ => false,
        })
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<FakeNode>> {
        Ok(match selector {
            LIBRARY_BOOKS if self.library_rendered => {
                (0..self.books.len()).map(FakeNode::Book).collect()
            }
            ANNOTATION_BLOCKS => match self.selected_rows() {
                Some((book, rows)) => (0..rows.len()).map(|i| FakeNode::Row(book, i)).collect(),
                None => Vec::new(),
            },
            _ => Vec::new(),
        })
    }

    async fn query_within(&self, node: &FakeNode, selector: &str) -> Result<Option<FakeNode>> {
        let found = match (*node, selector) {
            (FakeNode::Book(b), BOOK_TITLE) => self.books[b].title.as_ref().map(|_| FakeNode::Title(b)),
            (FakeNode::Book(b), BOOK_AUTHOR) => {
                self.books[b].author.as_ref().map(|_| FakeNode::Author(b))
            }
            (FakeNode::Row(b, r), sel) => {
                let part = match sel {
                    HIGHLIGHT => Part::Highlight,
                    NOTE => Part::Note,
                    HIGHLIGHT_HEADER => Part::HighlightHeader,
                    NOTE_HEADER => Part::NoteHeader,
                    _ => return Ok(None),
                };
                self.part_text(b, r, part).map(|_| FakeNode::Part(b, r, part))
            }
            _ => None,
        };
        Ok(found)
    }

    async fn text(&self, node: &FakeNode) -> Result<String> {
        let text = match *node {
            FakeNode::Title(b) => self.books[b].title.as_deref(),
            FakeNode::Author(b) => self.books[b].author.as_deref(),
            FakeNode::Part(b, r, part) => self.part_text(b, r, part).map(String::as_str),
            FakeNode::Book(_) | FakeNode::Row(..) => None,
        };
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn click(&self, node: &FakeNode) -> Result<()> {
        let FakeNode::Book(b) = *node else {
            bail!("only library entries are clickable, got {:?}", node);
        };
        if self.books[b].broken {
            bail!("node for book {} is no longer attached", b);
        }
        *self.selected.lock().unwrap() = Some(b);
        self.clicks.lock().unwrap().push(b);
        Ok(())
    }
}
