//! Cell comments (notes)
//!
//! Comments are annotations anchored to a cell. The anchor follows the cell
//! through structural edits; a comment whose anchor row or column is deleted
//! disappears with it.

use ahash::AHashMap;

use crate::editing::StructuralEdit;

/// A cell comment/note
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellComment {
    /// Author of the comment
    pub author: String,
    /// Comment text content
    pub text: String,
    /// Whether the comment box is visible by default
    pub visible: bool,
}

impl CellComment {
    /// Create a new comment with the given author and text
    ///
    /// # Example
    ///
    /// ```rust
    /// use slate_sheets_core::CellComment;
    ///
    /// let comment = CellComment::new("John Doe", "Review this value");
    /// assert_eq!(comment.author, "John Doe");
    /// assert!(!comment.visible);
    /// ```
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            visible: false,
        }
    }

    /// Create a comment with just text (empty author)
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            author: String::new(),
            text: text.into(),
            visible: false,
        }
    }

    /// Set whether the comment is visible by default
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// The comments of one worksheet, keyed by anchor cell
#[derive(Debug, Default)]
pub struct CommentCollection {
    comments: AHashMap<(u32, u16), CellComment>,
    /// Unique comment authors in insertion order
    authors: Vec<String>,
}

impl CommentCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a comment to a cell
    pub fn set(&mut self, row: u32, col: u16, comment: CellComment) {
        if !comment.author.is_empty() && !self.authors.contains(&comment.author) {
            self.authors.push(comment.author.clone());
        }
        self.comments.insert((row, col), comment);
    }

    /// Get the comment on a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellComment> {
        self.comments.get(&(row, col))
    }

    /// Get a mutable reference to the comment on a cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellComment> {
        self.comments.get_mut(&(row, col))
    }

    /// Remove the comment on a cell
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellComment> {
        self.comments.remove(&(row, col))
    }

    /// Whether a cell has a comment
    pub fn contains(&self, row: u32, col: u16) -> bool {
        self.comments.contains_key(&(row, col))
    }

    /// Number of comments
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Whether there are no comments
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Iterate over all comments: ((row, col), comment)
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u16), &CellComment)> {
        self.comments.iter().map(|(&k, v)| (k, v))
    }

    /// The unique comment authors
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Remove all comments
    pub fn clear(&mut self) {
        self.comments.clear();
        self.authors.clear();
    }

    /// Shift comment anchors for a structural edit
    ///
    /// Comments anchored inside a deleted band are dropped.
    pub(crate) fn apply_edit(&mut self, edit: &StructuralEdit) {
        let old = std::mem::take(&mut self.comments);
        for ((row, col), comment) in old {
            let Some(row) = edit.shift_row(row) else {
                continue;
            };
            let Some(col) = edit.shift_col(col) else {
                continue;
            };
            self.comments.insert((row, col), comment);
        }
    }
}
