//! Drawings and their cell anchors
//!
//! A drawing (picture, shape, chart frame) is pinned to the grid by two cell
//! anchors. Structural edits move the anchors with the cells; an anchor in a
//! deleted band snaps to the band start instead of disappearing.

use crate::cell::CellAddress;
use crate::editing::StructuralEdit;
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A drawing anchored between two cells
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    /// Drawing name
    pub name: String,
    /// Top-left anchor
    pub from: CellAddress,
    /// Bottom-right anchor
    pub to: CellAddress,
}

impl Drawing {
    /// Create a drawing spanning the given anchors
    pub fn new(name: impl Into<String>, from: CellAddress, to: CellAddress) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyInput("drawing name"));
        }
        Ok(Self { name, from, to })
    }
}

/// The drawings of one worksheet
#[derive(Debug, Default)]
pub struct DrawingCollection {
    drawings: Vec<Drawing>,
}

impl DrawingCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a drawing
    pub fn add(&mut self, drawing: Drawing) {
        self.drawings.push(drawing);
    }

    /// Look up a drawing by name
    pub fn get(&self, name: &str) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.name == name)
    }

    /// Iterate over all drawings
    pub fn iter(&self) -> impl Iterator<Item = &Drawing> {
        self.drawings.iter()
    }

    /// Number of drawings
    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    /// Whether there are no drawings
    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    /// Shift drawing anchors for a structural edit
    pub(crate) fn apply_edit(&mut self, edit: &StructuralEdit) {
        for drawing in &mut self.drawings {
            drawing.from = shift_anchor(drawing.from, edit);
            drawing.to = shift_anchor(drawing.to, edit);
        }
    }
}

/// Move one anchor; anchors in a deleted band land on the band start, and
/// anchors pushed past the sheet edge clamp to it
fn shift_anchor(anchor: CellAddress, edit: &StructuralEdit) -> CellAddress {
    let row = edit.shift_row(anchor.row).unwrap_or(edit.from_row.max(1));
    let col = edit.shift_col(anchor.col).unwrap_or(edit.from_col.max(1));
    CellAddress {
        row: row.min(MAX_ROWS),
        col: col.min(MAX_COLS),
        ..anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_anchors_shift() {
        let mut drawings = DrawingCollection::new();
        drawings.add(Drawing::new("Logo", cell("B2"), cell("D6")).unwrap());

        drawings.apply_edit(&StructuralEdit::insert_rows("Sheet1", 3, 2));

        let d = drawings.get("Logo").unwrap();
        assert_eq!(d.from, cell("B2"));
        assert_eq!(d.to, cell("D8"));
    }

    #[test]
    fn test_anchor_in_deleted_band_snaps_to_band_start() {
        let mut drawings = DrawingCollection::new();
        drawings.add(Drawing::new("Logo", cell("B5"), cell("D9")).unwrap());

        drawings.apply_edit(&StructuralEdit::delete_rows("Sheet1", 4, 3));

        let d = drawings.get("Logo").unwrap();
        assert_eq!(d.from, cell("B4"));
        assert_eq!(d.to, cell("D6"));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            Drawing::new("", cell("A1"), cell("B2")),
            Err(Error::EmptyInput(_))
        ));
    }
}
