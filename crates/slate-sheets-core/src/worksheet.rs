//! Worksheet type

use crate::area::Area;
use crate::cell::{CellAddress, CellStore, CellValue};
use crate::comment::{CellComment, CommentCollection};
use crate::drawing::DrawingCollection;
use crate::editing::{StructuralEdit, StructuralEditListener};
use crate::error::{Error, Result};
use crate::sparkline::SparklineGroupCollection;
use crate::table::TableCollection;

/// A worksheet (single sheet in a workbook)
///
/// Owns the paged cell store and the address-bearing collaborators anchored
/// to this sheet (comments, tables, sparkline groups, drawings). Structural
/// edits are driven from the workbook level; the worksheet's
/// [`StructuralEditListener`] implementation keeps the collaborators in sync
/// once the store itself has been shifted.
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Stable id, assigned by the owning workbook; independent of position
    sheet_id: u32,
    /// Cell storage
    cells: CellStore,
    /// Cell comments
    comments: CommentCollection,
    /// Worksheet tables
    tables: TableCollection,
    /// Sparkline groups
    sparklines: SparklineGroupCollection,
    /// Drawings
    drawings: DrawingCollection,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            sheet_id: 0,
            cells: CellStore::new(),
            comments: CommentCollection::new(),
            tables: TableCollection::new(),
            sparklines: SparklineGroupCollection::new(),
            drawings: DrawingCollection::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name (the workbook validates renames)
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// The stable sheet id
    pub fn sheet_id(&self) -> u32 {
        self.sheet_id
    }

    pub(crate) fn set_sheet_id(&mut self, id: u32) {
        self.sheet_id = id;
    }

    // === Cell access ===

    /// The underlying cell store
    pub fn store(&self) -> &CellStore {
        &self.cells
    }

    /// The underlying cell store, mutably
    pub fn store_mut(&mut self) -> &mut CellStore {
        &mut self.cells
    }

    /// Get a cell value by address string (e.g., "A1")
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by row and column indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.get(row, col).cloned().unwrap_or(CellValue::Empty)
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.cells.set(row, col, value.into())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by row and column indices
    ///
    /// The stored text always carries the leading `=`.
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        let text = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.cells.set(row, col, CellValue::formula(text))
    }

    /// Clear a cell by address string
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.cells.remove(addr.row, addr.col);
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    /// The bounding rectangle of all populated cells
    pub fn used_range(&self) -> Option<Area> {
        self.cells
            .used_bounds()
            .and_then(|(min_row, min_col, max_row, max_col)| {
                Area::bounded(min_row, min_col, max_row, max_col).ok()
            })
    }

    /// Number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Whether the worksheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Formula support ===

    /// Iterate over all formula cells: (row, col, formula_text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (u32, u16, &str)> {
        self.cells.iter().filter_map(|(row, col, value)| {
            if let CellValue::Formula { text, .. } = value {
                Some((row, col, text.as_str()))
            } else {
                None
            }
        })
    }

    /// The formula text at a cell, if it holds one
    pub fn get_formula_at(&self, row: u32, col: u16) -> Option<&str> {
        self.cells.get(row, col).and_then(|v| v.formula_text())
    }

    /// Replace the text of a formula cell, keeping its cached value
    pub fn set_formula_text_at(&mut self, row: u32, col: u16, new_text: &str) -> Result<()> {
        match self.cells.get_mut(row, col) {
            Some(CellValue::Formula { text, .. }) => {
                *text = new_text.to_string();
                Ok(())
            }
            _ => Err(Error::InvalidAddress(format!(
                "cell at ({}, {}) is not a formula",
                row, col
            ))),
        }
    }

    /// Set the cached result value of a formula cell
    pub fn set_formula_result(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        match self.cells.get_mut(row, col) {
            Some(CellValue::Formula { cached_value, .. }) => {
                *cached_value = Some(Box::new(value));
                Ok(())
            }
            _ => Err(Error::InvalidAddress(format!(
                "cell at ({}, {}) is not a formula",
                row, col
            ))),
        }
    }

    // === Collaborators ===

    /// The comments of this sheet
    pub fn comments(&self) -> &CommentCollection {
        &self.comments
    }

    /// The comments of this sheet, mutably
    pub fn comments_mut(&mut self) -> &mut CommentCollection {
        &mut self.comments
    }

    /// Attach a comment to a cell by address string
    ///
    /// # Example
    ///
    /// ```rust
    /// use slate_sheets_core::{CellComment, Worksheet};
    ///
    /// let mut ws = Worksheet::new("Test");
    /// ws.set_comment("A1", CellComment::new("Author", "This is a note")).unwrap();
    /// assert!(ws.comment("A1").unwrap().is_some());
    /// ```
    pub fn set_comment(&mut self, address: &str, comment: CellComment) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.comments.set(addr.row, addr.col, comment);
        Ok(())
    }

    /// Get the comment on a cell by address string
    pub fn comment(&self, address: &str) -> Result<Option<&CellComment>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.comments.get(addr.row, addr.col))
    }

    /// The tables of this sheet
    pub fn tables(&self) -> &TableCollection {
        &self.tables
    }

    /// The tables of this sheet, mutably
    pub fn tables_mut(&mut self) -> &mut TableCollection {
        &mut self.tables
    }

    /// The sparkline groups of this sheet
    pub fn sparklines(&self) -> &SparklineGroupCollection {
        &self.sparklines
    }

    /// The sparkline groups of this sheet, mutably
    pub fn sparklines_mut(&mut self) -> &mut SparklineGroupCollection {
        &mut self.sparklines
    }

    /// The drawings of this sheet
    pub fn drawings(&self) -> &DrawingCollection {
        &self.drawings
    }

    /// The drawings of this sheet, mutably
    pub fn drawings_mut(&mut self) -> &mut DrawingCollection {
        &mut self.drawings
    }
}

impl StructuralEditListener for Worksheet {
    /// Update the sheet-anchored collaborators for an edit on this sheet
    ///
    /// The cell store itself is shifted by the orchestrator before the
    /// fan-out; this hook covers everything else the sheet owns.
    fn on_structural_edit(&mut self, edit: &StructuralEdit) {
        if !edit.targets_sheet(&self.name) {
            return;
        }
        self.comments.apply_edit(edit);
        self.tables.apply_edit(edit);
        self.sparklines.apply_edit(edit);
        self.drawings.apply_edit(edit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_worksheet() {
        let ws = Worksheet::new("Test");
        assert_eq!(ws.name(), "Test");
        assert!(ws.is_empty());
    }

    #[test]
    fn test_set_cell_values() {
        let mut ws = Worksheet::new("Test");

        ws.set_cell_value("A1", "Hello").unwrap();
        ws.set_cell_value("B1", 42.0).unwrap();
        ws.set_cell_value("C1", true).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_text(), Some("Hello"));
        assert_eq!(ws.get_value("B1").unwrap().as_number(), Some(42.0));
        assert_eq!(ws.get_value("C1").unwrap().as_bool(), Some(true));
        assert_eq!(ws.get_value("D1").unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_set_cell_formula_normalizes_equals() {
        let mut ws = Worksheet::new("Test");

        ws.set_cell_formula("A1", "SUM(B1:B10)").unwrap();
        ws.set_cell_formula("A2", "=B1*2").unwrap();

        assert_eq!(ws.get_formula_at(1, 1), Some("=SUM(B1:B10)"));
        assert_eq!(ws.get_formula_at(2, 1), Some("=B1*2"));
    }

    #[test]
    fn test_formula_cells_iterator() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value("A1", 1.0).unwrap();
        ws.set_cell_formula("B2", "=A1").unwrap();
        ws.set_cell_formula("C3", "=A1+B2").unwrap();

        let formulas: Vec<(u32, u16, &str)> = ws.formula_cells().collect();
        assert_eq!(formulas, vec![(2, 2, "=A1"), (3, 3, "=A1+B2")]);
    }

    #[test]
    fn test_set_formula_text_requires_formula_cell() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value("A1", 1.0).unwrap();
        assert!(ws.set_formula_text_at(1, 1, "=B1").is_err());

        ws.set_cell_formula("A2", "=B1").unwrap();
        ws.set_formula_text_at(2, 1, "=B4").unwrap();
        assert_eq!(ws.get_formula_at(2, 1), Some("=B4"));
    }

    #[test]
    fn test_formula_result_caching() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_formula("A1", "=1+2").unwrap();
        ws.set_formula_result(1, 1, CellValue::Number(3.0)).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_number(), Some(3.0));
    }

    #[test]
    fn test_used_range() {
        let mut ws = Worksheet::new("Test");
        assert!(ws.used_range().is_none());

        ws.set_cell_value_at(5, 3, 1.0).unwrap();
        ws.set_cell_value_at(10, 7, 2.0).unwrap();

        assert_eq!(ws.used_range().unwrap().to_string(), "C5:G10");
    }

    #[test]
    fn test_edit_listener_filters_by_sheet() {
        let mut ws = Worksheet::new("Test");
        ws.set_comment("B5", CellComment::text_only("note")).unwrap();

        ws.on_structural_edit(&StructuralEdit::insert_rows("Other", 1, 10));
        assert!(ws.comment("B5").unwrap().is_some());

        ws.on_structural_edit(&StructuralEdit::insert_rows("test", 1, 10));
        assert!(ws.comment("B5").unwrap().is_none());
        assert!(ws.comment("B15").unwrap().is_some());
    }
}
