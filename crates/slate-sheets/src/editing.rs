//! Workbook-level structural editing
//!
//! The orchestrator behind row/column insertion, deletion and range copies.
//! Each operation runs in a fixed order: (1) shift the edited sheet's cell
//! store, (2) rewrite every formula cell on every sheet through the
//! reference rewriter, (3) hand the edit descriptor to every registered
//! collaborator (named ranges, comments, tables, sparkline groups,
//! drawings) so each updates the addresses it owns.
//!
//! # Example
//!
//! ```rust
//! use slate_sheets::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A5", 10.0).unwrap();
//! sheet.set_cell_formula("B1", "=A5*2").unwrap();
//!
//! workbook.insert_rows("Sheet1", 3, 2).unwrap();
//!
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.get_value("A7").unwrap().as_number(), Some(10.0));
//! assert_eq!(sheet.get_formula_at(1, 2), Some("=A7*2"));
//! ```

use slate_sheets_core::{
    Area, CellValue, Error, Result, StructuralEdit, StructuralEditListener, Workbook,
    MAX_COLS, MAX_ROWS,
};
use slate_sheets_formula::{
    translate_for_copy, update_formula_deleted_sheet_references, update_formula_references,
    update_formula_sheet_references,
};

/// Options for [`WorkbookEditExt::copy_range`]
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Copy formulas (translated by the copy delta); when `false`, formula
    /// cells contribute their cached value instead
    pub include_formulas: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            include_formulas: true,
        }
    }
}

/// Extension trait adding structural edits to [`Workbook`]
pub trait WorkbookEditExt {
    /// Insert `count` rows before `row` on `sheet`
    fn insert_rows(&mut self, sheet: &str, row: u32, count: u32) -> Result<()>;

    /// Delete the rows `[row, row + count)` on `sheet`
    fn delete_rows(&mut self, sheet: &str, row: u32, count: u32) -> Result<()>;

    /// Insert `count` columns before `col` on `sheet`
    fn insert_columns(&mut self, sheet: &str, col: u16, count: u16) -> Result<()>;

    /// Delete the columns `[col, col + count)` on `sheet`
    fn delete_columns(&mut self, sheet: &str, col: u16, count: u16) -> Result<()>;

    /// Copy `source` to the rectangle anchored at `destination`'s top-left
    ///
    /// Values are duplicated; formulas are translated by the
    /// destination-minus-source delta unless excluded. Destination contents
    /// are overwritten.
    fn copy_range(
        &mut self,
        sheet: &str,
        source: &Area,
        destination: &Area,
        options: &CopyOptions,
    ) -> Result<()>;

    /// Rename a worksheet, rewriting formulas and named-range addresses
    fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()>;

    /// Remove a worksheet, degrading references to it into `#REF!`
    fn delete_sheet(&mut self, name: &str) -> Result<()>;
}

/// Resolve a sheet argument to its index and canonical name
fn resolve_sheet(workbook: &Workbook, sheet: &str) -> Result<(usize, String)> {
    let index = workbook
        .sheet_index(sheet)
        .ok_or_else(|| Error::SheetNotFound(sheet.into()))?;
    let name = workbook
        .worksheet(index)
        .map(|ws| ws.name().to_string())
        .ok_or_else(|| Error::SheetNotFound(sheet.into()))?;
    Ok((index, name))
}

impl WorkbookEditExt for Workbook {
    fn insert_rows(&mut self, sheet: &str, row: u32, count: u32) -> Result<()> {
        let (index, name) = resolve_sheet(self, sheet)?;
        if let Some(ws) = self.worksheet_mut(index) {
            ws.store_mut().insert_rows(row, count)?;
        }
        apply_edit(self, StructuralEdit::insert_rows(name, row, count));
        Ok(())
    }

    fn delete_rows(&mut self, sheet: &str, row: u32, count: u32) -> Result<()> {
        let (index, name) = resolve_sheet(self, sheet)?;
        if let Some(ws) = self.worksheet_mut(index) {
            ws.store_mut().delete_rows(row, count)?;
        }
        apply_edit(self, StructuralEdit::delete_rows(name, row, count));
        Ok(())
    }

    fn insert_columns(&mut self, sheet: &str, col: u16, count: u16) -> Result<()> {
        let (index, name) = resolve_sheet(self, sheet)?;
        if let Some(ws) = self.worksheet_mut(index) {
            ws.store_mut().insert_columns(col, count)?;
        }
        apply_edit(self, StructuralEdit::insert_columns(name, col, count));
        Ok(())
    }

    fn delete_columns(&mut self, sheet: &str, col: u16, count: u16) -> Result<()> {
        let (index, name) = resolve_sheet(self, sheet)?;
        if let Some(ws) = self.worksheet_mut(index) {
            ws.store_mut().delete_columns(col, count)?;
        }
        apply_edit(self, StructuralEdit::delete_columns(name, col, count));
        Ok(())
    }

    fn copy_range(
        &mut self,
        sheet: &str,
        source: &Area,
        destination: &Area,
        options: &CopyOptions,
    ) -> Result<()> {
        let (index, _) = resolve_sheet(self, sheet)?;
        let ws = self
            .worksheet_mut(index)
            .ok_or_else(|| Error::SheetNotFound(sheet.into()))?;

        // The destination rectangle has the source's dimensions, anchored at
        // the destination's top-left corner.
        let rows = source.row_count();
        let cols = source.col_count();
        let dest_row = destination.from_row();
        let dest_col = destination.from_col();
        let dest_last_row = dest_row
            .checked_add(rows - 1)
            .filter(|&r| r <= MAX_ROWS)
            .ok_or(Error::RowOutOfBounds(dest_row, MAX_ROWS))?;
        let dest_last_col = dest_col
            .checked_add(cols - 1)
            .filter(|&c| c <= MAX_COLS)
            .ok_or(Error::ColumnOutOfBounds(dest_col, MAX_COLS))?;

        let row_delta = dest_row as i64 - source.from_row() as i64;
        let col_delta = dest_col as i64 - source.from_col() as i64;

        // Snapshot the source before clearing: the rectangles may overlap.
        let cells: Vec<(u32, u16, CellValue)> = ws
            .store()
            .enumerate(
                source.from_row(),
                source.from_col(),
                source.to_row(),
                source.to_col(),
            )
            .map(|(r, c, v)| (r, c, v.clone()))
            .collect();

        let stale: Vec<(u32, u16)> = ws
            .store()
            .enumerate(dest_row, dest_col, dest_last_row, dest_last_col)
            .map(|(r, c, _)| (r, c))
            .collect();
        for (r, c) in stale {
            ws.store_mut().remove(r, c);
        }

        for (row, col, value) in cells {
            let target_row = (row as i64 + row_delta) as u32;
            let target_col = (col as i64 + col_delta) as u16;
            let value = match value {
                CellValue::Formula { text, cached_value } => {
                    if options.include_formulas {
                        CellValue::Formula {
                            text: translate_for_copy(&text, row_delta, col_delta),
                            cached_value,
                        }
                    } else {
                        match cached_value {
                            Some(cached) => *cached,
                            None => continue,
                        }
                    }
                }
                other => other,
            };
            ws.store_mut().set(target_row, target_col, value)?;
        }
        Ok(())
    }

    fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let (index, old_name) = resolve_sheet(self, old_name)?;

        // Validates the new name and updates named-range scopes.
        self.rename_worksheet(index, new_name)?;

        for ws in self.worksheets_mut() {
            let changes: Vec<(u32, u16, String)> = ws
                .formula_cells()
                .filter_map(|(row, col, text)| {
                    let rewritten = update_formula_sheet_references(text, &old_name, new_name)
                        .ok()?;
                    (rewritten != text).then(|| (row, col, rewritten))
                })
                .collect();
            for (row, col, text) in changes {
                ws.set_formula_text_at(row, col, &text)?;
            }
        }

        let mut updates = Vec::new();
        for range in self.named_ranges().iter() {
            let rewritten = update_formula_sheet_references(&range.address, &old_name, new_name)
                .map_err(|_| Error::EmptyInput("sheet name"))?;
            if rewritten != range.address {
                updates.push((range.name.clone(), range.scope.clone(), rewritten));
            }
        }
        for (name, scope, address) in updates {
            if let Some(range) = self.named_ranges_mut().get_exact_mut(&name, &scope) {
                range.set_address(address);
            }
        }
        Ok(())
    }

    fn delete_sheet(&mut self, name: &str) -> Result<()> {
        let index = self.sheet_index(name).ok_or_else(|| Error::SheetNotFound(name.into()))?;
        let removed = self.remove_worksheet(index)?;
        let removed_name = removed.name().to_string();

        // Names scoped to the removed sheet die with it.
        self.named_ranges_mut().remove_for_sheet(removed.sheet_id());

        for ws in self.worksheets_mut() {
            let changes: Vec<(u32, u16, String)> = ws
                .formula_cells()
                .filter_map(|(row, col, text)| {
                    let rewritten =
                        update_formula_deleted_sheet_references(text, &removed_name).ok()?;
                    (rewritten != text).then(|| (row, col, rewritten))
                })
                .collect();
            for (row, col, text) in changes {
                ws.set_formula_text_at(row, col, &text)?;
            }
        }

        let mut updates = Vec::new();
        for range in self.named_ranges().iter() {
            let rewritten = update_formula_deleted_sheet_references(&range.address, &removed_name)
                .map_err(|_| Error::EmptyInput("sheet name"))?;
            if rewritten != range.address {
                updates.push((range.name.clone(), range.scope.clone(), rewritten));
            }
        }
        for (name, scope, address) in updates {
            if let Some(range) = self.named_ranges_mut().get_exact_mut(&name, &scope) {
                range.set_address(address);
            }
        }
        Ok(())
    }
}

/// Steps (2) and (3) of an edit: rewrite formulas everywhere, then fan the
/// descriptor out to the collaborators
fn apply_edit(workbook: &mut Workbook, edit: StructuralEdit) {
    for ws in workbook.worksheets_mut() {
        let owner = ws.name().to_string();
        let changes: Vec<(u32, u16, String)> = ws
            .formula_cells()
            .filter_map(|(row, col, text)| {
                let rewritten = update_formula_references(text, &edit, &owner);
                (rewritten != text).then(|| (row, col, rewritten))
            })
            .collect();
        for (row, col, text) in changes {
            // The cell was seen as a formula one line up; the rewrite cannot
            // change that.
            let _ = ws.set_formula_text_at(row, col, &text);
        }
    }

    workbook.named_ranges_mut().on_structural_edit(&edit);
    for ws in workbook.worksheets_mut() {
        ws.on_structural_edit(&edit);
    }
}
