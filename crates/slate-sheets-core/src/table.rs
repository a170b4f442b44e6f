//! Worksheet tables
//!
//! A table names a rectangular area and its columns; the column names feed
//! the structured-reference grammar (`Table[Amount]`). The area follows
//! structural edits like any other stored address.

use crate::area::Area;
use crate::editing::StructuralEdit;
use crate::error::{Error, Result};

/// A worksheet table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name, unique within the workbook
    pub name: String,
    /// The rectangle covered by the table, header row included
    pub area: Area,
    /// Column names, left to right
    pub columns: Vec<String>,
    /// Whether the last row is a totals row
    pub totals_row: bool,
}

impl Table {
    /// Create a table over an area with the given column names
    pub fn new(name: impl Into<String>, area: Area, columns: Vec<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyInput("table name"));
        }
        Ok(Self {
            name,
            area,
            columns,
            totals_row: false,
        })
    }

    /// Enable the totals row
    pub fn with_totals_row(mut self) -> Self {
        self.totals_row = true;
        self
    }

    /// Whether the table has a column with this name (case-insensitive)
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}

/// The tables of one worksheet
#[derive(Debug, Default)]
pub struct TableCollection {
    tables: Vec<Table>,
}

impl TableCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table
    pub fn add(&mut self, table: Table) -> Result<()> {
        if self
            .tables
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&table.name))
        {
            return Err(Error::InvalidName(format!(
                "table '{}' already exists",
                table.name
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Look up a table by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Remove a table by name
    pub fn remove(&mut self, name: &str) -> Option<Table> {
        let idx = self
            .tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))?;
        Some(self.tables.remove(idx))
    }

    /// Iterate over all tables
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether there are no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Shift table areas for a structural edit
    ///
    /// A table whose entire area falls inside a deleted band is removed.
    pub(crate) fn apply_edit(&mut self, edit: &StructuralEdit) {
        self.tables.retain_mut(|table| {
            let shifted = if edit.is_row_edit() {
                if edit.is_insert {
                    Some(table.area.add_row(edit.from_row, edit.row_count))
                } else {
                    table.area.delete_row(edit.from_row, edit.row_count)
                }
            } else if edit.is_insert {
                Some(table.area.add_column(edit.from_col, edit.col_count))
            } else {
                table.area.delete_column(edit.from_col, edit.col_count)
            };
            match shifted {
                Some(area) => {
                    table.area = area;
                    true
                }
                None => false,
            }
        });
    }
}
