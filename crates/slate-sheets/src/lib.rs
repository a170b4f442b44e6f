//! # slate-sheets
//!
//! The in-memory representation layer of a spreadsheet engine: a sparse,
//! paged cell store over the full 1,048,576 × 16,384 extent, the A1
//! address/range grammar, and a reference-rewriting engine that keeps
//! formula text and named ranges consistent when rows or columns are
//! inserted, deleted, or copied.
//!
//! Formula *evaluation*, file formats, and rendering are out of scope;
//! everything here is the structural core those layers build on.
//!
//! ## Example
//!
//! ```rust
//! use slate_sheets::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Price").unwrap();
//! sheet.set_cell_value("A2", 12.5).unwrap();
//! sheet.set_cell_formula("B2", "=A2*2").unwrap();
//!
//! // Insert a row above the data: the formula follows its cells.
//! workbook.insert_rows("Sheet1", 2, 1).unwrap();
//!
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.get_formula_at(3, 2), Some("=A3*2"));
//! ```

pub mod editing;
pub mod prelude;

pub use editing::{CopyOptions, WorkbookEditExt};

// Re-export core types
pub use slate_sheets_core::{
    is_valid_cell_address,
    sheet_needs_quoting,
    split_address,
    Address,
    Area,
    // Cell types
    CellAddress,
    // Comments
    CellComment,
    CellError,
    CellStore,
    CellValue,
    CommentCollection,
    // Drawings
    Drawing,
    DrawingCollection,
    // Error types
    Error,
    ExternalReference,
    ExternalReferenceCollection,
    ItemSpecifiers,
    NameScope,
    // Named ranges
    NamedRange,
    NamedRangeCollection,
    Result,
    SharedString,
    // Sparklines
    SparklineGroup,
    SparklineGroupCollection,
    // Structural edit contract
    StructuralEdit,
    StructuralEditListener,
    // Structured table references
    StructuredReference,
    // Tables
    Table,
    TableCollection,
    Workbook,
    Worksheet,
    MAX_COLS,
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export the rewriter
pub use slate_sheets_formula::{
    translate_for_copy, update_formula_deleted_sheet_references, update_formula_references,
    update_formula_sheet_references, RewriteError, RewriteResult,
};
