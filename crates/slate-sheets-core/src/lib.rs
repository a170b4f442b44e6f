//! # slate-sheets-core
//!
//! Core data structures for the slate-sheets spreadsheet representation
//! layer.
//!
//! This crate provides the fundamental types:
//! - [`CellValue`] and [`CellError`] - cell contents and error literals
//! - [`CellAddress`], [`Area`] and [`Address`] - the A1 address grammar,
//!   including full-row/column bands, multi-area lists, sheet qualifiers and
//!   external-workbook brackets
//! - [`StructuredReference`] - `Table[[#Spec],[Col]]` table references
//! - [`CellStore`] - the paged sparse cell container with amortized bulk
//!   row/column shifts
//! - [`NamedRangeCollection`] - workbook/worksheet-scoped defined names
//! - [`Workbook`], [`Worksheet`] - the document aggregates
//! - [`StructuralEdit`] / [`StructuralEditListener`] - the notification
//!   contract collaborators use to keep their stored addresses consistent
//!
//! ## Example
//!
//! ```rust
//! use slate_sheets_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//!
//! // Or using row/column indices (1-based)
//! sheet.set_cell_value_at(2, 1, CellValue::text("World")).unwrap();
//! ```

pub mod address;
pub mod area;
pub mod cell;
pub mod comment;
pub mod drawing;
pub mod editing;
pub mod error;
pub mod external;
pub mod named_range;
pub mod sparkline;
pub mod structured;
pub mod table;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use address::{
    format_prefix, is_valid_cell_address, sheet_needs_quoting, split_address, Address,
};
pub use area::Area;
pub use cell::{CellAddress, CellError, CellStore, CellValue, Enumerate, SharedString};
pub use comment::{CellComment, CommentCollection};
pub use drawing::{Drawing, DrawingCollection};
pub use editing::{StructuralEdit, StructuralEditListener};
pub use error::{Error, Result};
pub use external::{ExternalReference, ExternalReferenceCollection};
pub use named_range::{NameScope, NamedRange, NamedRangeCollection};
pub use sparkline::{SparklineGroup, SparklineGroupCollection};
pub use structured::{ItemSpecifiers, StructuredReference};
pub use table::{Table, TableCollection};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
