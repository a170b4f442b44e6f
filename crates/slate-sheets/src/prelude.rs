//! Convenient imports for common usage
//!
//! ```rust
//! use slate_sheets::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! workbook.insert_rows("Sheet1", 1, 2).unwrap();
//! ```

pub use crate::editing::{CopyOptions, WorkbookEditExt};
pub use slate_sheets_core::{
    Address, Area, CellAddress, CellComment, CellError, CellValue, Error, NameScope, NamedRange,
    Result, StructuralEdit, StructuralEditListener, StructuredReference, Workbook, Worksheet,
};
pub use slate_sheets_formula::{
    translate_for_copy, update_formula_deleted_sheet_references, update_formula_references,
    update_formula_sheet_references,
};
