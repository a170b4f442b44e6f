//! # slate-sheets-formula
//!
//! The reference rewriter for slate-sheets: a quote-aware formula text
//! scanner and the pure rewrite functions built on it.
//!
//! Formula text is never parsed into an AST. A three-state scanner
//! (normal / string literal / quoted sheet name) separates candidate
//! reference tokens from everything else; tokens that parse as addresses
//! are rewritten, all other text passes through byte-for-byte. This is
//! sufficient for structural-edit consistency and far simpler to verify
//! than a full parser.
//!
//! ## Example
//!
//! ```rust
//! use slate_sheets_core::StructuralEdit;
//! use slate_sheets_formula::update_formula_references;
//!
//! let edit = StructuralEdit::insert_rows("Sheet1", 3, 2);
//! let rewritten = update_formula_references("=SUM(A1:A10)", &edit, "Sheet1");
//! assert_eq!(rewritten, "=SUM(A1:A12)");
//! ```

pub mod error;
pub mod rewrite;
pub mod scanner;

pub use error::{RewriteError, RewriteResult};
pub use rewrite::{
    translate_for_copy, update_formula_deleted_sheet_references,
    update_formula_references, update_formula_sheet_references,
};
pub use scanner::{scan, Segment};
