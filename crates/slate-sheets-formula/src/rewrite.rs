//! Reference rewriting over formula text
//!
//! Pure, stateless functions that keep formula text consistent across
//! structural edits, sheet renames, sheet deletions and copies. They operate
//! on the scanner's segmentation: every candidate token is tried as an
//! address; a token that parses and whose effective sheet matches the edit
//! is rewritten, everything else passes through untouched. The functions
//! never fail on formula text they cannot tokenize - unrecognized fragments
//! are preserved as-is.

use slate_sheets_core::{format_prefix, split_address, Area, StructuralEdit};

use crate::error::{RewriteError, RewriteResult};
use crate::scanner::{scan, Segment};

/// Rewrite the references of a formula for a structural edit
///
/// `owner_sheet` is the sheet holding the formula: unqualified references
/// belong to it. References are rewritten only when their effective sheet is
/// the edited one; a reference consumed by a deletion becomes the `#REF!`
/// fragment in place. Absolute markers survive, and the two endpoints of a
/// range shift independently.
///
/// # Example
/// ```
/// use slate_sheets_core::StructuralEdit;
/// use slate_sheets_formula::update_formula_references;
///
/// let edit = StructuralEdit::insert_rows("Sheet1", 2, 3);
/// assert_eq!(
///     update_formula_references("=SUM(A1:A10)+B5", &edit, "Sheet1"),
///     "=SUM(A1:A13)+B8"
/// );
/// ```
pub fn update_formula_references(
    formula: &str,
    edit: &StructuralEdit,
    owner_sheet: &str,
) -> String {
    let segments = scan(formula);
    let mut out = String::with_capacity(formula.len());

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Token(token) if !is_function_name(&segments, i) => {
                match rewrite_token_for_edit(token, edit, owner_sheet) {
                    Some(rewritten) => out.push_str(&rewritten),
                    None => out.push_str(token),
                }
            }
            other => out.push_str(other.text()),
        }
    }
    out
}

/// Rename every reference to `old_sheet` into one to `new_sheet`
///
/// Quoting follows the original token: a quoted qualifier stays quoted, an
/// unquoted one is quoted only if the new name requires it. References to
/// other sheets and non-reference text are untouched.
///
/// # Example
/// ```
/// use slate_sheets_formula::update_formula_sheet_references;
///
/// assert_eq!(
///     update_formula_sheet_references("'Old Name'!B2+C3", "Old Name", "Renamed").unwrap(),
///     "'Renamed'!B2+C3"
/// );
/// ```
pub fn update_formula_sheet_references(
    formula: &str,
    old_sheet: &str,
    new_sheet: &str,
) -> RewriteResult<String> {
    if old_sheet.trim().is_empty() {
        return Err(RewriteError::EmptyArgument("old sheet name"));
    }
    if new_sheet.trim().is_empty() {
        return Err(RewriteError::EmptyArgument("new sheet name"));
    }

    let mut out = String::with_capacity(formula.len());
    for segment in scan(formula) {
        match segment {
            Segment::Token(token) => match sheet_reference_parts(token) {
                Some((book, sheet, rest)) if book.is_none() && matches_sheet(&sheet, old_sheet) => {
                    let force_quote = token.starts_with('\'');
                    out.push_str(&format_prefix(None, Some(new_sheet), force_quote));
                    out.push_str(rest);
                }
                _ => out.push_str(token),
            },
            other => out.push_str(other.text()),
        }
    }
    Ok(out)
}

/// Replace every reference to `deleted_sheet` with a `#REF!` fragment
///
/// The cell part of a compound token survives (`Sheet1!B2` becomes
/// `#REF!B2`), so formulas keep evaluating structurally. Surviving
/// sheet-qualified references are re-emitted quoted, and whitespace hanging
/// off other delimiters is dropped; runs of pure whitespace (the
/// intersection operator) are kept.
///
/// # Example
/// ```
/// use slate_sheets_formula::update_formula_deleted_sheet_references;
///
/// assert_eq!(
///     update_formula_deleted_sheet_references("CONCATENATE(Sheet1!B2, Sheet2!C3)", "sheet1")
///         .unwrap(),
///     "CONCATENATE(#REF!B2,'Sheet2'!C3)"
/// );
/// ```
pub fn update_formula_deleted_sheet_references(
    formula: &str,
    deleted_sheet: &str,
) -> RewriteResult<String> {
    if deleted_sheet.trim().is_empty() {
        return Err(RewriteError::EmptyArgument("deleted sheet name"));
    }

    let mut out = String::with_capacity(formula.len());
    for segment in scan(formula) {
        match segment {
            Segment::Token(token) => match sheet_reference_parts(token) {
                Some((book, sheet, rest)) if book.is_none() => {
                    if matches_sheet(&sheet, deleted_sheet) {
                        out.push_str("#REF!");
                    } else {
                        out.push_str(&format_prefix(None, Some(&sheet), true));
                    }
                    out.push_str(rest);
                }
                _ => out.push_str(token),
            },
            Segment::Delimiter(text) => {
                if text.chars().all(char::is_whitespace) {
                    out.push_str(text);
                } else {
                    out.extend(text.chars().filter(|c| !c.is_whitespace()));
                }
            }
            other => out.push_str(other.text()),
        }
    }
    Ok(out)
}

/// Translate the relative references of a formula for a copy
///
/// `row_delta`/`col_delta` is the destination-minus-source offset. Absolute
/// coordinates stay put; a relative coordinate shifted off the sheet turns
/// the reference into `#REF!`.
///
/// # Example
/// ```
/// use slate_sheets_formula::translate_for_copy;
///
/// assert_eq!(translate_for_copy("=A1+$B$2", 2, 1), "=B3+$B$2");
/// assert_eq!(translate_for_copy("=A1", -1, 0), "=#REF!");
/// ```
pub fn translate_for_copy(formula: &str, row_delta: i64, col_delta: i64) -> String {
    let segments = scan(formula);
    let mut out = String::with_capacity(formula.len());

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Token(token) if !is_function_name(&segments, i) => {
                match translate_token(token, row_delta, col_delta) {
                    Some(rewritten) => out.push_str(&rewritten),
                    None => out.push_str(token),
                }
            }
            other => out.push_str(other.text()),
        }
    }
    out
}

/// Whether the token at `index` is a function name (followed by `(`)
fn is_function_name(segments: &[Segment<'_>], index: usize) -> bool {
    match segments.get(index + 1) {
        Some(Segment::Delimiter(text)) => text
            .chars()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| c == '('),
        _ => false,
    }
}

/// Split a token into (book, sheet, rest) when it is sheet-qualified and the
/// rest parses as an area
fn sheet_reference_parts(token: &str) -> Option<(Option<u32>, String, &str)> {
    let (book, sheet, rest) = split_address(token).ok()?;
    let sheet = sheet?;
    Area::parse(rest).ok()?;
    Some((book, sheet, rest))
}

/// Case-insensitive sheet name comparison
fn matches_sheet(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Rewrite one token for a structural edit; `None` leaves it untouched
fn rewrite_token_for_edit(
    token: &str,
    edit: &StructuralEdit,
    owner_sheet: &str,
) -> Option<String> {
    let (book, sheet, rest) = split_address(token).ok()?;
    if book.is_some() {
        // External-workbook references never shift for local edits
        return None;
    }

    let effective_sheet = sheet.as_deref().unwrap_or(owner_sheet);
    if !edit.targets_sheet(effective_sheet) {
        return None;
    }

    let area = Area::parse(rest).ok()?;
    let shifted = if edit.is_row_edit() {
        if edit.is_insert {
            Some(area.add_row(edit.from_row, edit.row_count))
        } else {
            area.delete_row(edit.from_row, edit.row_count)
        }
    } else if edit.is_insert {
        Some(area.add_column(edit.from_col, edit.col_count))
    } else {
        area.delete_column(edit.from_col, edit.col_count)
    };

    let prefix = match &sheet {
        Some(name) => format_prefix(None, Some(name), token.starts_with('\'')),
        None => String::new(),
    };
    match shifted {
        Some(area) => Some(format!("{}{}", prefix, area)),
        None => Some(format!("{}#REF!", prefix)),
    }
}

/// Translate one token for a copy; `None` leaves it untouched
fn translate_token(token: &str, row_delta: i64, col_delta: i64) -> Option<String> {
    let (book, sheet, rest) = split_address(token).ok()?;
    if book.is_some() {
        return None;
    }
    let area = Area::parse(rest).ok()?;

    let prefix = match &sheet {
        Some(name) => format_prefix(None, Some(name), token.starts_with('\'')),
        None => String::new(),
    };
    match area.translate(row_delta, col_delta) {
        Some(area) => Some(format!("{}{}", prefix, area)),
        None => Some(format!("{}#REF!", prefix)),
    }
}
