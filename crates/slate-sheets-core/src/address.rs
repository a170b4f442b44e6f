//! Full reference addresses
//!
//! An [`Address`] is what a named range or a formula reference token holds:
//! an optional external-workbook bracket (`[2]`), an optional worksheet
//! qualifier (quoted when the name needs it), and one or more comma-separated
//! [`Area`]s. `'My Sheet'!A1:B3`, `[1]Data!C:D` and `C3,D3:D5,E5` are all
//! addresses.

use crate::area::Area;
use crate::cell::CellAddress;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed reference address: workbook/sheet qualifiers plus one or more areas
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    external_book: Option<u32>,
    sheet: Option<String>,
    areas: Vec<Area>,
}

impl Address {
    /// Create an address from a single area, with no qualifiers
    pub fn from_area(area: Area) -> Self {
        Address {
            external_book: None,
            sheet: None,
            areas: vec![area],
        }
    }

    /// Create a sheet-qualified address from a single area
    pub fn with_sheet<S: Into<String>>(sheet: S, area: Area) -> Self {
        Address {
            external_book: None,
            sheet: Some(sheet.into()),
            areas: vec![area],
        }
    }

    /// Parse an address, including qualifiers and multi-area lists
    ///
    /// # Examples
    /// ```
    /// use slate_sheets_core::Address;
    ///
    /// let a = Address::parse("'My Sheet'!A1:B3").unwrap();
    /// assert_eq!(a.sheet(), Some("My Sheet"));
    ///
    /// let a = Address::parse("C3,D3:D5,E5").unwrap();
    /// assert_eq!(a.areas().len(), 3);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let mut external_book = None;
        let mut sheet: Option<String> = None;
        let mut areas = Vec::new();

        for segment in split_areas(text) {
            let segment = segment.trim();
            let (book, seg_sheet, remainder) = split_address(segment)?;

            if let Some(book) = book {
                match external_book {
                    None => external_book = Some(book),
                    Some(existing) if existing == book => {}
                    Some(_) => {
                        return Err(Error::InvalidAddress(format!(
                            "conflicting workbook ids in '{}'",
                            text
                        )))
                    }
                }
            }
            if let Some(seg_sheet) = seg_sheet {
                match &sheet {
                    None => sheet = Some(seg_sheet),
                    Some(existing) if existing.eq_ignore_ascii_case(&seg_sheet) => {}
                    Some(_) => {
                        return Err(Error::InvalidAddress(format!(
                            "conflicting sheet names in '{}'",
                            text
                        )))
                    }
                }
            }

            areas.push(Area::parse(remainder)?);
        }

        Ok(Address {
            external_book,
            sheet,
            areas,
        })
    }

    /// The external workbook id, if the address carries a `[n]` bracket
    pub fn external_book(&self) -> Option<u32> {
        self.external_book
    }

    /// The worksheet name, if the address is sheet-qualified
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    /// The areas of the address (at least one)
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Whether the address is a single unqualified or sheet-qualified cell
    pub fn is_single_cell(&self) -> bool {
        self.areas.len() == 1 && self.areas[0].is_single_cell()
    }

    // === Structural edits ===

    /// Apply a row insertion to every area; see [`Area::add_row`]
    pub fn add_row(&self, pos: u32, count: u32) -> Address {
        Address {
            areas: self.areas.iter().map(|a| a.add_row(pos, count)).collect(),
            ..self.clone()
        }
    }

    /// Apply a column insertion to every area; see [`Area::add_column`]
    pub fn add_column(&self, pos: u16, count: u16) -> Address {
        Address {
            areas: self.areas.iter().map(|a| a.add_column(pos, count)).collect(),
            ..self.clone()
        }
    }

    /// Apply a row deletion to every area
    ///
    /// Areas consumed by the deleted band are dropped; `None` means the whole
    /// address was consumed, which callers must treat as "reference removed".
    pub fn delete_row(&self, pos: u32, count: u32) -> Option<Address> {
        let areas: Vec<Area> = self
            .areas
            .iter()
            .filter_map(|a| a.delete_row(pos, count))
            .collect();
        if areas.is_empty() {
            None
        } else {
            Some(Address {
                areas,
                ..self.clone()
            })
        }
    }

    /// Apply a column deletion to every area; see [`Address::delete_row`]
    pub fn delete_column(&self, pos: u16, count: u16) -> Option<Address> {
        let areas: Vec<Area> = self
            .areas
            .iter()
            .filter_map(|a| a.delete_column(pos, count))
            .collect();
        if areas.is_empty() {
            None
        } else {
            Some(Address {
                areas,
                ..self.clone()
            })
        }
    }

    /// Translate every area for a copy; `None` if any area leaves the sheet
    pub fn translate(&self, row_delta: i64, col_delta: i64) -> Option<Address> {
        let areas: Option<Vec<Area>> = self
            .areas
            .iter()
            .map(|a| a.translate(row_delta, col_delta))
            .collect();
        Some(Address {
            areas: areas?,
            ..self.clone()
        })
    }

    /// The qualifier prefix (`'Sheet name'!`, `[1]Data!`, ...) or an empty string
    pub fn prefix(&self) -> String {
        format_prefix(self.external_book, self.sheet.as_deref(), false)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix();
        for (i, area) in self.areas.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", prefix, area)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split a full address into its workbook id, worksheet name, and remainder
///
/// Recognizes a leading `[n]` workbook bracket and a quoted or unquoted
/// worksheet name terminated by `!`; an embedded `''` inside a quoted name is
/// an escaped single quote. Text without a sheet separator comes back with
/// both qualifiers `None`.
pub fn split_address(full: &str) -> Result<(Option<u32>, Option<String>, &str)> {
    if let Some(rest) = full.strip_prefix('\'') {
        // Quoted sheet name, `''` escapes a quote
        let mut name = String::new();
        let mut iter = rest.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            if c != '\'' {
                name.push(c);
                continue;
            }
            if let Some(&(_, '\'')) = iter.peek() {
                name.push('\'');
                iter.next();
                continue;
            }
            let after = &rest[i + 1..];
            let remainder = after.strip_prefix('!').ok_or_else(|| {
                Error::InvalidAddress(format!("expected '!' after quoted sheet name in '{}'", full))
            })?;
            let (book, name) = extract_book_prefix(&name)?;
            return Ok((book, Some(name), remainder));
        }
        Err(Error::InvalidAddress(format!(
            "unterminated quoted sheet name in '{}'",
            full
        )))
    } else {
        let (book, rest) = match parse_book_bracket(full)? {
            Some((book, rest)) => (Some(book), rest),
            None => (None, full),
        };
        match rest.find('!') {
            Some(i) => {
                let sheet = &rest[..i];
                // `#REF!` is an error literal, not a sheet qualifier
                if sheet.is_empty() || sheet == "#REF" {
                    return Ok((None, None, full));
                }
                Ok((book, Some(sheet.to_string()), &rest[i + 1..]))
            }
            None => Ok((book, None, rest)),
        }
    }
}

/// Validate a single-cell address: a bare or sheet-qualified cell
///
/// Range syntax, multi-area lists and workbook brackets are all rejected.
pub fn is_valid_cell_address(text: &str) -> bool {
    let Ok((book, _sheet, remainder)) = split_address(text.trim()) else {
        return false;
    };
    book.is_none() && CellAddress::parse(remainder).is_ok()
}

/// Whether a worksheet name must be quoted when formatted into an address
pub fn sheet_needs_quoting(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        if first.is_ascii_digit() {
            return true;
        }
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
    {
        return true;
    }
    // Names that read as cell references (e.g. "A1") are quoted too
    CellAddress::parse(name).is_ok()
}

/// Format a sheet qualifier prefix, quoting when the name requires it
///
/// `force_quote` always quotes, which is how rewritten references are
/// re-emitted after a sheet is renamed or deleted.
pub fn format_prefix(book: Option<u32>, sheet: Option<&str>, force_quote: bool) -> String {
    let Some(sheet) = sheet else {
        return match book {
            Some(book) => format!("[{}]", book),
            None => String::new(),
        };
    };
    let core = match book {
        Some(book) => format!("[{}]{}", book, sheet),
        None => sheet.to_string(),
    };
    if force_quote || sheet_needs_quoting(sheet) {
        format!("'{}'!", core.replace('\'', "''"))
    } else {
        format!("{}!", core)
    }
}

/// Split a multi-area address on commas, respecting quoted sheet names
pub(crate) fn split_areas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            ',' if !in_quote => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a leading `[n]` workbook bracket, returning the id and the rest
fn parse_book_bracket(s: &str) -> Result<Option<(u32, &str)>> {
    let Some(rest) = s.strip_prefix('[') else {
        return Ok(None);
    };
    let Some(end) = rest.find(']') else {
        return Err(Error::InvalidAddress(format!(
            "unterminated workbook bracket in '{}'",
            s
        )));
    };
    let id: u32 = rest[..end]
        .parse()
        .map_err(|_| Error::InvalidAddress(format!("invalid workbook id in '{}'", s)))?;
    Ok(Some((id, &rest[end + 1..])))
}

/// Pull a `[n]` bracket out of an unquoted sheet name (`[1]Sheet 1`)
fn extract_book_prefix(name: &str) -> Result<(Option<u32>, String)> {
    match parse_book_bracket(name)? {
        Some((book, rest)) => Ok((Some(book), rest.to_string())),
        None => Ok((None, name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let a = Address::parse("A1:B3").unwrap();
        assert_eq!(a.sheet(), None);
        assert_eq!(a.external_book(), None);
        assert_eq!(a.areas().len(), 1);
        assert_eq!(a.to_string(), "A1:B3");
    }

    #[test]
    fn test_parse_sheet_qualified() {
        let a = Address::parse("Sheet1!A1").unwrap();
        assert_eq!(a.sheet(), Some("Sheet1"));
        assert_eq!(a.to_string(), "Sheet1!A1");

        let a = Address::parse("'My Sheet'!A1:B3").unwrap();
        assert_eq!(a.sheet(), Some("My Sheet"));
        assert_eq!(a.to_string(), "'My Sheet'!A1:B3");
    }

    #[test]
    fn test_parse_escaped_quote() {
        let a = Address::parse("'It''s here'!C3").unwrap();
        assert_eq!(a.sheet(), Some("It's here"));
        assert_eq!(a.to_string(), "'It''s here'!C3");
    }

    #[test]
    fn test_parse_external_book() {
        let a = Address::parse("[2]Data!A1").unwrap();
        assert_eq!(a.external_book(), Some(2));
        assert_eq!(a.sheet(), Some("Data"));
        assert_eq!(a.to_string(), "[2]Data!A1");

        let a = Address::parse("'[2]Sales 2024'!A1:B3").unwrap();
        assert_eq!(a.external_book(), Some(2));
        assert_eq!(a.sheet(), Some("Sales 2024"));
        assert_eq!(a.to_string(), "'[2]Sales 2024'!A1:B3");
    }

    #[test]
    fn test_parse_multi_area() {
        let a = Address::parse("C3,D3:D5,E5").unwrap();
        assert_eq!(a.areas().len(), 3);
        assert_eq!(a.to_string(), "C3,D3:D5,E5");

        let a = Address::parse("'My Sheet'!C3,'My Sheet'!D3:D5").unwrap();
        assert_eq!(a.sheet(), Some("My Sheet"));
        assert_eq!(a.to_string(), "'My Sheet'!C3,'My Sheet'!D3:D5");
    }

    #[test]
    fn test_parse_full_bands() {
        assert_eq!(Address::parse("C:D").unwrap().to_string(), "C:D");
        assert_eq!(Address::parse("2:3").unwrap().to_string(), "2:3");
        assert_eq!(
            Address::parse("Sheet1!$A:$C").unwrap().to_string(),
            "Sheet1!$A:$C"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("'Unterminated!A1").is_err());
        assert!(Address::parse("Sheet1!").is_err());
        assert!(Address::parse("SUM").is_err());
        assert!(Address::parse("5").is_err());
        assert!(Address::parse("#REF!").is_err());
        assert!(Address::parse("Sheet1!A1,Sheet2!B2").is_err()); // conflicting sheets
    }

    #[test]
    fn test_is_valid_cell_address() {
        assert!(is_valid_cell_address("A1"));
        assert!(is_valid_cell_address("$XFD$1048576"));
        assert!(is_valid_cell_address("Sheet1!B2"));
        assert!(is_valid_cell_address("'My Sheet'!B2"));

        assert!(!is_valid_cell_address("A1:B2"));
        assert!(!is_valid_cell_address("C:D"));
        assert!(!is_valid_cell_address("A1,B2"));
        assert!(!is_valid_cell_address("[1]Sheet1!A1")); // external books are not plain cells
        assert!(!is_valid_cell_address("Sheet1"));
        assert!(!is_valid_cell_address(""));
    }

    #[test]
    fn test_split_address() {
        let (book, sheet, rest) = split_address("Sheet1!A1:B2").unwrap();
        assert_eq!(book, None);
        assert_eq!(sheet.as_deref(), Some("Sheet1"));
        assert_eq!(rest, "A1:B2");

        let (book, sheet, rest) = split_address("'A ''quoted'' name'!C3").unwrap();
        assert_eq!(book, None);
        assert_eq!(sheet.as_deref(), Some("A 'quoted' name"));
        assert_eq!(rest, "C3");

        let (book, sheet, rest) = split_address("[3]Ext!A1").unwrap();
        assert_eq!(book, Some(3));
        assert_eq!(sheet.as_deref(), Some("Ext"));
        assert_eq!(rest, "A1");

        let (book, sheet, rest) = split_address("A1").unwrap();
        assert_eq!((book, sheet), (None, None));
        assert_eq!(rest, "A1");

        // #REF! is an error literal, not a sheet qualifier
        let (book, sheet, rest) = split_address("#REF!B2").unwrap();
        assert_eq!((book, sheet), (None, None));
        assert_eq!(rest, "#REF!B2");
    }

    #[test]
    fn test_add_row_and_column() {
        let a = Address::parse("A1:B3").unwrap();
        assert_eq!(a.add_row(2, 4).to_string(), "A1:B7");
        assert_eq!(a.add_column(2, 4).to_string(), "A1:F3");
    }

    #[test]
    fn test_delete_collapse() {
        let a = Address::parse("A1:B3").unwrap();
        assert_eq!(a.delete_column(2, 1).unwrap().to_string(), "A1:A3");
        assert_eq!(a.delete_row(2, 2).unwrap().to_string(), "A1:B1");
        assert!(a.delete_row(1, 3).is_none());
        assert!(a.delete_column(1, 2).is_none());
    }

    #[test]
    fn test_delete_drops_consumed_areas() {
        let a = Address::parse("A1,A5,A9").unwrap();
        let shifted = a.delete_row(4, 2).unwrap();
        assert_eq!(shifted.to_string(), "A1,A7");
    }

    #[test]
    fn test_structural_ops_preserve_qualifiers() {
        let a = Address::parse("'My Sheet'!B2:C4").unwrap();
        assert_eq!(a.add_row(1, 1).to_string(), "'My Sheet'!B3:C5");
        assert_eq!(
            a.delete_row(3, 1).unwrap().to_string(),
            "'My Sheet'!B2:C3"
        );
    }

    #[test]
    fn test_sheet_needs_quoting() {
        assert!(!sheet_needs_quoting("Sheet1"));
        assert!(!sheet_needs_quoting("Données"));
        assert!(sheet_needs_quoting("My Sheet"));
        assert!(sheet_needs_quoting("1stQuarter"));
        assert!(sheet_needs_quoting("P&L"));
        assert!(sheet_needs_quoting("A1")); // reads as a cell reference
        assert!(sheet_needs_quoting(""));
    }

    #[test]
    fn test_structural_equality() {
        let a = Address::parse("A1:B3").unwrap();
        let b = Address::parse("A1:B3").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Address::parse("$A$1:B3").unwrap());
        assert_ne!(a, Address::parse("Sheet1!A1:B3").unwrap());
    }
}
