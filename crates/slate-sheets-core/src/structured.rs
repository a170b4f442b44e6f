//! Structured table references
//!
//! Parses Excel's structured reference syntax used in table formulas:
//! - `Table[Amount]` - a column (data rows, the default)
//! - `Table[#Headers]` - an item specifier alone
//! - `Table[[#Totals],[Amount]]` - specifier plus column
//! - `Table[[Q1]:[Q4]]` - a column range
//! - `Table[@Amount]` - the current row of a column
//!
//! Specifier keywords are case-insensitive. Combinations Excel disallows
//! (e.g. `#Data` with `#This Row`) still parse; validity is a separate query
//! via [`StructuredReference::has_valid_item_specifiers`].

use crate::error::{Error, Result};
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Item specifiers of a structured reference
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemSpecifiers: u8 {
        /// `#All` - headers, data and totals
        const ALL = 0b0000_0001;
        /// `#Data` - data rows only (the default)
        const DATA = 0b0000_0010;
        /// `#Headers` - the header row
        const HEADERS = 0b0000_0100;
        /// `#Totals` - the totals row
        const TOTALS = 0b0000_1000;
        /// `#This Row` / `@` - the intersecting row
        const THIS_ROW = 0b0001_0000;
    }
}

impl ItemSpecifiers {
    /// Parse a `#Keyword` specifier (case-insensitive); `None` if unknown
    fn from_keyword(keyword: &str) -> Option<ItemSpecifiers> {
        let lower = keyword.to_ascii_lowercase();
        match lower.as_str() {
            "#all" => Some(ItemSpecifiers::ALL),
            "#data" => Some(ItemSpecifiers::DATA),
            "#headers" => Some(ItemSpecifiers::HEADERS),
            "#totals" => Some(ItemSpecifiers::TOTALS),
            "#this row" | "#thisrow" => Some(ItemSpecifiers::THIS_ROW),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            ItemSpecifiers::ALL => "#All",
            ItemSpecifiers::DATA => "#Data",
            ItemSpecifiers::HEADERS => "#Headers",
            ItemSpecifiers::TOTALS => "#Totals",
            ItemSpecifiers::THIS_ROW => "#This Row",
            _ => "",
        }
    }
}

/// A parsed structured table reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuredReference {
    /// The table name
    pub table: String,
    /// First referenced column; empty for specifier-only forms like `Table[#All]`
    pub start_column: String,
    /// Second column of a `[Col1]:[Col2]` range
    pub end_column: Option<String>,
    /// The item specifiers; [`ItemSpecifiers::DATA`] when none were written
    pub item_specifiers: ItemSpecifiers,
}

impl StructuredReference {
    /// Parse a structured reference
    ///
    /// # Examples
    /// ```
    /// use slate_sheets_core::{ItemSpecifiers, StructuredReference};
    ///
    /// let r = StructuredReference::parse("Sales[Amount]").unwrap();
    /// assert_eq!(r.table, "Sales");
    /// assert_eq!(r.start_column, "Amount");
    /// assert_eq!(r.item_specifiers, ItemSpecifiers::DATA);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput("structured reference text"));
        }

        let bracket = text.find('[').ok_or_else(|| {
            Error::InvalidStructuredReference(format!("missing '[' in '{}'", text))
        })?;
        let table = text[..bracket].trim();
        if !is_valid_table_name(table) {
            return Err(Error::InvalidStructuredReference(format!(
                "invalid table name in '{}'",
                text
            )));
        }
        if !text.ends_with(']') {
            return Err(Error::InvalidStructuredReference(format!(
                "missing closing ']' in '{}'",
                text
            )));
        }

        let inner = &text[bracket + 1..text.len() - 1];
        let mut reference = StructuredReference {
            table: table.to_string(),
            start_column: String::new(),
            end_column: None,
            item_specifiers: ItemSpecifiers::empty(),
        };

        if inner.trim_start().starts_with('[') {
            reference.parse_item_list(inner, text)?;
        } else {
            reference.parse_single_item(inner.trim(), text)?;
        }

        // No written specifier means the data rows
        if reference.item_specifiers.is_empty() {
            reference.item_specifiers = ItemSpecifiers::DATA;
        }
        Ok(reference)
    }

    /// Whether the specifier combination is one Excel allows
    ///
    /// Valid: any single specifier alone, `#Data` + `#Headers`, or
    /// `#Data` + `#Totals`. Everything else (e.g. `#All` with anything,
    /// `#This Row` with `#Data`, `#Headers` with `#Totals`) is invalid, even
    /// though it parses.
    pub fn has_valid_item_specifiers(&self) -> bool {
        let flags = self.item_specifiers;
        flags.bits().count_ones() == 1
            || flags == ItemSpecifiers::DATA | ItemSpecifiers::HEADERS
            || flags == ItemSpecifiers::DATA | ItemSpecifiers::TOTALS
    }

    /// Whether the reference names a column range (`[Col1]:[Col2]`)
    pub fn is_column_range(&self) -> bool {
        self.end_column.is_some()
    }

    /// Parse the single-item abbreviations: `Table[Col]`, `Table[#Spec]`, `Table[@Col]`
    fn parse_single_item(&mut self, item: &str, full: &str) -> Result<()> {
        if let Some(rest) = item.strip_prefix('@') {
            self.item_specifiers |= ItemSpecifiers::THIS_ROW;
            let rest = rest.trim();
            if !rest.is_empty() {
                self.start_column = rest.to_string();
            }
            return Ok(());
        }
        if item.starts_with('#') {
            let spec = ItemSpecifiers::from_keyword(item).ok_or_else(|| {
                Error::InvalidStructuredReference(format!(
                    "unknown item specifier '{}' in '{}'",
                    item, full
                ))
            })?;
            self.item_specifiers |= spec;
            return Ok(());
        }
        if item.is_empty() {
            return Ok(());
        }
        self.start_column = item.to_string();
        Ok(())
    }

    /// Parse the bracketed item list: `[#Spec1],[#Spec2],...,[Col]:[Col2]`
    fn parse_item_list(&mut self, inner: &str, full: &str) -> Result<()> {
        let mut rest = inner.trim();
        let mut range_continues = false;
        while !rest.is_empty() {
            let Some(after_open) = rest.strip_prefix('[') else {
                return Err(Error::InvalidStructuredReference(format!(
                    "expected '[' in item list of '{}'",
                    full
                )));
            };
            let Some(close) = after_open.find(']') else {
                return Err(Error::InvalidStructuredReference(format!(
                    "unterminated item in '{}'",
                    full
                )));
            };
            let item = after_open[..close].trim();

            if item.starts_with('#') || item.starts_with('@') {
                self.parse_single_item(item, full)?;
            } else if self.start_column.is_empty() && !range_continues {
                self.start_column = item.to_string();
            } else if range_continues && self.end_column.is_none() {
                self.end_column = Some(item.to_string());
            } else {
                return Err(Error::InvalidStructuredReference(format!(
                    "unexpected column item '{}' in '{}'",
                    item, full
                )));
            }

            rest = after_open[close + 1..].trim_start();
            range_continues = false;
            if let Some(r) = rest.strip_prefix(',') {
                rest = r.trim_start();
            } else if let Some(r) = rest.strip_prefix(':') {
                range_continues = true;
                rest = r.trim_start();
            } else if !rest.is_empty() {
                return Err(Error::InvalidStructuredReference(format!(
                    "unexpected separator in '{}'",
                    full
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for StructuredReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.table)?;
        let only_data = self.item_specifiers == ItemSpecifiers::DATA;
        let mut wrote = false;

        if only_data && !self.start_column.is_empty() && self.end_column.is_none() {
            // Abbreviated column form
            write!(f, "{}]", self.start_column)?;
            return Ok(());
        }

        for spec in [
            ItemSpecifiers::ALL,
            ItemSpecifiers::DATA,
            ItemSpecifiers::HEADERS,
            ItemSpecifiers::TOTALS,
            ItemSpecifiers::THIS_ROW,
        ] {
            if self.item_specifiers.contains(spec) {
                if wrote {
                    write!(f, ",")?;
                }
                write!(f, "[{}]", spec.keyword())?;
                wrote = true;
            }
        }
        if !self.start_column.is_empty() {
            if wrote {
                write!(f, ",")?;
            }
            write!(f, "[{}]", self.start_column)?;
            if let Some(end) = &self.end_column {
                write!(f, ":[{}]", end)?;
            }
        }
        write!(f, "]")
    }
}

impl FromStr for StructuredReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Table names contain letters, digits, underscores and periods, and cannot
/// start with a digit
fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => return false,
        Some(first) if first.is_ascii_digit() => return false,
        Some(first) if !(first.is_alphanumeric() || first == '_') => return false,
        _ => {}
    }
    name.chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_defaults_to_data() {
        let r = StructuredReference::parse("Sales[Amount]").unwrap();
        assert_eq!(r.table, "Sales");
        assert_eq!(r.start_column, "Amount");
        assert_eq!(r.end_column, None);
        assert_eq!(r.item_specifiers, ItemSpecifiers::DATA);
        assert!(r.has_valid_item_specifiers());
    }

    #[test]
    fn test_single_specifiers() {
        for (text, spec) in [
            ("T[#All]", ItemSpecifiers::ALL),
            ("T[#Data]", ItemSpecifiers::DATA),
            ("T[#Headers]", ItemSpecifiers::HEADERS),
            ("T[#Totals]", ItemSpecifiers::TOTALS),
            ("T[#This Row]", ItemSpecifiers::THIS_ROW),
        ] {
            let r = StructuredReference::parse(text).unwrap();
            assert_eq!(r.item_specifiers, spec, "{}", text);
            assert!(r.start_column.is_empty());
            assert!(r.has_valid_item_specifiers(), "{}", text);
        }
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let r = StructuredReference::parse("T[#DATA]").unwrap();
        assert_eq!(r.item_specifiers, ItemSpecifiers::DATA);
        let r = StructuredReference::parse("T[[#headers],[Amount]]").unwrap();
        assert_eq!(r.item_specifiers, ItemSpecifiers::HEADERS);
        assert_eq!(r.start_column, "Amount");
    }

    #[test]
    fn test_compound_specifier_and_column() {
        let r = StructuredReference::parse("Sales[[#Totals],[Amount]]").unwrap();
        assert_eq!(r.item_specifiers, ItemSpecifiers::TOTALS);
        assert_eq!(r.start_column, "Amount");
        assert!(r.has_valid_item_specifiers());
    }

    #[test]
    fn test_column_range() {
        let r = StructuredReference::parse("Sales[[Q1]:[Q4]]").unwrap();
        assert_eq!(r.start_column, "Q1");
        assert_eq!(r.end_column.as_deref(), Some("Q4"));
        assert_eq!(r.item_specifiers, ItemSpecifiers::DATA);
        assert!(r.is_column_range());
    }

    #[test]
    fn test_specifiers_with_column_range() {
        let r = StructuredReference::parse("Sales[[#Data],[#Headers],[Q1]:[Q4]]").unwrap();
        assert_eq!(
            r.item_specifiers,
            ItemSpecifiers::DATA | ItemSpecifiers::HEADERS
        );
        assert_eq!(r.start_column, "Q1");
        assert_eq!(r.end_column.as_deref(), Some("Q4"));
        assert!(r.has_valid_item_specifiers());
    }

    #[test]
    fn test_this_row_shorthand() {
        let r = StructuredReference::parse("Sales[@]").unwrap();
        assert_eq!(r.item_specifiers, ItemSpecifiers::THIS_ROW);
        assert!(r.start_column.is_empty());

        let r = StructuredReference::parse("Sales[@Amount]").unwrap();
        assert_eq!(r.item_specifiers, ItemSpecifiers::THIS_ROW);
        assert_eq!(r.start_column, "Amount");
    }

    #[test]
    fn test_invalid_combinations_still_parse() {
        let r = StructuredReference::parse("T[[#Data],[#This Row]]").unwrap();
        assert!(!r.has_valid_item_specifiers());

        let r = StructuredReference::parse("T[[#Headers],[#Totals]]").unwrap();
        assert!(!r.has_valid_item_specifiers());

        let r = StructuredReference::parse("T[[#All],[#Data]]").unwrap();
        assert!(!r.has_valid_item_specifiers());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            StructuredReference::parse(""),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            StructuredReference::parse("   "),
            Err(Error::EmptyInput(_))
        ));
        assert!(StructuredReference::parse("123Table[Col]").is_err());
        assert!(StructuredReference::parse("T[Col").is_err());
        assert!(StructuredReference::parse("T[#Bogus]").is_err());
        assert!(StructuredReference::parse("NoBrackets").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            "Sales[Amount]",
            "Sales[#All]",
            "Sales[[#Totals],[Amount]]",
            "Sales[[Q1]:[Q4]]",
        ] {
            let r = StructuredReference::parse(text).unwrap();
            assert_eq!(StructuredReference::parse(&r.to_string()).unwrap(), r);
        }
    }
}
