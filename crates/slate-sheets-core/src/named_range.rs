//! Named range definitions
//!
//! Named ranges bind a meaningful name to one or more rectangular areas,
//! either workbook-wide or scoped to a single worksheet. Their address text
//! is rewritten in place when a structural edit touches the sheet they point
//! at.
//!
//! # Example
//!
//! ```text
//! // Define a named range "TaxRate" that refers to cell B1
//! workbook.define_name("TaxRate", "Sheet1!$B$1")?;
//!
//! // Use it in a formula
//! =Price * TaxRate
//! ```

use ahash::AHashMap;

use crate::address::{format_prefix, split_address, split_areas, Address};
use crate::editing::{StructuralEdit, StructuralEditListener};
use crate::error::{Error, Result};

/// Scope of a named range
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameScope {
    /// Available throughout the workbook (global)
    Workbook,
    /// Scoped to a specific sheet (local)
    Worksheet {
        /// Stable id of the owning sheet
        id: u32,
        /// Name of the owning sheet
        name: String,
    },
}

/// A named range definition
///
/// The reference is stored as address text (`'Sheet'!C3,'Sheet'!D3:D8`), the
/// form structural edits rewrite. A name can instead carry a computed
/// formula (`PRICE*QUANTITY`), which has no address to maintain.
#[derive(Debug, Clone)]
pub struct NamedRange {
    /// The name; unique (case-insensitively) within its scope
    pub name: String,
    /// Scope of this name (workbook-wide or sheet-specific)
    pub scope: NameScope,
    /// The address text the name refers to
    pub address: String,
    /// Split areas, populated only for multi-area addresses
    pub addresses: Option<Vec<String>>,
    /// Computed formula for names that do not bind an address
    pub formula: Option<String>,
}

impl NamedRange {
    /// Create a named range bound to an address
    pub fn new(name: impl Into<String>, address: impl Into<String>, scope: NameScope) -> Self {
        let address = address.into();
        let mut range = Self {
            name: name.into(),
            scope,
            address: String::new(),
            addresses: None,
            formula: None,
        };
        range.set_address(address);
        range
    }

    /// Create a workbook-scoped named range
    pub fn workbook_scope(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self::new(name, address, NameScope::Workbook)
    }

    /// Create a sheet-scoped named range
    pub fn sheet_scope(
        name: impl Into<String>,
        address: impl Into<String>,
        sheet_id: u32,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            address,
            NameScope::Worksheet {
                id: sheet_id,
                name: sheet_name.into(),
            },
        )
    }

    /// Create a name bound to a computed formula instead of an address
    pub fn with_formula(
        name: impl Into<String>,
        formula: impl Into<String>,
        scope: NameScope,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            address: String::new(),
            addresses: None,
            formula: Some(formula.into()),
        }
    }

    /// Replace the address text, refreshing the split-area list
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
        self.addresses = if self.address.contains(',') {
            Some(
                split_areas(&self.address)
                    .into_iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
        } else {
            None
        };
    }

    /// Id of the owning sheet, or -1 for workbook-scoped names
    pub fn local_sheet_id(&self) -> i32 {
        match &self.scope {
            NameScope::Workbook => -1,
            NameScope::Worksheet { id, .. } => *id as i32,
        }
    }

    /// Same as [`NamedRange::local_sheet_id`]; kept separate because callers
    /// distinguish the declared scope from the resolved sheet
    pub fn actual_sheet_id(&self) -> i32 {
        self.local_sheet_id()
    }

    /// Name of the owning sheet, `None` for workbook-scoped names
    pub fn worksheet_name(&self) -> Option<&str> {
        match &self.scope {
            NameScope::Workbook => None,
            NameScope::Worksheet { name, .. } => Some(name),
        }
    }

    /// The sheet this range's address points at: an explicit qualifier in the
    /// address text, or the scope sheet for unqualified local names
    pub fn effective_sheet(&self) -> Option<String> {
        for part in split_areas(&self.address) {
            if let Ok((_, Some(sheet), _)) = split_address(part.trim()) {
                return Some(sheet);
            }
        }
        self.worksheet_name().map(|s| s.to_string())
    }

    /// Whether this name carries a computed formula instead of an address
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Rewrite the address text for a structural edit on `edit.sheet`
    ///
    /// The address splits on commas into areas; each area that parses is
    /// shifted independently and re-emitted qualified with the owning sheet.
    /// Areas that no longer parse (typically because they already contain
    /// `#REF!`) keep their original text. An area consumed by a deletion
    /// becomes the `#REF!` fragment.
    fn rewrite_for_edit(&mut self, edit: &StructuralEdit) {
        let Some(sheet) = self.effective_sheet() else {
            return;
        };
        if !edit.targets_sheet(&sheet) {
            return;
        }

        let mut parts = Vec::new();
        for part in split_areas(&self.address) {
            parts.push(rewrite_area_text(part.trim(), edit, &sheet));
        }
        self.set_address(parts.join(","));
    }
}

/// Rewrite one comma-split area of a named range address
fn rewrite_area_text(text: &str, edit: &StructuralEdit, sheet: &str) -> String {
    if text.contains("#REF!") {
        return text.to_string();
    }
    let Ok(parsed) = Address::parse(text) else {
        return text.to_string();
    };

    let shifted = if edit.is_row_edit() {
        if edit.is_insert {
            Some(parsed.add_row(edit.from_row, edit.row_count))
        } else {
            parsed.delete_row(edit.from_row, edit.row_count)
        }
    } else if edit.is_insert {
        Some(parsed.add_column(edit.from_col, edit.col_count))
    } else {
        parsed.delete_column(edit.from_col, edit.col_count)
    };

    let prefix = format_prefix(None, Some(sheet), true);
    match shifted {
        None => format!("{}{}", prefix, "#REF!"),
        Some(addr) => {
            let areas: Vec<String> = addr
                .areas()
                .iter()
                .map(|a| format!("{}{}", prefix, a))
                .collect();
            areas.join(",")
        }
    }
}

/// Collection of named ranges with case-insensitive lookup
#[derive(Debug, Default)]
pub struct NamedRangeCollection {
    /// Keyed by lowercase name plus a scope discriminator
    ranges: AHashMap<String, NamedRange>,
}

impl NamedRangeCollection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the storage key for a named range
    fn make_key(name: &str, scope: &NameScope) -> String {
        let name_lower = name.to_lowercase();
        match scope {
            NameScope::Workbook => name_lower,
            NameScope::Worksheet { id, .. } => format!("{}:sheet:{}", name_lower, id),
        }
    }

    /// Add a named range
    ///
    /// Fails when the name is empty or a name with the same scope exists.
    pub fn add(&mut self, range: NamedRange) -> Result<()> {
        if range.name.trim().is_empty() {
            return Err(Error::EmptyInput("named range name"));
        }
        let key = Self::make_key(&range.name, &range.scope);
        if self.ranges.contains_key(&key) {
            return Err(Error::InvalidName(format!(
                "'{}' already exists in this scope",
                range.name
            )));
        }
        self.ranges.insert(key, range);
        Ok(())
    }

    /// Add or replace a named range
    pub fn add_or_update(&mut self, range: NamedRange) {
        let key = Self::make_key(&range.name, &range.scope);
        self.ranges.insert(key, range);
    }

    /// Look up a name following sheet-shadows-workbook scoping
    pub fn get(&self, name: &str, current_sheet: Option<u32>) -> Option<&NamedRange> {
        if let Some(id) = current_sheet {
            let sheet_key = format!("{}:sheet:{}", name.to_lowercase(), id);
            if let Some(range) = self.ranges.get(&sheet_key) {
                return Some(range);
            }
        }
        self.ranges.get(&name.to_lowercase())
    }

    /// Look up a name in an exact scope
    pub fn get_exact(&self, name: &str, scope: &NameScope) -> Option<&NamedRange> {
        self.ranges.get(&Self::make_key(name, scope))
    }

    /// Mutable lookup in an exact scope
    pub fn get_exact_mut(&mut self, name: &str, scope: &NameScope) -> Option<&mut NamedRange> {
        self.ranges.get_mut(&Self::make_key(name, scope))
    }

    /// Remove a named range
    pub fn remove(&mut self, name: &str, scope: &NameScope) -> Option<NamedRange> {
        self.ranges.remove(&Self::make_key(name, scope))
    }

    /// Whether a name exists in the given scope
    pub fn contains(&self, name: &str, scope: &NameScope) -> bool {
        self.ranges.contains_key(&Self::make_key(name, scope))
    }

    /// Iterate over all named ranges
    pub fn iter(&self) -> impl Iterator<Item = &NamedRange> {
        self.ranges.values()
    }

    /// Iterate mutably over all named ranges
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NamedRange> {
        self.ranges.values_mut()
    }

    /// Number of named ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Drop every name scoped to a sheet (used when the sheet is removed)
    pub fn remove_for_sheet(&mut self, sheet_id: u32) {
        self.ranges
            .retain(|_, range| range.local_sheet_id() != sheet_id as i32);
    }

    /// Update scope sheet names after a worksheet rename
    ///
    /// Address text is rewritten separately, through the same sheet-rename
    /// rewriter formulas go through.
    pub fn rename_sheet(&mut self, sheet_id: u32, new_name: &str) {
        for range in self.ranges.values_mut() {
            if let NameScope::Worksheet { id, name } = &mut range.scope {
                if *id == sheet_id {
                    *name = new_name.to_string();
                }
            }
        }
    }

    /// Apply a structural edit to every managed range
    ///
    /// Ranges pointing at other sheets are untouched.
    pub fn insert(&mut self, edit: &StructuralEdit) {
        for range in self.ranges.values_mut() {
            if range.formula.is_none() {
                range.rewrite_for_edit(edit);
            }
        }
    }
}

impl StructuralEditListener for NamedRangeCollection {
    fn on_structural_edit(&mut self, edit: &StructuralEdit) {
        self.insert(edit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_creation() {
        let nr = NamedRange::workbook_scope("TaxRate", "Sheet1!$B$1");
        assert_eq!(nr.name, "TaxRate");
        assert_eq!(nr.address, "Sheet1!$B$1");
        assert_eq!(nr.scope, NameScope::Workbook);
        assert_eq!(nr.local_sheet_id(), -1);
        assert_eq!(nr.actual_sheet_id(), -1);
        assert_eq!(nr.worksheet_name(), None);
        assert!(nr.addresses.is_none());
        assert!(!nr.is_formula());
    }

    #[test]
    fn test_sheet_scope_ids() {
        let nr = NamedRange::sheet_scope("Data", "B2:C4", 3, "Budget");
        assert_eq!(nr.local_sheet_id(), 3);
        assert_eq!(nr.worksheet_name(), Some("Budget"));
        assert_eq!(nr.effective_sheet().as_deref(), Some("Budget"));
    }

    #[test]
    fn test_multi_area_addresses_field() {
        let nr = NamedRange::workbook_scope("Spots", "C3,D3:D5,E5");
        assert_eq!(
            nr.addresses,
            Some(vec!["C3".to_string(), "D3:D5".to_string(), "E5".to_string()])
        );
    }

    #[test]
    fn test_formula_name() {
        let nr = NamedRange::with_formula("Total", "PRICE*QUANTITY", NameScope::Workbook);
        assert!(nr.is_formula());
        assert_eq!(nr.formula.as_deref(), Some("PRICE*QUANTITY"));
    }

    #[test]
    fn test_collection_scope_lookup() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::workbook_scope("Rate", "A1")).unwrap();
        coll.add(NamedRange::sheet_scope("Rate", "B1", 0, "Sheet1"))
            .unwrap();

        // Sheet 0 sees the sheet-scoped version
        assert_eq!(coll.get("Rate", Some(0)).unwrap().address, "B1");
        // Sheet 1 falls back to the workbook-scoped one
        assert_eq!(coll.get("Rate", Some(1)).unwrap().address, "A1");
        assert_eq!(coll.get("Rate", None).unwrap().address, "A1");
    }

    #[test]
    fn test_case_insensitive_names() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::workbook_scope("TaxRate", "A1")).unwrap();

        assert!(coll.get("taxrate", None).is_some());
        assert!(coll.get("TAXRATE", None).is_some());
        assert!(coll.add(NamedRange::workbook_scope("TAXRATE", "B1")).is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut coll = NamedRangeCollection::new();
        assert!(matches!(
            coll.add(NamedRange::workbook_scope("", "A1")),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn test_insert_rewrites_multi_area() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::sheet_scope("Spots", "C3,D3:D5,E5", 0, "Sheet"))
            .unwrap();

        let edit = StructuralEdit::insert_rows("Sheet", 4, 3);
        coll.insert(&edit);

        let nr = coll
            .get_exact(
                "Spots",
                &NameScope::Worksheet {
                    id: 0,
                    name: "Sheet".into(),
                },
            )
            .unwrap();
        assert_eq!(nr.address, "'Sheet'!C3,'Sheet'!D3:D8,'Sheet'!E8");
        assert_eq!(
            nr.addresses,
            Some(vec![
                "'Sheet'!C3".to_string(),
                "'Sheet'!D3:D8".to_string(),
                "'Sheet'!E8".to_string()
            ])
        );
    }

    #[test]
    fn test_insert_ignores_other_sheets() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::sheet_scope("Spots", "C3:D5", 0, "Sheet"))
            .unwrap();

        coll.insert(&StructuralEdit::insert_rows("Other", 1, 10));

        let scope = NameScope::Worksheet {
            id: 0,
            name: "Sheet".into(),
        };
        assert_eq!(coll.get_exact("Spots", &scope).unwrap().address, "C3:D5");
    }

    #[test]
    fn test_delete_consumes_area_into_ref_error() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::sheet_scope("Spots", "C3,E5", 0, "Sheet"))
            .unwrap();

        coll.insert(&StructuralEdit::delete_rows("Sheet", 3, 1));

        let scope = NameScope::Worksheet {
            id: 0,
            name: "Sheet".into(),
        };
        assert_eq!(
            coll.get_exact("Spots", &scope).unwrap().address,
            "'Sheet'!#REF!,'Sheet'!E4"
        );
    }

    #[test]
    fn test_ref_error_fragment_left_alone() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::sheet_scope(
            "Spots",
            "'Sheet'!#REF!,'Sheet'!E5",
            0,
            "Sheet",
        ))
        .unwrap();

        coll.insert(&StructuralEdit::insert_rows("Sheet", 1, 2));

        let scope = NameScope::Worksheet {
            id: 0,
            name: "Sheet".into(),
        };
        assert_eq!(
            coll.get_exact("Spots", &scope).unwrap().address,
            "'Sheet'!#REF!,'Sheet'!E7"
        );
    }

    #[test]
    fn test_column_insert_rewrite() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::sheet_scope("Spots", "C3:E5", 0, "Sheet"))
            .unwrap();

        coll.insert(&StructuralEdit::insert_columns("Sheet", 4, 2));

        let scope = NameScope::Worksheet {
            id: 0,
            name: "Sheet".into(),
        };
        assert_eq!(
            coll.get_exact("Spots", &scope).unwrap().address,
            "'Sheet'!C3:G5"
        );
    }

    #[test]
    fn test_qualified_address_determines_sheet() {
        let mut coll = NamedRangeCollection::new();
        coll.add(NamedRange::workbook_scope("Spots", "'Data Sheet'!B2:B4"))
            .unwrap();

        coll.insert(&StructuralEdit::insert_rows("data sheet", 3, 1));

        assert_eq!(
            coll.get("Spots", None).unwrap().address,
            "'Data Sheet'!B2:B5"
        );
    }
}
