//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::external::ExternalReferenceCollection;
use crate::named_range::{NameScope, NamedRange, NamedRangeCollection};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook: a set of worksheets plus the workbook-wide collections
///
/// The workbook owns the named ranges and external references; both are
/// passed explicitly to the structural-edit orchestration rather than living
/// in ambient state.
#[derive(Debug)]
pub struct Workbook {
    /// Worksheets in tab order
    worksheets: Vec<Worksheet>,
    /// Next stable sheet id to hand out
    next_sheet_id: u32,
    /// Named ranges (defined names)
    named_ranges: NamedRangeCollection,
    /// External workbooks referenced from `[n]`-prefixed addresses
    external_references: ExternalReferenceCollection,
}

impl Workbook {
    /// Create a new workbook with one worksheet ("Sheet1")
    pub fn new() -> Self {
        let mut wb = Self::empty();
        // A fresh workbook always validates its default sheet name
        let _ = wb.add_worksheet_with_name("Sheet1");
        wb
    }

    /// Create a workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            next_sheet_id: 1,
            named_ranges: NamedRangeCollection::new(),
            external_references: ExternalReferenceCollection::new(),
        }
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Whether the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name (case-insensitive, as sheet names are)
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets
            .iter()
            .find(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Get a mutable worksheet by name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets
            .iter_mut()
            .find(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// The index of a worksheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Iterate over all worksheets mutably
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Add a new worksheet with a generated name
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a new worksheet with the given name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;

        let mut worksheet = Worksheet::new(name);
        worksheet.set_sheet_id(self.next_sheet_id);
        self.next_sheet_id += 1;

        let index = self.worksheets.len();
        self.worksheets.push(worksheet);
        Ok(index)
    }

    /// Insert a worksheet at a specific position
    pub fn insert_worksheet(&mut self, index: usize, name: &str) -> Result<()> {
        if index > self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.validate_sheet_name(name)?;

        let mut worksheet = Worksheet::new(name);
        worksheet.set_sheet_id(self.next_sheet_id);
        self.next_sheet_id += 1;
        self.worksheets.insert(index, worksheet);
        Ok(())
    }

    /// Remove a worksheet by index, returning it
    ///
    /// Formula fallout (references to the removed sheet turning into `#REF!`)
    /// is handled by the structural-edit orchestration on top of this.
    pub fn remove_worksheet(&mut self, index: usize) -> Result<Worksheet> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        Ok(self.worksheets.remove(index))
    }

    /// Rename a worksheet, keeping named-range scopes in sync
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.validate_sheet_name_excluding(new_name, Some(index))?;

        let sheet_id = self.worksheets[index].sheet_id();
        self.worksheets[index].set_name(new_name);
        self.named_ranges.rename_sheet(sheet_id, new_name);
        Ok(())
    }

    // === Named ranges ===

    /// Define a workbook-scoped named range
    ///
    /// # Example
    /// ```
    /// use slate_sheets_core::Workbook;
    ///
    /// let mut wb = Workbook::new();
    /// wb.define_name("TaxRate", "Sheet1!$B$1").unwrap();
    /// ```
    pub fn define_name(&mut self, name: &str, address: &str) -> Result<()> {
        self.named_ranges
            .add(NamedRange::new(name, address, NameScope::Workbook))
    }

    /// Define a named range scoped to the worksheet at `sheet_index`
    pub fn define_name_for_sheet(
        &mut self,
        name: &str,
        address: &str,
        sheet_index: usize,
    ) -> Result<()> {
        let ws = self
            .worksheets
            .get(sheet_index)
            .ok_or(Error::SheetOutOfBounds(sheet_index, self.worksheets.len()))?;
        let scope = NameScope::Worksheet {
            id: ws.sheet_id(),
            name: ws.name().to_string(),
        };
        self.named_ranges.add(NamedRange::new(name, address, scope))
    }

    /// Look up a name following sheet-shadows-workbook scoping
    pub fn get_named_range(&self, name: &str, current_sheet: usize) -> Option<&NamedRange> {
        let sheet_id = self.worksheets.get(current_sheet).map(|ws| ws.sheet_id());
        self.named_ranges.get(name, sheet_id)
    }

    /// Remove a workbook-scoped named range
    pub fn remove_name(&mut self, name: &str) -> Option<NamedRange> {
        self.named_ranges.remove(name, &NameScope::Workbook)
    }

    /// The named range collection
    pub fn named_ranges(&self) -> &NamedRangeCollection {
        &self.named_ranges
    }

    /// The named range collection, mutably
    pub fn named_ranges_mut(&mut self) -> &mut NamedRangeCollection {
        &mut self.named_ranges
    }

    // === External references ===

    /// Register an external workbook, returning the id used in `[n]` brackets
    pub fn add_external_reference(&mut self, name: &str) -> u32 {
        self.external_references.add(name)
    }

    /// The external reference collection
    pub fn external_references(&self) -> &ExternalReferenceCollection {
        &self.external_references
    }

    /// The external reference collection, mutably
    pub fn external_references_mut(&mut self) -> &mut ExternalReferenceCollection {
        &mut self.external_references
    }

    // === Sheet name validation ===

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        self.validate_sheet_name_excluding(name, None)
    }

    fn validate_sheet_name_excluding(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        for c in INVALID_CHARS {
            if name.contains(*c) {
                return Err(Error::InvalidSheetName(format!(
                    "sheet name cannot contain '{}'",
                    c
                )));
            }
        }

        let name_lower = name.to_lowercase();
        for (i, ws) in self.worksheets.iter().enumerate() {
            if Some(i) != exclude_index && ws.name().to_lowercase() == name_lower {
                return Err(Error::DuplicateSheetName(name.into()));
            }
        }

        Ok(())
    }

    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.validate_sheet_name(&name).is_ok() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert_eq!(wb.worksheet(0).unwrap().sheet_id(), 1);
    }

    #[test]
    fn test_add_worksheets() {
        let mut wb = Workbook::new();

        let idx = wb.add_worksheet().unwrap();
        assert_eq!(idx, 1);
        assert_eq!(wb.sheet_count(), 2);

        let idx = wb.add_worksheet_with_name("Data").unwrap();
        assert_eq!(idx, 2);
        assert_eq!(wb.worksheet(2).unwrap().name(), "Data");
    }

    #[test]
    fn test_sheet_ids_stay_stable_across_removal() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("A").unwrap();
        wb.add_worksheet_with_name("B").unwrap();

        let b_id = wb.worksheet_by_name("B").unwrap().sheet_id();
        wb.remove_worksheet(0).unwrap();
        assert_eq!(wb.worksheet_by_name("B").unwrap().sheet_id(), b_id);

        // New sheets never reuse ids
        wb.add_worksheet_with_name("C").unwrap();
        assert!(wb.worksheet_by_name("C").unwrap().sheet_id() > b_id);
    }

    #[test]
    fn test_duplicate_name_rejected_case_insensitively() {
        let mut wb = Workbook::new();
        assert!(wb.add_worksheet_with_name("SHEET1").is_err());
        assert!(wb.add_worksheet_with_name("sheet1").is_err());
    }

    #[test]
    fn test_invalid_sheet_names() {
        let mut wb = Workbook::new();

        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet:1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet[1]").is_err());

        let long_name = "A".repeat(MAX_SHEET_NAME_LEN + 1);
        assert!(wb.add_worksheet_with_name(&long_name).is_err());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();

        assert!(wb.worksheet_by_name("data").is_some());
        assert_eq!(wb.sheet_index("DATA"), Some(1));
        assert!(wb.worksheet_by_name("Missing").is_none());
    }

    #[test]
    fn test_rename_updates_named_range_scope() {
        let mut wb = Workbook::new();
        wb.define_name_for_sheet("Local", "A1:B2", 0).unwrap();

        wb.rename_worksheet(0, "Budget").unwrap();

        let nr = wb.get_named_range("Local", 0).unwrap();
        assert_eq!(nr.worksheet_name(), Some("Budget"));
    }

    #[test]
    fn test_named_range_scoping() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();

        wb.define_name("Rate", "Sheet1!A1").unwrap();
        wb.define_name_for_sheet("Rate", "B1", 1).unwrap();

        assert_eq!(wb.get_named_range("Rate", 1).unwrap().address, "B1");
        assert_eq!(wb.get_named_range("Rate", 0).unwrap().address, "Sheet1!A1");

        let nr = wb.get_named_range("Rate", 1).unwrap();
        assert_eq!(nr.worksheet_name(), Some("Data"));
        assert!(nr.local_sheet_id() >= 0);
    }

    #[test]
    fn test_external_references() {
        let mut wb = Workbook::new();
        let id = wb.add_external_reference("Budget.xlsx");
        assert_eq!(id, 1);
        assert_eq!(wb.external_references().name(1), Some("Budget.xlsx"));
    }
}
