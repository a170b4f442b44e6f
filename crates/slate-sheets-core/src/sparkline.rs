//! Sparkline groups
//!
//! A sparkline group stores two addresses as text: where the sparklines are
//! drawn and where their data comes from. Both strings are rewritten on
//! structural edits; an address consumed by a deletion degrades to `#REF!`.

use crate::address::Address;
use crate::editing::StructuralEdit;
use crate::error::{Error, Result};

/// A group of sparklines sharing a data range and display options
#[derive(Debug, Clone, PartialEq)]
pub struct SparklineGroup {
    /// Cells the sparklines are drawn into
    pub location_address: String,
    /// Cells the sparklines are computed from
    pub data_address: String,
}

impl SparklineGroup {
    /// Create a sparkline group
    pub fn new(location: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        let location = location.into();
        let data = data.into();
        if location.trim().is_empty() {
            return Err(Error::EmptyInput("sparkline location address"));
        }
        if data.trim().is_empty() {
            return Err(Error::EmptyInput("sparkline data address"));
        }
        Ok(Self {
            location_address: location,
            data_address: data,
        })
    }
}

/// The sparkline groups of one worksheet
#[derive(Debug, Default)]
pub struct SparklineGroupCollection {
    groups: Vec<SparklineGroup>,
}

impl SparklineGroupCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group
    pub fn add(&mut self, group: SparklineGroup) {
        self.groups.push(group);
    }

    /// Iterate over all groups
    pub fn iter(&self) -> impl Iterator<Item = &SparklineGroup> {
        self.groups.iter()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rewrite both stored addresses for a structural edit
    pub(crate) fn apply_edit(&mut self, edit: &StructuralEdit) {
        for group in &mut self.groups {
            group.location_address = rewrite_address_text(&group.location_address, edit);
            group.data_address = rewrite_address_text(&group.data_address, edit);
        }
    }
}

/// Shift an address text in place, keeping unparseable text as it was
fn rewrite_address_text(text: &str, edit: &StructuralEdit) -> String {
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

    match shifted {
        Some(addr) => addr.to_string(),
        None => "#REF!".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_shift() {
        let mut groups = SparklineGroupCollection::new();
        groups.add(SparklineGroup::new("F1:F3", "A1:E3").unwrap());

        groups.apply_edit(&StructuralEdit::insert_rows("Sheet1", 2, 2));

        let group = groups.iter().next().unwrap();
        assert_eq!(group.location_address, "F1:F5");
        assert_eq!(group.data_address, "A1:E5");
    }

    #[test]
    fn test_deleted_data_becomes_ref_error() {
        let mut groups = SparklineGroupCollection::new();
        groups.add(SparklineGroup::new("F1", "A5:E5").unwrap());

        groups.apply_edit(&StructuralEdit::delete_rows("Sheet1", 5, 1));

        let group = groups.iter().next().unwrap();
        assert_eq!(group.location_address, "F1");
        assert_eq!(group.data_address, "#REF!");

        // A later edit leaves the dead reference untouched
        groups.apply_edit(&StructuralEdit::insert_rows("Sheet1", 1, 5));
        let group = groups.iter().next().unwrap();
        assert_eq!(group.data_address, "#REF!");
    }

    #[test]
    fn test_empty_addresses_rejected() {
        assert!(matches!(
            SparklineGroup::new("", "A1:B2"),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            SparklineGroup::new("F1", "  "),
            Err(Error::EmptyInput(_))
        ));
    }
}
