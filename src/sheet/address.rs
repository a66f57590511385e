use core::str::FromStr;

use derive_more::Display;
use thiserror::Error;
use umya_spreadsheet::helper::coordinate::{
    column_index_from_string, index_from_coordinate, string_from_column_index,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("\"{0}\" is not a valid column letter")]
    InvalidColumn(String),
    #[error("\"{0}\" is not a valid cell address")]
    Malformed(String),
}

/// A single cell address like `B12`. The column is kept as letters, the row
/// is 1-based, so `to_string` is exactly the concatenation the sheet expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{column}{row}")]
pub struct CellRef {
    column: String,
    row: u32,
}

impl CellRef {
    pub fn new(column: impl AsRef<str>, row: u32) -> Result<Self, AddressError> {
        let column = column.as_ref().to_ascii_uppercase();
        if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AddressError::InvalidColumn(column));
        }

        Ok(Self { column, row })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn column_index(&self) -> u32 {
        column_index_from_string(&self.column)
    }

    pub fn row(&self) -> u32 {
        self.row
    }
}

impl FromStr for CellRef {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, row, _, _) = index_from_coordinate(s.to_ascii_uppercase());
        match (column, row) {
            (Some(column), Some(row)) => Ok(Self {
                column: string_from_column_index(&column),
                row,
            }),
            _ => Err(AddressError::Malformed(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_address_is_concatenation() {
        assert_eq!(CellRef::new("b", 12).unwrap().to_string(), "B12");
        assert_eq!(CellRef::new("AA", 1).unwrap().to_string(), "AA1");
    }

    #[test]
    fn test_round_trip() {
        for (column, row) in [("A", 1), ("F", 22), ("AB", 104), ("ZZ", 65000)] {
            let cell = CellRef::new(column, row).unwrap();
            let reparsed: CellRef = cell.to_string().parse().unwrap();
            assert_eq!(reparsed, cell);
            assert_eq!(reparsed.column(), column);
            assert_eq!(reparsed.row(), row);
        }
    }

    #[test]
    fn test_lowercase_input_is_normalized() {
        let cell: CellRef = "e15".parse().unwrap();
        assert_eq!(cell, CellRef::new("E", 15).unwrap());
    }

    #[test]
    fn test_invalid_addresses() {
        assert_eq!(
            CellRef::new("", 3),
            Err(AddressError::InvalidColumn(String::new()))
        );
        assert!(CellRef::new("A1", 3).is_err());
        assert!("12".parse::<CellRef>().is_err());
        assert!("".parse::<CellRef>().is_err());
    }
}
