//! In-memory spreadsheet.

use super::{CellRef, ColumnRange, SheetTransport};
use crate::result::{SauceError, SauceResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Key = (String, String, u32);

#[derive(Debug, Default)]
struct Cells {
    values: BTreeMap<Key, String>,
    writes: Vec<(CellRef, String)>,
}

/// Sheet held in memory; writes to chosen columns can be made to fail
#[derive(Debug, Default)]
pub struct MemorySheet {
    cells: Mutex<Cells>,
    failing_columns: BTreeSet<String>,
}

impl MemorySheet {
    /// Empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `column` of `sheet` downwards from `start_row`
    #[must_use]
    pub fn with_column(self, sheet: &str, column: &str, start_row: u32, values: &[&str]) -> Self {
        for (offset, value) in values.iter().enumerate() {
            self.set(sheet, column, start_row + offset as u32, value);
        }
        self
    }

    /// Make every write to `column` fail
    #[must_use]
    pub fn with_failing_column(mut self, column: &str) -> Self {
        self.failing_columns.insert(column.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Cells> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a cell directly
    pub fn set(&self, sheet: &str, column: &str, row: u32, value: &str) {
        self.lock()
            .values
            .insert((sheet.to_string(), column.to_string(), row), value.to_string());
    }

    /// Cell text, `None` when never set
    pub fn get(&self, sheet: &str, column: &str, row: u32) -> Option<String> {
        self.lock()
            .values
            .get(&(sheet.to_string(), column.to_string(), row))
            .cloned()
    }

    /// Successful writes in order
    pub fn writes(&self) -> Vec<(CellRef, String)> {
        self.lock().writes.clone()
    }
}

#[async_trait]
impl SheetTransport for MemorySheet {
    async fn read_column(&self, range: &ColumnRange) -> SauceResult<Vec<String>> {
        let cells = self.lock();
        let filled: Vec<(u32, &String)> = cells
            .values
            .iter()
            .filter(|((sheet, column, row), _)| {
                *sheet == range.sheet && *column == range.column && *row >= range.start_row
            })
            .map(|((_, _, row), value)| (*row, value))
            .collect();
        let Some(last) = filled.iter().map(|(row, _)| *row).max() else {
            return Ok(Vec::new());
        };

        let mut column = vec![String::new(); (last - range.start_row + 1) as usize];
        for (row, value) in filled {
            column[(row - range.start_row) as usize] = value.clone();
        }
        Ok(column)
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> SauceResult<()> {
        if self.failing_columns.contains(&cell.column) {
            return Err(SauceError::SheetError {
                message: format!("write to {cell} refused"),
            });
        }
        let mut cells = self.lock();
        cells.values.insert(
            (cell.sheet.clone(), cell.column.clone(), cell.row),
            value.to_string(),
        );
        cells.writes.push((cell.clone(), value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_column_keeps_gaps_and_cuts_tail() {
        let sheet = MemorySheet::new()
            .with_column("S", "A", 3, &["x"])
            .with_column("S", "A", 5, &["y"])
            .with_column("S", "B", 9, &["other column"]);
        let range = ColumnRange {
            sheet: "S".to_string(),
            column: "A".to_string(),
            start_row: 3,
        };
        assert_eq!(sheet.read_column(&range).await.unwrap(), ["x", "", "y"]);
    }

    #[tokio::test]
    async fn test_empty_column_reads_empty() {
        let range = ColumnRange {
            sheet: "S".to_string(),
            column: "A".to_string(),
            start_row: 1,
        };
        assert!(MemorySheet::new().read_column(&range).await.unwrap().is_empty());
    }
}
