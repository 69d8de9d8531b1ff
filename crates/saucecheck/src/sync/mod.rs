//! Push report outcomes into a tracking spreadsheet.
//!
//! Every spec of a [`TestReport`] is looked up in one column of the sheet:
//! the first non-blank cell whose text is contained in the spec title is its
//! row. That row gets `Pass`/`Fail` in the status column and the current
//! time in the timestamp column. Unmatched specs are skipped; transport
//! failures are logged and skipped, never raised.

mod memory;
mod sheets;

pub use memory::MemorySheet;
pub use sheets::{GoogleSheetsTransport, SHEETS_API_BASE};

use crate::report::{ReportSpec, TestReport};
use crate::result::{SauceError, SauceResult};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Status cell value for a passing spec
pub const PASS: &str = "Pass";

/// Status cell value for a failing spec
pub const FAIL: &str = "Fail";

/// Where the results go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Column holding the case titles, e.g. `A`
    pub column_find: String,
    /// Column receiving `Pass`/`Fail`
    pub column_update: String,
    /// Column receiving the timestamp
    pub column_updated_at: String,
    /// First row of the title column to scan (1-based)
    pub sheet_row_start: u32,
    /// Sheet (tab) name
    pub sheet_name: String,
    /// Spreadsheet id from its URL
    pub spreadsheet_id: String,
    /// Compare titles ignoring case
    #[serde(default)]
    pub case_insensitive: bool,
}

impl SyncConfig {
    /// Parse from JSON or YAML text
    ///
    /// # Errors
    ///
    /// Returns error on malformed input, a missing field, or an invalid
    /// column or row
    pub fn from_yaml(text: &str) -> SauceResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON or YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> SauceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Check columns, start row and ids
    ///
    /// # Errors
    ///
    /// Returns [`SauceError::ConfigError`] naming the offending field
    pub fn validate(&self) -> SauceResult<()> {
        for (field, column) in [
            ("columnFind", &self.column_find),
            ("columnUpdate", &self.column_update),
            ("columnUpdatedAt", &self.column_updated_at),
        ] {
            if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(SauceError::ConfigError {
                    message: format!("{field} must be a column letter such as \"A\", got {column:?}"),
                });
            }
        }
        if self.sheet_row_start == 0 {
            return Err(SauceError::ConfigError {
                message: "sheetRowStart is 1-based".to_string(),
            });
        }
        if self.spreadsheet_id.trim().is_empty() {
            return Err(SauceError::ConfigError {
                message: "spreadsheetId is required".to_string(),
            });
        }
        Ok(())
    }

    /// Title column from the start row down
    #[must_use]
    pub fn find_range(&self) -> ColumnRange {
        ColumnRange {
            sheet: self.sheet_name.clone(),
            column: self.column_find.clone(),
            start_row: self.sheet_row_start,
        }
    }

    fn cell(&self, column: &str, row: u32) -> CellRef {
        CellRef {
            sheet: self.sheet_name.clone(),
            column: column.to_string(),
            row,
        }
    }
}

/// Open-ended column range, `Sheet!A9:A`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    /// Sheet name
    pub sheet: String,
    /// Column letters
    pub column: String,
    /// First row (1-based)
    pub start_row: u32,
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}{}:{}", self.sheet, self.column, self.start_row, self.column)
    }
}

/// Single cell, `Sheet!I9:I9`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// Sheet name
    pub sheet: String,
    /// Column letters
    pub column: String,
    /// Row (1-based)
    pub row: u32,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{sheet}!{col}{row}:{col}{row}",
            sheet = self.sheet,
            col = self.column,
            row = self.row
        )
    }
}

/// Spreadsheet access used by the sync
#[async_trait]
pub trait SheetTransport: Send + Sync {
    /// Cell texts of the range, top to bottom; blank cells are empty
    /// strings, trailing blanks may be cut
    async fn read_column(&self, range: &ColumnRange) -> SauceResult<Vec<String>>;

    /// Write one raw value
    async fn write_cell(&self, cell: &CellRef, value: &str) -> SauceResult<()>;
}

#[async_trait]
impl<'a, T: SheetTransport + ?Sized> SheetTransport for &'a T {
    async fn read_column(&self, range: &ColumnRange) -> SauceResult<Vec<String>> {
        (**self).read_column(range).await
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> SauceResult<()> {
        (**self).write_cell(cell, value).await
    }
}

/// Source of timestamp text
pub type Clock = Box<dyn Fn() -> String + Send + Sync>;

/// `en-US` layout of a local time: `10/19/2026, 3:04:05 PM`
#[must_use]
pub fn locale_timestamp(time: &NaiveDateTime) -> String {
    time.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Whether a title-column cell names `title`
#[must_use]
pub fn title_matches(cell: &str, title: &str, case_insensitive: bool) -> bool {
    if cell.is_empty() {
        return false;
    }
    if case_insensitive {
        title.to_lowercase().contains(&cell.to_lowercase())
    } else {
        title.contains(cell)
    }
}

/// Everything one sync run needs
pub struct SyncContext<T> {
    transport: T,
    config: SyncConfig,
    clock: Clock,
}

impl<T: SheetTransport> SyncContext<T> {
    /// Context stamping the local time
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self {
            transport,
            config,
            clock: Box::new(|| locale_timestamp(&Local::now().naive_local())),
        }
    }

    /// Replace the timestamp source
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Sheet location
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Transport in use
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish()
    }
}

/// Counts of one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Specs that found a row
    pub matched: usize,
    /// Cells written
    pub written: usize,
    /// Writes that failed and were skipped
    pub failed_writes: usize,
}

impl SyncOutcome {
    fn add(&mut self, other: Self) {
        self.matched += other.matched;
        self.written += other.written;
        self.failed_writes += other.failed_writes;
    }
}

/// Row of the first title cell naming `title`; a failed read is no match
pub async fn find_row<T: SheetTransport>(context: &SyncContext<T>, title: &str) -> Option<u32> {
    let range = context.config.find_range();
    let cells = match context.transport.read_column(&range).await {
        Ok(cells) => cells,
        Err(err) => {
            tracing::warn!(%range, %err, "title column unreadable");
            return None;
        }
    };
    cells
        .iter()
        .position(|cell| title_matches(cell, title, context.config.case_insensitive))
        .map(|index| range.start_row + index as u32)
}

/// Write one spec's status and timestamp
pub async fn sync_spec<T: SheetTransport>(context: &SyncContext<T>, spec: &ReportSpec) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();
    let Some(row) = find_row(context, &spec.title).await else {
        tracing::debug!(title = %spec.title, "no matching row");
        return outcome;
    };
    outcome.matched = 1;

    let status = if spec.ok { PASS } else { FAIL };
    tracing::info!(row, title = %spec.title, status, "update row");

    let status_cell = context.config.cell(&context.config.column_update, row);
    if let Err(err) = context.transport.write_cell(&status_cell, status).await {
        tracing::warn!(cell = %status_cell, %err, "status write failed");
        outcome.failed_writes += 1;
        return outcome;
    }
    outcome.written += 1;

    let time_cell = context.config.cell(&context.config.column_updated_at, row);
    match context.transport.write_cell(&time_cell, &(context.clock)()).await {
        Ok(()) => outcome.written += 1,
        Err(err) => {
            tracing::warn!(cell = %time_cell, %err, "timestamp write failed");
            outcome.failed_writes += 1;
        }
    }
    outcome
}

/// Walk every spec of the report, in report order, and sync it
pub async fn sync_report<T: SheetTransport>(context: &SyncContext<T>, report: &TestReport) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();
    for spec in report.specs() {
        outcome.add(sync_spec(context, spec).await);
    }
    tracing::info!(
        matched = outcome.matched,
        written = outcome.written,
        failed = outcome.failed_writes,
        "updated {} record{}",
        outcome.matched,
        if outcome.matched > 1 { "s" } else { "" }
    );
    outcome
}
