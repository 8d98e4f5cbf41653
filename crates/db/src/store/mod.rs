//! Row store abstraction.
//!
//! The application persists into two logical tables, each a mapping from a
//! synthetic row id to an ordered tuple of typed cells. The store offers only
//! whole-table reads, single-cell reads and writes, and appends. There are no
//! transactions and no secondary indices: repositories find rows by scanning.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use classdash_core::types::{RowId, Timestamp};

pub use memory::MemoryRowStore;
pub use postgres::PgRowStore;

/// The logical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Dashboards,
    Sessions,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Bool,
    Timestamp,
}

/// Name and type of one column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const DASHBOARD_COLUMNS: &[Column] = &[
    Column { name: "owner_email", ty: ColumnType::Text },
    Column { name: "dashboard_set_json", ty: ColumnType::Text },
    Column { name: "last_saved", ty: ColumnType::Timestamp },
];

const SESSION_COLUMNS: &[Column] = &[
    Column { name: "code", ty: ColumnType::Text },
    Column { name: "teacher_email", ty: ColumnType::Text },
    Column { name: "session_state_json", ty: ColumnType::Text },
    Column { name: "created_at", ty: ColumnType::Timestamp },
    Column { name: "active", ty: ColumnType::Bool },
];

impl Table {
    pub const ALL: [Table; 2] = [Table::Dashboards, Table::Sessions];

    pub fn name(self) -> &'static str {
        match self {
            Table::Dashboards => "dashboards",
            Table::Sessions => "sessions",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Table::Dashboards => DASHBOARD_COLUMNS,
            Table::Sessions => SESSION_COLUMNS,
        }
    }

    /// Look up a column by position, failing with [`StoreError::ColumnOutOfRange`].
    pub fn column(self, index: usize) -> Result<Column, StoreError> {
        self.columns()
            .get(index)
            .copied()
            .ok_or(StoreError::ColumnOutOfRange { table: self, column: index })
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Text content; an empty cell reads as the empty string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Empty => Some(""),
            _ => None,
        }
    }

    /// Boolean content. Also accepts spreadsheet-style `"TRUE"`/`"false"` text.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Cell::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            Cell::Empty => Some(false),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            Cell::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Whether this value may be written into a column of type `ty`.
    pub fn fits(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (Cell::Empty, _)
                | (Cell::Text(_), ColumnType::Text)
                | (Cell::Bool(_), ColumnType::Bool)
                | (Cell::Timestamp(_), ColumnType::Timestamp)
        )
    }
}

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Cell at `index`, treating missing trailing cells as empty.
    pub fn cell(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&Cell::Empty)
    }
}

/// Errors raised by row store backings.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Row {row} not found in table {}", table.name())]
    RowMissing { table: Table, row: RowId },

    #[error("Column {column} out of range for table {}", table.name())]
    ColumnOutOfRange { table: Table, column: usize },

    #[error("Cell type mismatch in {}.{column}: {detail}", table.name())]
    CellType {
        table: Table,
        column: &'static str,
        detail: String,
    },

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The four row-store primitives plus a liveness probe.
///
/// Object safe so the backing can be chosen at startup and shared as
/// `Arc<dyn RowStore>`.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Every row of `table` in row-id order.
    async fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError>;

    async fn read_cell(&self, table: Table, row: RowId, column: usize)
        -> Result<Cell, StoreError>;

    async fn write_cell(
        &self,
        table: Table,
        row: RowId,
        column: usize,
        cell: Cell,
    ) -> Result<(), StoreError>;

    /// Append a row and return its id.
    async fn append_row(&self, table: Table, cells: Vec<Cell>) -> Result<RowId, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Reject a write whose value does not match the column type.
pub(crate) fn check_cell(table: Table, column: usize, cell: &Cell) -> Result<Column, StoreError> {
    let col = table.column(column)?;
    if !cell.fits(col.ty) {
        return Err(StoreError::CellType {
            table,
            column: col.name,
            detail: format!("expected {:?}, got {cell:?}", col.ty),
        });
    }
    Ok(col)
}

/// Reject an append whose arity or types do not match the table.
pub(crate) fn check_row(table: Table, cells: &[Cell]) -> Result<(), StoreError> {
    let columns = table.columns();
    if cells.len() != columns.len() {
        return Err(StoreError::ColumnOutOfRange {
            table,
            column: cells.len(),
        });
    }
    for (index, cell) in cells.iter().enumerate() {
        check_cell(table, index, cell)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_cells_accept_spreadsheet_text() {
        assert_eq!(Cell::text("TRUE").as_bool(), Some(true));
        assert_eq!(Cell::text("false").as_bool(), Some(false));
        assert_eq!(Cell::Empty.as_bool(), Some(false));
        assert_eq!(Cell::text("yes").as_bool(), None);
    }

    #[test]
    fn empty_cell_reads_as_empty_text() {
        assert_eq!(Cell::Empty.as_text(), Some(""));
        assert_eq!(Cell::Bool(true).as_text(), None);
    }

    #[test]
    fn type_checks() {
        assert!(check_cell(Table::Sessions, 4, &Cell::Bool(true)).is_ok());
        assert!(check_cell(Table::Sessions, 4, &Cell::text("x")).is_err());
        assert!(check_cell(Table::Sessions, 9, &Cell::Empty).is_err());
        assert!(check_row(Table::Dashboards, &[Cell::Empty]).is_err());
    }
}
