//! In-process row store, used for local development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use classdash_core::types::RowId;
use tokio::sync::RwLock;

use super::{check_cell, check_row, Cell, Row, RowStore, StoreError, Table};

/// Row ids are 1-based positions in the table's vector.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: RwLock<HashMap<Table, Vec<Vec<Cell>>>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(table: Table, row: RowId, len: usize) -> Result<usize, StoreError> {
    usize::try_from(row)
        .ok()
        .and_then(|r| r.checked_sub(1))
        .filter(|&idx| idx < len)
        .ok_or(StoreError::RowMissing { table, row })
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .enumerate()
                    .map(|(idx, cells)| Row {
                        id: idx as RowId + 1,
                        cells: cells.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn read_cell(
        &self,
        table: Table,
        row: RowId,
        column: usize,
    ) -> Result<Cell, StoreError> {
        table.column(column)?;
        let tables = self.tables.read().await;
        let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
        let idx = position(table, row, rows.len())?;
        Ok(rows[idx].get(column).cloned().unwrap_or(Cell::Empty))
    }

    async fn write_cell(
        &self,
        table: Table,
        row: RowId,
        column: usize,
        cell: Cell,
    ) -> Result<(), StoreError> {
        check_cell(table, column, &cell)?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let idx = position(table, row, rows.len())?;
        let cells = &mut rows[idx];
        if cells.len() <= column {
            cells.resize(column + 1, Cell::Empty);
        }
        cells[column] = cell;
        Ok(())
    }

    async fn append_row(&self, table: Table, cells: Vec<Cell>) -> Result<RowId, StoreError> {
        check_row(table, &cells)?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        rows.push(cells);
        Ok(rows.len() as RowId)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn dashboard_row(email: &str) -> Vec<Cell> {
        vec![Cell::text(email), Cell::text("{}"), Cell::Timestamp(Utc::now())]
    }

    #[tokio::test]
    async fn append_assigns_sequential_ids() {
        let store = MemoryRowStore::new();
        assert_eq!(store.append_row(Table::Dashboards, dashboard_row("a")).await.unwrap(), 1);
        assert_eq!(store.append_row(Table::Dashboards, dashboard_row("b")).await.unwrap(), 2);

        let rows = store.read_all_rows(Table::Dashboards).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].cell(0), &Cell::text("b"));
        assert!(store.read_all_rows(Table::Sessions).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_then_read_cell() {
        let store = MemoryRowStore::new();
        let row = store.append_row(Table::Dashboards, dashboard_row("a")).await.unwrap();

        store
            .write_cell(Table::Dashboards, row, 1, Cell::text(r#"{"x":1}"#))
            .await
            .unwrap();
        let cell = store.read_cell(Table::Dashboards, row, 1).await.unwrap();
        assert_eq!(cell.as_text(), Some(r#"{"x":1}"#));
    }

    #[tokio::test]
    async fn missing_rows_and_bad_types_are_rejected() {
        let store = MemoryRowStore::new();
        assert_matches!(
            store.read_cell(Table::Sessions, 1, 0).await,
            Err(StoreError::RowMissing { row: 1, .. })
        );
        assert_matches!(
            store.write_cell(Table::Sessions, 0, 4, Cell::Bool(false)).await,
            Err(StoreError::RowMissing { .. })
        );

        let row = store.append_row(Table::Dashboards, dashboard_row("a")).await.unwrap();
        assert_matches!(
            store.write_cell(Table::Dashboards, row, 2, Cell::Bool(true)).await,
            Err(StoreError::CellType { column: "last_saved", .. })
        );
    }
}
