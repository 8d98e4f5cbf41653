//! PostgreSQL backing for the row store.
//!
//! Each logical table is a SQL table with a `BIGSERIAL row_id` followed by
//! the columns declared in [`Table::columns`]. Only primary-key access is
//! used here; lookups by content stay in the repositories as scans.

use async_trait::async_trait;
use classdash_core::types::{RowId, Timestamp};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row as _};

use super::{check_cell, check_row, Cell, Column, ColumnType, Row, RowStore, StoreError, Table};

/// Row store over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgRowStore {
    pool: PgPool,
}

impl PgRowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn column_list(table: Table) -> String {
    table
        .columns()
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn decode_cell(row: &PgRow, column: &Column) -> Result<Cell, sqlx::Error> {
    let cell = match column.ty {
        ColumnType::Text => row
            .try_get::<Option<String>, _>(column.name)?
            .map_or(Cell::Empty, Cell::Text),
        ColumnType::Bool => row
            .try_get::<Option<bool>, _>(column.name)?
            .map_or(Cell::Empty, Cell::Bool),
        ColumnType::Timestamp => row
            .try_get::<Option<Timestamp>, _>(column.name)?
            .map_or(Cell::Empty, Cell::Timestamp),
    };
    Ok(cell)
}

/// Bind a cell as a parameter typed after its column.
fn bind_cell<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    column: &Column,
    cell: Cell,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    match (column.ty, cell) {
        (_, Cell::Text(s)) => query.bind(s),
        (_, Cell::Bool(b)) => query.bind(b),
        (_, Cell::Timestamp(ts)) => query.bind(ts),
        (ColumnType::Text, Cell::Empty) => query.bind(None::<String>),
        (ColumnType::Bool, Cell::Empty) => query.bind(None::<bool>),
        (ColumnType::Timestamp, Cell::Empty) => query.bind(None::<Timestamp>),
    }
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let query = format!(
            "SELECT row_id, {} FROM {} ORDER BY row_id",
            column_list(table),
            table.name()
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|pg_row| -> Result<Row, StoreError> {
                let id: RowId = pg_row.try_get("row_id")?;
                let cells = table
                    .columns()
                    .iter()
                    .map(|column| decode_cell(pg_row, column))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Row { id, cells })
            })
            .collect()
    }

    async fn read_cell(
        &self,
        table: Table,
        row: RowId,
        column: usize,
    ) -> Result<Cell, StoreError> {
        let col = table.column(column)?;
        let query = format!("SELECT {} FROM {} WHERE row_id = $1", col.name, table.name());
        let pg_row = sqlx::query(&query)
            .bind(row)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::RowMissing { table, row })?;
        Ok(decode_cell(&pg_row, &col)?)
    }

    async fn write_cell(
        &self,
        table: Table,
        row: RowId,
        column: usize,
        cell: Cell,
    ) -> Result<(), StoreError> {
        let col = check_cell(table, column, &cell)?;
        let query = format!(
            "UPDATE {} SET {} = $1 WHERE row_id = $2",
            table.name(),
            col.name
        );
        let result = bind_cell(sqlx::query(&query), &col, cell)
            .bind(row)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowMissing { table, row });
        }
        Ok(())
    }

    async fn append_row(&self, table: Table, cells: Vec<Cell>) -> Result<RowId, StoreError> {
        check_row(table, &cells)?;
        let placeholders = (1..=cells.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING row_id",
            table.name(),
            column_list(table)
        );

        let mut q = sqlx::query(&query);
        for (column, cell) in table.columns().iter().zip(cells) {
            q = bind_cell(q, column, cell);
        }
        let id: RowId = q.fetch_one(&self.pool).await?.try_get("row_id")?;
        Ok(id)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
