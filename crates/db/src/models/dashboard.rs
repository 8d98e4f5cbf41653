//! Dashboards table rows.

use classdash_core::types::{RowId, Timestamp};

use crate::store::{Cell, Row, StoreError, Table};

pub const COL_OWNER_EMAIL: usize = 0;
pub const COL_DASHBOARD_SET_JSON: usize = 1;
pub const COL_LAST_SAVED: usize = 2;

/// A row from the `dashboards` table: one per owner.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow {
    pub row: RowId,
    pub owner_email: String,
    pub dashboard_set_json: String,
    pub last_saved: Option<Timestamp>,
}

impl DashboardRow {
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        let text = |column: usize, name: &'static str| {
            row.cell(column)
                .as_text()
                .map(str::to_string)
                .ok_or_else(|| StoreError::CellType {
                    table: Table::Dashboards,
                    column: name,
                    detail: "expected text".into(),
                })
        };

        Ok(Self {
            row: row.id,
            owner_email: text(COL_OWNER_EMAIL, "owner_email")?,
            dashboard_set_json: text(COL_DASHBOARD_SET_JSON, "dashboard_set_json")?,
            last_saved: row.cell(COL_LAST_SAVED).as_timestamp(),
        })
    }
}

/// Cells for a first save by a new owner.
#[derive(Debug, Clone)]
pub struct NewDashboardRow {
    pub owner_email: String,
    pub dashboard_set_json: String,
    pub last_saved: Timestamp,
}

impl NewDashboardRow {
    pub fn into_cells(self) -> Vec<Cell> {
        vec![
            Cell::Text(self.owner_email),
            Cell::Text(self.dashboard_set_json),
            Cell::Timestamp(self.last_saved),
        ]
    }
}
