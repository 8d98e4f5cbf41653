//! Repository for the `dashboards` table.

use classdash_core::types::{RowId, Timestamp};

use crate::models::dashboard::{
    DashboardRow, NewDashboardRow, COL_DASHBOARD_SET_JSON, COL_LAST_SAVED,
};
use crate::store::{Cell, RowStore, StoreError, Table};

/// Provides per-owner access to stored dashboard sets.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Find an owner's row. Returns `None` if they have never saved.
    ///
    /// Emails match case-insensitively; the first matching row wins.
    pub async fn find_by_owner(
        store: &dyn RowStore,
        owner_email: &str,
    ) -> Result<Option<DashboardRow>, StoreError> {
        for row in store.read_all_rows(Table::Dashboards).await? {
            let dashboard = DashboardRow::from_row(&row)?;
            if dashboard.owner_email.eq_ignore_ascii_case(owner_email) {
                return Ok(Some(dashboard));
            }
        }
        Ok(None)
    }

    /// Write an owner's whole serialized set, appending a row on first save.
    ///
    /// The set cell and the timestamp cell are two separate writes; a
    /// concurrent save for the same owner can interleave with them.
    pub async fn save_set(
        store: &dyn RowStore,
        owner_email: &str,
        dashboard_set_json: String,
        now: Timestamp,
    ) -> Result<RowId, StoreError> {
        match Self::find_by_owner(store, owner_email).await? {
            Some(existing) => {
                store
                    .write_cell(
                        Table::Dashboards,
                        existing.row,
                        COL_DASHBOARD_SET_JSON,
                        Cell::Text(dashboard_set_json),
                    )
                    .await?;
                store
                    .write_cell(
                        Table::Dashboards,
                        existing.row,
                        COL_LAST_SAVED,
                        Cell::Timestamp(now),
                    )
                    .await?;
                Ok(existing.row)
            }
            None => {
                let new_row = NewDashboardRow {
                    owner_email: owner_email.to_string(),
                    dashboard_set_json,
                    last_saved: now,
                };
                store
                    .append_row(Table::Dashboards, new_row.into_cells())
                    .await
            }
        }
    }
}
