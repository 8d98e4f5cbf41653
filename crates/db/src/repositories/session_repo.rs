//! Repository for the `sessions` table.

use std::collections::HashSet;

use classdash_core::types::RowId;

use crate::models::session::{NewSessionRow, SessionRow, COL_ACTIVE, COL_SESSION_STATE_JSON};
use crate::store::{Cell, RowStore, StoreError, Table};

/// Provides scan-based lookups and cell writes for live sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Every session row, oldest first.
    pub async fn list(store: &dyn RowStore) -> Result<Vec<SessionRow>, StoreError> {
        store
            .read_all_rows(Table::Sessions)
            .await?
            .iter()
            .map(SessionRow::from_row)
            .collect()
    }

    /// Find the active row with this code. `code` must already be normalized.
    pub async fn find_active_by_code(
        store: &dyn RowStore,
        code: &str,
    ) -> Result<Option<SessionRow>, StoreError> {
        Ok(Self::list(store)
            .await?
            .into_iter()
            .find(|s| s.active && s.code == code))
    }

    /// Find a row with this code whether or not it is still active.
    ///
    /// An active row is preferred; otherwise the most recent ended row.
    pub async fn find_by_code(
        store: &dyn RowStore,
        code: &str,
    ) -> Result<Option<SessionRow>, StoreError> {
        let mut latest_ended = None;
        for session in Self::list(store).await? {
            if session.code != code {
                continue;
            }
            if session.active {
                return Ok(Some(session));
            }
            latest_ended = Some(session);
        }
        Ok(latest_ended)
    }

    /// The teacher's active session, if any. The newest wins if several exist.
    pub async fn find_active_by_teacher(
        store: &dyn RowStore,
        teacher_email: &str,
    ) -> Result<Option<SessionRow>, StoreError> {
        Ok(Self::list(store)
            .await?
            .into_iter()
            .rev()
            .find(|s| s.active && s.is_owned_by(teacher_email)))
    }

    /// Codes of all currently active sessions.
    pub async fn active_codes(store: &dyn RowStore) -> Result<HashSet<String>, StoreError> {
        Ok(Self::list(store)
            .await?
            .into_iter()
            .filter(|s| s.active)
            .map(|s| s.code)
            .collect())
    }

    /// Deactivate every active row owned by the teacher. Returns the count.
    pub async fn deactivate_all_for_teacher(
        store: &dyn RowStore,
        teacher_email: &str,
    ) -> Result<u64, StoreError> {
        let mut count = 0;
        for session in Self::list(store).await? {
            if session.active && session.is_owned_by(teacher_email) {
                Self::deactivate(store, session.row).await?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Append a new active session row.
    pub async fn create(store: &dyn RowStore, input: NewSessionRow) -> Result<RowId, StoreError> {
        store.append_row(Table::Sessions, input.into_cells()).await
    }

    /// Overwrite the serialized state cell.
    pub async fn write_state(
        store: &dyn RowStore,
        row: RowId,
        session_state_json: String,
    ) -> Result<(), StoreError> {
        store
            .write_cell(
                Table::Sessions,
                row,
                COL_SESSION_STATE_JSON,
                Cell::Text(session_state_json),
            )
            .await
    }

    /// Mark a row ended. Rows are never deleted.
    pub async fn deactivate(store: &dyn RowStore, row: RowId) -> Result<(), StoreError> {
        store
            .write_cell(Table::Sessions, row, COL_ACTIVE, Cell::Bool(false))
            .await
    }
}
