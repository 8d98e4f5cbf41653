//! Sessions table rows.

use classdash_core::types::{RowId, Timestamp};

use crate::store::{Cell, Row, StoreError, Table};

pub const COL_CODE: usize = 0;
pub const COL_TEACHER_EMAIL: usize = 1;
pub const COL_SESSION_STATE_JSON: usize = 2;
pub const COL_CREATED_AT: usize = 3;
pub const COL_ACTIVE: usize = 4;

/// A row from the `sessions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub row: RowId,
    pub code: String,
    pub teacher_email: String,
    pub session_state_json: String,
    pub created_at: Option<Timestamp>,
    pub active: bool,
}

fn cell_error(column: &'static str, detail: &str) -> StoreError {
    StoreError::CellType {
        table: Table::Sessions,
        column,
        detail: detail.to_string(),
    }
}

impl SessionRow {
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        let text = |column: usize, name: &'static str| {
            row.cell(column)
                .as_text()
                .map(str::to_string)
                .ok_or_else(|| cell_error(name, "expected text"))
        };

        Ok(Self {
            row: row.id,
            code: text(COL_CODE, "code")?,
            teacher_email: text(COL_TEACHER_EMAIL, "teacher_email")?,
            session_state_json: text(COL_SESSION_STATE_JSON, "session_state_json")?,
            created_at: row.cell(COL_CREATED_AT).as_timestamp(),
            active: row
                .cell(COL_ACTIVE)
                .as_bool()
                .ok_or_else(|| cell_error("active", "expected bool"))?,
        })
    }

    /// Case-insensitive teacher match.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.teacher_email.eq_ignore_ascii_case(email)
    }
}

/// Cells for a freshly created session.
#[derive(Debug, Clone)]
pub struct NewSessionRow {
    pub code: String,
    pub teacher_email: String,
    pub session_state_json: String,
    pub created_at: Timestamp,
}

impl NewSessionRow {
    /// New sessions are always appended active.
    pub fn into_cells(self) -> Vec<Cell> {
        vec![
            Cell::Text(self.code),
            Cell::Text(self.teacher_email),
            Cell::Text(self.session_state_json),
            Cell::Timestamp(self.created_at),
            Cell::Bool(true),
        ]
    }
}
