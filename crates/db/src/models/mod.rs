//! Typed views over raw row store rows.
//!
//! Each submodule contains:
//! - Column index constants for the table
//! - An entity struct decoded from a [`crate::store::Row`]
//! - A `New*` struct encoding the cells of an appended row

pub mod dashboard;
pub mod session;
