//! Dashboard and live-session engines.
//!
//! Each engine owns the read-modify-write cycle over its table: load a row,
//! apply a pure rule from `classdash_core`, write the whole JSON cell back.
//! No version check is made between the read and the write, so concurrent
//! writers to the same row race and the last one wins.

pub mod dashboard_store;
pub mod session_manager;

pub use dashboard_store::DashboardStore;
pub use session_manager::SessionManager;
