//! Classroom dashboard domain logic.
//!
//! Everything in this crate is pure (no storage, no HTTP) so the row store
//! layer and the API engines share one definition of widgets, dashboard
//! sets, live session state, and the rules that mutate them.

pub mod dashboard;
pub mod error;
pub mod session;
pub mod session_code;
pub mod types;
pub mod widget;
