//! Request extractors for caller identity.
//!
//! - [`auth::Caller`] -- Requires a verified identity-provider email.
//! - [`auth::MaybeCaller`] -- Optional identity for reads that degrade to empty.

pub mod auth;
