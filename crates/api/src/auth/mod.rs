//! Authentication primitives.
//!
//! - [`identity`] -- validation of identity-provider tokens carrying a verified email.

pub mod identity;
