//! Foundation types for skinswitch.
//!
//! This crate holds the pieces shared by every skinswitch crate: the
//! arena-based page document the switchers mutate, and the error type.

pub mod dom;
pub mod error;
