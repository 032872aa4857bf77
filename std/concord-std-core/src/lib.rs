//!
//! concord-std-core - Core Value and Status Types
//!
//! This crate provides the fundamental types shared across all concord standard library crates:
//!
//! - `Scalar` for the one-word payload carried by channels, entries and futures
//! - `ScalarKind` naming the interpretation a `Scalar` is read under
//! - `SyncError` and `SyncResult` for recoverable failures (busy, timed out, ...)
//! - `contract::violation` for programmer errors, which are never turned into a status
//!
//! A `SyncError` means the operation failed and the caller may react. A
//! contract violation means the caller broke a precondition; it panics.
//!

pub mod value;
pub mod error;
pub mod contract;

pub use value::*;
pub use error::*;
