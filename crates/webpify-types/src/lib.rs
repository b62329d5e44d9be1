//! Shared types, adapter traits, and core utilities for webpify.
//!
//! Everything the feature crates and the storage adapters need to agree on
//! lives here: the error type, the settings record, asset records and the
//! adapter traits, plus the blocking worker pool used for codec work.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod blob_adapter;
pub mod error;
pub mod media_adapter;
pub mod prelude;
pub mod settings;
pub mod types;
pub mod utils;
pub mod worker;

// vim: ts=4
