//! webpify is a self-hosted media service that turns JPEG, PNG and GIF
//! library images into WebP.
//!
//! # Features
//!
//! - Conversion of uploaded images, one or many per request
//! - Bulk conversion of the existing library, in resumable rounds
//! - Automatic conversion of new assets as they are added
//! - Size variants (thumbnail, medium, medium_large, large) for every image
//! - CDN rewriting of public asset URLs
//! - Pluggable storage
//!     - asset records and options (SQLite by default)
//!     - upload directory (local filesystem by default)

// Re-export shared types and adapter traits from webpify-types
pub use webpify_types::blob_adapter;
pub use webpify_types::error;
pub use webpify_types::media_adapter;
pub use webpify_types::settings;
pub use webpify_types::types;
pub use webpify_types::utils;
pub use webpify_types::worker;

// Feature crate re-exports
pub use webpify_core as core;
pub use webpify_image as image;

// Local modules
pub mod admin;
pub mod app;
pub mod prelude;
pub mod routes;
pub mod webserver;

pub use crate::app::{App, AppBuilder, ReplacePolicy};

// vim: ts=4
