//! Core infrastructure for webpify.
//!
//! App state, request extractors, the nonce and capability middleware, the
//! hook registry and the settings service. Feature crates (`webpify-image`)
//! build on top of this, the `webpify` crate wires everything together.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extract;
pub mod hooks;
pub mod middleware;
pub mod nonce;
pub mod prelude;
pub mod settings;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState, ReplacePolicy};
pub use extract::{Auth, FormFields, OptionalRequestId, RequestId};
pub use hooks::HookRegistry;
pub use nonce::NonceService;

// vim: ts=4
