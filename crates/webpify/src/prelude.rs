pub use webpify_core::prelude::*;

// vim: ts=4
