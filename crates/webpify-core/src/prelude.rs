pub use crate::app::App;
pub use webpify_types::prelude::*;

// vim: ts=4
