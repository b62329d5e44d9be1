//! WebP conversion for webpify.
//!
//! Single and multi-file conversion of uploads, bulk conversion of the
//! existing library in rounds, conversion of new assets as they are added,
//! and CDN rewriting of public asset URLs.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod auto_convert;
pub mod bulk;
pub mod cdn;
pub mod codec;
pub mod convert;
pub mod handler;
pub mod library;
pub mod variant;

mod prelude;

use webpify_core::hooks::{HookRegistry, LifecycleEvent};

use crate::prelude::*;

/// Registers every hook of the conversion features
pub fn register_hooks(hooks: &mut HookRegistry) {
	hooks.on_lifecycle(|app, event| async move {
		match event {
			LifecycleEvent::Activated => info!(
				"WebP converter active, upload base {}, replace policy {:?}",
				app.upload_base_url(),
				app.opts.replace_policy
			),
			LifecycleEvent::Deactivated => info!("WebP converter deactivated"),
		}
		Ok(())
	});
	auto_convert::register_hooks(hooks);
	cdn::register_hooks(hooks);
}

// vim: ts=4
