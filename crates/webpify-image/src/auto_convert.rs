//! Conversion of new library assets, right after they are added

use crate::convert::{self, ConvertMode};
use crate::library;
use crate::prelude::*;
use webpify_core::ReplacePolicy;
use webpify_core::hooks::HookRegistry;
use webpify_types::worker::Lane;

pub fn register_hooks(hooks: &mut HookRegistry) {
	hooks.on_asset_added(|app, asset_id| async move { auto_convert(&app, asset_id).await });
}

/// Asset-added hook.
///
/// Does nothing unless auto-convert is on and the asset has an enabled
/// format. WebP is never an enabled source format, so the assets this
/// creates do not trigger another conversion.
pub async fn auto_convert(app: &App, asset_id: AssetId) -> ClResult<()> {
	let settings = app.settings.load().await?;
	if !settings.auto_convert {
		return Ok(());
	}

	let asset = app.media_adapter.read_asset(asset_id).await?;
	if !settings.is_mime_enabled(&asset.mime_type) {
		debug!("auto-convert: asset {} ({}) not enabled", asset_id, asset.mime_type);
		return Ok(());
	}

	let quality = settings.default_quality;
	if settings.keep_original {
		let webp_id =
			convert::convert_asset(app, &asset, quality, ConvertMode::Sibling, Lane::Interactive).await?;
		info!("auto-convert: asset {} -> new asset {}", asset_id, webp_id);
		return Ok(());
	}

	match app.opts.replace_policy {
		ReplacePolicy::InPlace => {
			convert::convert_asset(app, &asset, quality, ConvertMode::ReplaceInPlace, Lane::Interactive)
				.await?;
			info!("auto-convert: asset {} replaced in place", asset_id);
		}
		ReplacePolicy::Delete => {
			let webp_id =
				convert::convert_asset(app, &asset, quality, ConvertMode::Sibling, Lane::Interactive)
					.await?;
			library::delete_asset(app, asset_id).await?;
			info!("auto-convert: asset {} -> new asset {}, original deleted", asset_id, webp_id);
		}
	}
	Ok(())
}

// vim: ts=4
