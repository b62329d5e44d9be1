//! Conversion procedures used by the upload, bulk and auto-convert paths

use serde::{Deserialize, Serialize};

use crate::codec::{self, Converted};
use crate::library::{self, WEBP_MIME};
use crate::prelude::*;
use crate::variant::SizeTier;
use webpify_types::media_adapter::{Asset, UpdateAsset};
use webpify_types::settings::ConverterSettings;
use webpify_types::utils;
use webpify_types::worker::Lane;

/// What happens to an existing asset once its WebP version exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertMode {
	/// Register the WebP as a new asset, leave the original alone
	Sibling,
	/// Point the existing asset at the WebP and remove the original files
	ReplaceInPlace,
}

/// Outcome of converting one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
	pub id: AssetId,
	pub url: String,
}

/// Decode and re-encode on the worker pool
pub async fn convert_data<D>(app: &App, lane: Lane, data: D, quality: u8) -> ClResult<Converted>
where
	D: AsRef<[u8]> + Send + 'static,
{
	app.worker.try_run(lane, move || codec::convert(data.as_ref(), quality, SizeTier::ALL)).await
}

/// Removes freshly written files when the step that should have claimed them failed
async fn discard_on_err<T>(app: &App, files: &[String], res: ClResult<T>) -> ClResult<T> {
	if res.is_err() {
		library::delete_files(app, files).await;
	}
	res
}

/// Converts an uploaded file into a new WebP asset in the current upload directory
pub async fn convert_upload<D>(
	app: &App,
	settings: &ConverterSettings,
	file_name: &str,
	data: D,
) -> ClResult<ConversionResult>
where
	D: AsRef<[u8]> + Send + 'static,
{
	let sanitized = utils::sanitize_file_name(file_name);
	let stem = utils::file_stem(&sanitized);

	let converted = convert_data(app, Lane::Interactive, data, settings.default_quality).await?;
	let dir = utils::upload_subdir(Timestamp::now());
	let (file_path, metadata) = library::store_converted(app, &dir, stem, &converted).await?;
	drop(converted);

	let new_files = library::stored_files(&file_path, Some(&metadata));
	let res = library::register_asset(app, &file_path, WEBP_MIME, stem, Some(metadata)).await;
	let id = discard_on_err(app, &new_files, res).await?;
	let url = app.hooks.filter_asset_url(app, settings, id, app.upload_url(&file_path));
	Ok(ConversionResult { id, url })
}

/// Converts an existing library asset to WebP.
///
/// Returns the id of the asset now holding the WebP: a new one in `Sibling`
/// mode, the same one in `ReplaceInPlace` mode.
pub async fn convert_asset(
	app: &App,
	asset: &Asset,
	quality: u8,
	mode: ConvertMode,
	lane: Lane,
) -> ClResult<AssetId> {
	let data = app.blob_adapter.read_file(&asset.file_path).await?;
	let converted = convert_data(app, lane, data, quality).await?;

	let target = utils::webp_path(&asset.file_path);
	let (dir, _) = utils::split_dir(&target);
	let (file_path, metadata) =
		library::store_converted(app, dir, utils::file_stem(&target), &converted).await?;
	drop(converted);
	let new_files = library::stored_files(&file_path, Some(&metadata));

	match mode {
		ConvertMode::Sibling => {
			let title = utils::file_stem(&file_path);
			let res = library::register_asset(app, &file_path, WEBP_MIME, title, Some(metadata)).await;
			discard_on_err(app, &new_files, res).await
		}
		ConvertMode::ReplaceInPlace => {
			let old_files = library::asset_files(asset);
			let update = UpdateAsset {
				file_path: Some(file_path.as_str().into()),
				mime_type: Some(WEBP_MIME.into()),
				metadata: Some(metadata),
				..Default::default()
			};
			let res = app.media_adapter.update_asset(asset.asset_id, &update).await;
			discard_on_err(app, &new_files, res).await?;

			let stale: Vec<String> =
				old_files.into_iter().filter(|file| !new_files.contains(file)).collect();
			library::delete_files(app, &stale).await;
			info!("asset {} replaced in place: {} -> {}", asset.asset_id, asset.file_path, file_path);
			Ok(asset.asset_id)
		}
	}
}

// vim: ts=4
