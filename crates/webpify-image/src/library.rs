//! Media library operations shared by the converters.
//!
//! Storing converted files, registering assets, deleting them with their
//! size variants, and building the public (filtered) URLs of an asset.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::codec::Converted;
use crate::prelude::*;
use crate::variant::{SizeTier, variant_file_name};
use webpify_core::app::AppState;
use webpify_core::hooks::SrcsetCandidate;
use webpify_types::media_adapter::{Asset, AssetMetadata, CreateAsset, SizeMeta, UpdateAsset};
use webpify_types::settings::ConverterSettings;
use webpify_types::utils;

pub const WEBP_MIME: &str = "image/webp";

/// Gives up on numbered names after this many tries and falls back to a random suffix
const MAX_NAME_TRIES: u32 = 1000;

/// Find a free `{dir}/{stem}.{ext}`, numbering the stem (`-1`, `-2`, ...) when taken
pub async fn unique_path(app: &App, dir: &str, stem: &str, ext: &str) -> ClResult<String> {
	for n in 0..MAX_NAME_TRIES {
		let path = utils::join_path(dir, &utils::numbered_name(stem, ext, n));
		if app.blob_adapter.stat_file(&path).await.is_none() {
			return Ok(path);
		}
	}
	let stem = format!("{}-{}", stem, utils::random_id()?);
	Ok(utils::join_path(dir, &utils::numbered_name(&stem, ext, 0)))
}

/// Writes a converted image (full size and size variants) under `dir`.
///
/// Returns the path of the full size file and the metadata describing it.
/// When a write fails, the files already written are removed.
pub async fn store_converted(
	app: &App,
	dir: &str,
	stem: &str,
	converted: &Converted,
) -> ClResult<(String, AssetMetadata)> {
	let file_path = unique_path(app, dir, stem, "webp").await?;
	app.blob_adapter.write_file(&file_path, &converted.main.data).await?;

	let (dir, _) = utils::split_dir(&file_path);
	let stem = utils::file_stem(&file_path);
	let mut written = vec![file_path.clone()];
	let mut sizes = BTreeMap::new();
	for variant in &converted.variants {
		let name = variant_file_name(stem, variant.image.width, variant.image.height);
		let path = utils::join_path(dir, &name);
		if let Err(err) = app.blob_adapter.write_file(&path, &variant.image.data).await {
			delete_files(app, &written).await;
			return Err(err);
		}
		written.push(path);
		sizes.insert(
			Box::from(variant.tier.as_str()),
			SizeMeta {
				file: name.into(),
				width: variant.image.width,
				height: variant.image.height,
				mime_type: WEBP_MIME.into(),
			},
		);
	}

	let metadata = AssetMetadata {
		width: converted.main.width,
		height: converted.main.height,
		file: file_path.as_str().into(),
		sizes,
	};
	Ok((file_path, metadata))
}

/// Creates an asset record, attaches its metadata and runs the asset-added hooks
pub async fn register_asset(
	app: &App,
	file_path: &str,
	mime_type: &str,
	title: &str,
	metadata: Option<AssetMetadata>,
) -> ClResult<AssetId> {
	let asset_id =
		app.media_adapter.create_asset(&CreateAsset { file_path, mime_type, title }).await?;
	if metadata.is_some() {
		let update = UpdateAsset { metadata, ..Default::default() };
		if let Err(err) = app.media_adapter.update_asset(asset_id, &update).await {
			// No half registered assets: the record goes, the caller owns the files
			if let Err(del_err) = app.media_adapter.delete_asset(asset_id).await {
				warn!("cannot roll back asset {}: {}", asset_id, del_err);
			}
			return Err(err);
		}
	}
	info!("asset {} registered: {} ({})", asset_id, file_path, mime_type);

	app.hooks.fire_asset_added(app, asset_id).await;
	Ok(asset_id)
}

/// Paths of every file belonging to an asset: the main file and its size variants
pub fn asset_files(asset: &Asset) -> Vec<String> {
	stored_files(&asset.file_path, asset.metadata.as_ref())
}

/// Paths of a main file and the size variants listed in its metadata
pub fn stored_files(file_path: &str, metadata: Option<&AssetMetadata>) -> Vec<String> {
	let (dir, _) = utils::split_dir(file_path);
	let mut files = vec![file_path.to_string()];
	if let Some(metadata) = metadata {
		files.extend(metadata.sizes.values().map(|size| utils::join_path(dir, &size.file)));
	}
	files
}

/// Removes files, logging (not failing on) individual errors
pub async fn delete_files(app: &App, files: &[String]) {
	for file in files {
		if let Err(err) = app.blob_adapter.delete_file(file).await {
			warn!("cannot delete {}: {}", file, err);
		}
	}
}

/// Deletes an asset record together with its files
pub async fn delete_asset(app: &App, asset_id: AssetId) -> ClResult<()> {
	let asset = app.media_adapter.read_asset(asset_id).await?;
	app.media_adapter.delete_asset(asset_id).await?;
	delete_files(app, &asset_files(&asset)).await;
	info!("asset {} deleted ({})", asset_id, asset.file_path);
	Ok(())
}

// Public URLs //
//*************//
/// Public URL of an asset, passed through the asset URL filters
pub fn asset_url(app: &AppState, settings: &ConverterSettings, asset: &Asset) -> String {
	let url = app.upload_url(&asset.file_path);
	app.hooks.filter_asset_url(app, settings, asset.asset_id, url)
}

/// Responsive candidates of an asset (full size plus uncropped variants), filtered
pub fn srcset(app: &AppState, settings: &ConverterSettings, asset: &Asset) -> Vec<SrcsetCandidate> {
	let Some(metadata) = &asset.metadata else { return Vec::new() };
	let (dir, _) = utils::split_dir(&asset.file_path);

	let mut candidates: Vec<SrcsetCandidate> = metadata
		.sizes
		.iter()
		.filter(|(name, _)| SizeTier::from_str_opt(name).is_none_or(|tier| tier.responsive()))
		.map(|(_, size)| SrcsetCandidate {
			url: app.upload_url(&utils::join_path(dir, &size.file)),
			width: size.width,
		})
		.collect();
	candidates.push(SrcsetCandidate { url: app.upload_url(&asset.file_path), width: metadata.width });
	candidates.sort_by_key(|c| c.width);
	candidates.dedup_by_key(|c| c.width);

	app.hooks.filter_srcset(app, settings, asset.asset_id, candidates)
}

/// Public representation of an asset
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaView {
	pub id: AssetId,
	pub url: String,
	pub mime_type: String,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub width: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub height: Option<u32>,
	pub sizes: BTreeMap<String, String>,
	pub srcset: Vec<SrcsetCandidate>,
	pub created_at: Timestamp,
}

pub fn media_view(app: &AppState, settings: &ConverterSettings, asset: &Asset) -> MediaView {
	let (dir, _) = utils::split_dir(&asset.file_path);
	let sizes = asset
		.metadata
		.iter()
		.flat_map(|m| m.sizes.iter())
		.map(|(name, size)| {
			let url = app.upload_url(&utils::join_path(dir, &size.file));
			(name.to_string(), app.hooks.filter_asset_url(app, settings, asset.asset_id, url))
		})
		.collect();

	MediaView {
		id: asset.asset_id,
		url: asset_url(app, settings, asset),
		mime_type: asset.mime_type.to_string(),
		title: asset.title.to_string(),
		width: asset.metadata.as_ref().map(|m| m.width),
		height: asset.metadata.as_ref().map(|m| m.height),
		sizes,
		srcset: srcset(app, settings, asset),
		created_at: asset.created_at,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_asset_files_include_sizes() {
		let mut sizes = BTreeMap::new();
		sizes.insert(
			Box::from("thumbnail"),
			SizeMeta {
				file: "photo-150x150.jpg".into(),
				width: 150,
				height: 150,
				mime_type: "image/jpeg".into(),
			},
		);
		let asset = Asset {
			asset_id: AssetId(3),
			file_path: "2026/10/photo.jpg".into(),
			mime_type: "image/jpeg".into(),
			title: "photo".into(),
			metadata: Some(AssetMetadata {
				width: 500,
				height: 500,
				file: "2026/10/photo.jpg".into(),
				sizes,
			}),
			created_at: Timestamp(0),
		};
		assert_eq!(asset_files(&asset), vec!["2026/10/photo.jpg", "2026/10/photo-150x150.jpg"]);
	}
}

// vim: ts=4
