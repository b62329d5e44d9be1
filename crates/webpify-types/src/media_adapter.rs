//! Media library adapter. Stores asset records and the option table.
//!
//! Asset files themselves are not stored here, see `blob_adapter`. An asset
//! only references its file by a path relative to the upload directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Size variant entry of the attachment metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMeta {
	/// File name, relative to the directory of the main file
	pub file: Box<str>,
	pub width: u32,
	pub height: u32,
	pub mime_type: Box<str>,
}

/// Generated attachment metadata (dimensions and size variants)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
	pub width: u32,
	pub height: u32,
	/// Path of the main file, relative to the upload directory
	pub file: Box<str>,
	#[serde(default)]
	pub sizes: BTreeMap<Box<str>, SizeMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
	pub asset_id: AssetId,
	/// Path relative to the upload directory (e.g. `2026/10/photo.jpg`)
	pub file_path: Box<str>,
	pub mime_type: Box<str>,
	pub title: Box<str>,
	pub metadata: Option<AssetMetadata>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateAsset<'a> {
	pub file_path: &'a str,
	pub mime_type: &'a str,
	pub title: &'a str,
}

/// Partial asset update, `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateAsset {
	pub file_path: Option<Box<str>>,
	pub mime_type: Option<Box<str>>,
	pub title: Option<Box<str>>,
	pub metadata: Option<AssetMetadata>,
}

/// Asset query. Results are always ordered by ascending `asset_id`.
#[derive(Debug, Clone, Default)]
pub struct ListAssetOptions {
	/// Only assets with one of these MIME types (empty = no assets)
	pub mime_types: Vec<Box<str>>,
	/// Keyset pagination: only assets with a greater id
	pub after_id: Option<AssetId>,
	pub offset: Option<u64>,
	pub limit: Option<u32>,
}

impl ListAssetOptions {
	pub fn with_mime_types<S: AsRef<str>>(mime_types: &[S]) -> Self {
		Self {
			mime_types: mime_types.iter().map(|m| Box::from(m.as_ref())).collect(),
			..Default::default()
		}
	}
}

#[async_trait]
pub trait MediaAdapter: Debug + Send + Sync {
	// Assets
	//********
	/// Registers a new asset, returns its id
	async fn create_asset(&self, asset: &CreateAsset<'_>) -> ClResult<AssetId>;

	/// Reads an asset, `Error::NotFound` if it does not exist
	async fn read_asset(&self, asset_id: AssetId) -> ClResult<Asset>;

	async fn update_asset(&self, asset_id: AssetId, update: &UpdateAsset) -> ClResult<()>;

	/// Removes the asset record (its files are the caller's business)
	async fn delete_asset(&self, asset_id: AssetId) -> ClResult<()>;

	async fn list_assets(&self, opts: &ListAssetOptions) -> ClResult<Vec<Asset>>;

	/// Counts assets matching `opts`, ignoring offset and limit
	async fn count_assets(&self, opts: &ListAssetOptions) -> ClResult<u64>;

	// Options
	//*********
	async fn read_option(&self, name: &str) -> ClResult<Option<serde_json::Value>>;

	/// Writes an option, `None` deletes it
	async fn update_option(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()>;
}

// vim: ts=4
