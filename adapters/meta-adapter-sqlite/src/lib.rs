//! SQLite media library adapter: asset records and the option table.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod asset;
mod option;
mod schema;
mod utils;

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use webpify_types::{media_adapter, prelude::*};

/// File name of the database inside the data directory
pub const DB_FILE: &str = "media.db";

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) `media.db` in the `data_dir` directory
	pub async fn new(data_dir: impl AsRef<Path>) -> ClResult<Self> {
		let data_dir = data_dir.as_ref();
		tokio::fs::create_dir_all(data_dir).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(data_dir.join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db })
	}
}

#[async_trait]
impl media_adapter::MediaAdapter for MetaAdapterSqlite {
	// Assets
	//********
	async fn create_asset(&self, asset: &media_adapter::CreateAsset<'_>) -> ClResult<AssetId> {
		asset::create(&self.db, asset).await
	}

	async fn read_asset(&self, asset_id: AssetId) -> ClResult<media_adapter::Asset> {
		asset::read(&self.db, asset_id).await
	}

	async fn update_asset(
		&self,
		asset_id: AssetId,
		update: &media_adapter::UpdateAsset,
	) -> ClResult<()> {
		asset::update(&self.db, asset_id, update).await
	}

	async fn delete_asset(&self, asset_id: AssetId) -> ClResult<()> {
		asset::delete(&self.db, asset_id).await
	}

	async fn list_assets(
		&self,
		opts: &media_adapter::ListAssetOptions,
	) -> ClResult<Vec<media_adapter::Asset>> {
		asset::list(&self.db, opts).await
	}

	async fn count_assets(&self, opts: &media_adapter::ListAssetOptions) -> ClResult<u64> {
		asset::count(&self.db, opts).await
	}

	// Options
	//*********
	async fn read_option(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		option::read(&self.db, name).await
	}

	async fn update_option(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		option::update(&self.db, name, value).await
	}
}

// vim: ts=4
