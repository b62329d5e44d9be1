//! Asset records

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use webpify_types::media_adapter::*;
use webpify_types::prelude::*;

const ASSET_COLS: &str = "asset_id, file_path, mime_type, title, metadata, created_at";

fn row_to_asset(row: SqliteRow) -> ClResult<Asset> {
	let asset_id: i64 = row.try_get("asset_id").map_err(map_err)?;
	let metadata: Option<String> = row.try_get("metadata").map_err(map_err)?;
	let metadata = match metadata {
		Some(text) => match serde_json::from_str::<AssetMetadata>(&text) {
			Ok(metadata) => Some(metadata),
			Err(err) => {
				warn!("asset {}: unreadable metadata: {}", asset_id, err);
				None
			}
		},
		None => None,
	};
	let created_at: Option<i64> = row.try_get("created_at").map_err(map_err)?;

	Ok(Asset {
		asset_id: AssetId(asset_id as u64),
		file_path: row.try_get::<String, _>("file_path").map_err(map_err)?.into(),
		mime_type: row.try_get::<String, _>("mime_type").map_err(map_err)?.into(),
		title: row.try_get::<String, _>("title").map_err(map_err)?.into(),
		metadata,
		created_at: Timestamp(created_at.unwrap_or_default()),
	})
}

/// Appends the WHERE clause shared by `list` and `count`
fn push_filter<'a>(query: &mut sqlx::QueryBuilder<'a, sqlx::Sqlite>, opts: &'a ListAssetOptions) {
	if opts.mime_types.is_empty() {
		query.push(" WHERE 0");
		return;
	}
	query.push(" WHERE mime_type IN ");
	push_in(query, &opts.mime_types);

	if let Some(after_id) = opts.after_id {
		query.push(" AND asset_id > ").push_bind(after_id.0 as i64);
	}
}

pub(crate) async fn create(db: &SqlitePool, asset: &CreateAsset<'_>) -> ClResult<AssetId> {
	let res = sqlx::query(
		"INSERT INTO assets (file_path, mime_type, title) VALUES (?, ?, ?) RETURNING asset_id",
	)
	.bind(asset.file_path)
	.bind(asset.mime_type)
	.bind(asset.title)
	.fetch_one(db)
	.await;

	map_res(res, |row| {
		let asset_id: i64 = row.try_get("asset_id").map_err(map_err)?;
		Ok(AssetId(asset_id as u64))
	})
}

pub(crate) async fn read(db: &SqlitePool, asset_id: AssetId) -> ClResult<Asset> {
	let res = sqlx::query(&format!("SELECT {} FROM assets WHERE asset_id = ?", ASSET_COLS))
		.bind(asset_id.0 as i64)
		.fetch_one(db)
		.await;

	map_res(res, row_to_asset)
}

pub(crate) async fn update(db: &SqlitePool, asset_id: AssetId, update: &UpdateAsset) -> ClResult<()> {
	let metadata = update.metadata.as_ref().map(serde_json::to_string).transpose()?;

	let mut query = sqlx::QueryBuilder::new("UPDATE assets SET ");
	let mut fields = query.separated(", ");
	let mut has_updates = false;
	if let Some(file_path) = &update.file_path {
		fields.push("file_path = ").push_bind_unseparated(file_path.as_ref());
		has_updates = true;
	}
	if let Some(mime_type) = &update.mime_type {
		fields.push("mime_type = ").push_bind_unseparated(mime_type.as_ref());
		has_updates = true;
	}
	if let Some(title) = &update.title {
		fields.push("title = ").push_bind_unseparated(title.as_ref());
		has_updates = true;
	}
	if let Some(metadata) = metadata {
		fields.push("metadata = ").push_bind_unseparated(metadata);
		has_updates = true;
	}

	if !has_updates {
		// Nothing to change, but a missing asset is still reported
		read(db, asset_id).await?;
		return Ok(());
	}

	query.push(" WHERE asset_id = ").push_bind(asset_id.0 as i64);
	let res = query.build().execute(db).await.map_err(map_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn delete(db: &SqlitePool, asset_id: AssetId) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM assets WHERE asset_id = ?")
		.bind(asset_id.0 as i64)
		.execute(db)
		.await
		.map_err(map_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

/// List assets ordered by ascending id
pub(crate) async fn list(db: &SqlitePool, opts: &ListAssetOptions) -> ClResult<Vec<Asset>> {
	let mut query = sqlx::QueryBuilder::new(format!("SELECT {} FROM assets", ASSET_COLS));
	push_filter(&mut query, opts);
	query.push(" ORDER BY asset_id");

	// Offsets beyond what SQLite can bind are past the end anyway
	let offset = opts.offset.map(|offset| i64::try_from(offset).unwrap_or(i64::MAX));
	match (opts.limit, offset) {
		(Some(limit), offset) => {
			query.push(" LIMIT ").push_bind(i64::from(limit));
			if let Some(offset) = offset {
				query.push(" OFFSET ").push_bind(offset);
			}
		}
		(None, Some(offset)) => {
			query.push(" LIMIT -1 OFFSET ").push_bind(offset);
		}
		(None, None) => {}
	}

	let rows = query.build().fetch_all(db).await.map_err(map_err)?;
	rows.into_iter().map(row_to_asset).collect()
}

pub(crate) async fn count(db: &SqlitePool, opts: &ListAssetOptions) -> ClResult<u64> {
	let mut query = sqlx::QueryBuilder::new("SELECT count(*) AS cnt FROM assets");
	push_filter(&mut query, opts);

	let res = query.build().fetch_one(db).await;
	map_res(res, |row| {
		let cnt: i64 = row.try_get("cnt").map_err(map_err)?;
		Ok(cnt as u64)
	})
}

// vim: ts=4
