//! Option key-value store, values kept as JSON text

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use webpify_types::prelude::*;

pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM options WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.map_err(map_err)?;

	let Some(row) = row else { return Ok(None) };
	let value: Option<String> = row.try_get("value").map_err(map_err)?;
	match value {
		None => Ok(None),
		Some(text) => match serde_json::from_str(&text) {
			Ok(value) => Ok(Some(value)),
			Err(err) => {
				warn!("option {:?} holds invalid JSON: {}", name, err);
				Ok(None)
			}
		},
	}
}

/// Update or create an option, `None` removes it
pub(crate) async fn update(
	db: &SqlitePool,
	name: &str,
	value: Option<serde_json::Value>,
) -> ClResult<()> {
	if let Some(val) = value {
		sqlx::query("INSERT OR REPLACE INTO options (name, value) VALUES (?, ?)")
			.bind(name)
			.bind(val.to_string())
			.execute(db)
			.await
			.map_err(map_err)?;
	} else {
		sqlx::query("DELETE FROM options WHERE name = ?")
			.bind(name)
			.execute(db)
			.await
			.map_err(map_err)?;
	}

	Ok(())
}

// vim: ts=4
