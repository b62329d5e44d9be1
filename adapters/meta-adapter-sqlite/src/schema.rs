//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Assets
	//********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS assets (
		asset_id integer PRIMARY KEY AUTOINCREMENT,
		file_path text NOT NULL,
		mime_type text NOT NULL,
		title text NOT NULL DEFAULT '',
		metadata json,
		created_at integer DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_assets_mime ON assets(mime_type, asset_id)")
		.execute(&mut *tx)
		.await?;

	// Options
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS options (
		name text NOT NULL,
		value json,
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
