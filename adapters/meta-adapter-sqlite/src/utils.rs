//! Shared helpers: error mapping and `IN (...)` list binding

use sqlx::sqlite::SqliteRow;
use webpify_types::prelude::*;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Translate a query error, `RowNotFound` becomes `Error::NotFound`
pub(crate) fn map_err(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::RowNotFound => Error::NotFound,
		err => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Map a single-row query result, translating SQL errors to ClResult
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> ClResult<T>
where
	F: FnOnce(SqliteRow) -> ClResult<T>,
{
	match row {
		Ok(row) => f(row),
		Err(err) => Err(map_err(err)),
	}
}

/// Appends `(?, ?, ...)` with one binding per value
pub(crate) fn push_in<'a>(query: &mut sqlx::QueryBuilder<'a, sqlx::Sqlite>, values: &'a [Box<str>]) {
	query.push("(");
	let mut separated = query.separated(", ");
	for value in values {
		separated.push_bind(value.as_ref());
	}
	separated.push_unseparated(")");
}

// vim: ts=4
