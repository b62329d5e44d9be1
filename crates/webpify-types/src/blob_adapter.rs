//! Upload directory adapter. All paths are relative to the upload root and
//! use `/` as separator; adapters must reject paths escaping the root.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait BlobAdapter: Debug + Send + Sync {
	/// Writes (or overwrites) a file, creating parent directories
	async fn write_file(&self, path: &str, data: &[u8]) -> ClResult<()>;

	/// Reads a whole file, `Error::NotFound` if missing
	async fn read_file(&self, path: &str) -> ClResult<Box<[u8]>>;

	/// Checks if a file exists, returns its size
	async fn stat_file(&self, path: &str) -> Option<u64>;

	/// Removes a file, missing files are not an error
	async fn delete_file(&self, path: &str) -> ClResult<()>;
}

// vim: ts=4
