//! Upload directory adapter on the local filesystem.
//!
//! Paths given to the adapter are relative to `base_dir`, separated by `/`.
//! Anything that could leave the base directory is refused.

use std::{
	fmt::Debug,
	path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{
	fs::{File, create_dir_all, metadata, remove_file, rename},
	io::{AsyncReadExt, AsyncWriteExt},
};

use webpify_types::{blob_adapter, prelude::*, utils};

/// Resolves a relative upload path below `base_dir`
fn resolve(base_dir: &Path, path: &str) -> ClResult<PathBuf> {
	if path.is_empty() || path.contains('\\') || path.contains('\0') {
		return Err(Error::ValidationError(format!("invalid path: {:?}", path)));
	}
	let rel = Path::new(path);
	if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
		return Err(Error::ValidationError(format!("invalid path: {:?}", path)));
	}
	Ok(base_dir.join(rel))
}

#[derive(Debug)]
pub struct BlobAdapterFs {
	base_dir: Box<Path>,
}

impl BlobAdapterFs {
	pub async fn new(base_dir: Box<Path>) -> ClResult<Self> {
		create_dir_all(&base_dir).await?;
		Ok(Self { base_dir })
	}
}

#[async_trait]
impl blob_adapter::BlobAdapter for BlobAdapterFs {
	/// Writes into a temporary file first, then renames it into place
	async fn write_file(&self, path: &str, data: &[u8]) -> ClResult<()> {
		let file_path = resolve(&self.base_dir, path)?;
		let dir = file_path.parent().unwrap_or(&self.base_dir);
		create_dir_all(dir).await?;

		let tmp_path = dir.join(format!(".tmp-{}", utils::random_id()?));
		let res = async {
			let mut file = File::create(&tmp_path).await?;
			file.write_all(data).await?;
			file.sync_all().await?;
			rename(&tmp_path, &file_path).await?;
			Ok::<(), Error>(())
		}
		.await;
		if let Err(err) = res {
			warn!("write_file {:?} failed: {}", file_path, err);
			let _ = remove_file(&tmp_path).await;
			return Err(err);
		}
		debug!("write_file: {:?} ({} bytes)", file_path, data.len());

		Ok(())
	}

	async fn read_file(&self, path: &str) -> ClResult<Box<[u8]>> {
		let file_path = resolve(&self.base_dir, path)?;
		let mut file = match File::open(&file_path).await {
			Ok(file) => file,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(Error::NotFound),
			Err(err) => return Err(err.into()),
		};
		let mut buf: Vec<u8> = Vec::new();
		file.read_to_end(&mut buf).await?;

		Ok(buf.into_boxed_slice())
	}

	async fn stat_file(&self, path: &str) -> Option<u64> {
		let file_path = resolve(&self.base_dir, path).ok()?;
		let file_metadata = metadata(&file_path).await.ok()?;
		file_metadata.is_file().then(|| file_metadata.len())
	}

	async fn delete_file(&self, path: &str) -> ClResult<()> {
		let file_path = resolve(&self.base_dir, path)?;
		match remove_file(&file_path).await {
			Ok(()) => {
				debug!("delete_file: {:?}", file_path);
				Ok(())
			}
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_rejects_escapes() {
		let base = Path::new("/srv/uploads");
		assert!(resolve(base, "../etc/passwd").is_err());
		assert!(resolve(base, "2026/../../x").is_err());
		assert!(resolve(base, "/etc/passwd").is_err());
		assert!(resolve(base, "a\\b.jpg").is_err());
		assert!(resolve(base, "./a.jpg").is_err());
		assert!(resolve(base, "").is_err());
	}

	#[test]
	fn test_resolve_relative() {
		let base = Path::new("/srv/uploads");
		assert_eq!(
			resolve(base, "2026/10/a.webp").ok(),
			Some(PathBuf::from("/srv/uploads/2026/10/a.webp"))
		);
	}
}

// vim: ts=4
