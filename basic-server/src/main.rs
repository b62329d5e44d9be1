//! webpify server with the SQLite media adapter and the filesystem upload
//! directory, configured from `WEBPIFY_*` environment variables.

use std::{env, path::PathBuf, process::ExitCode, sync::Arc};

use tracing::{error, info, warn};
use webpify::error::{ClResult, Error};
use webpify::worker::WorkerPool;
use webpify::{AppBuilder, ReplacePolicy};
use webpify_blob_adapter_fs::BlobAdapterFs;
use webpify_meta_adapter_sqlite::MetaAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub data_dir: PathBuf,
	pub upload_dir: PathBuf,
	pub dist_dir: PathBuf,
	pub base_url: String,
	pub secret: Option<String>,
	pub admin_token: Option<String>,
	pub replace_policy: ReplacePolicy,
	pub workers: usize,
}

fn var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
	pub fn from_env() -> ClResult<Self> {
		let listen = var("WEBPIFY_LISTEN").unwrap_or_else(|| "127.0.0.1:8080".into());
		let data_dir = PathBuf::from(var("WEBPIFY_DATA_DIR").unwrap_or_else(|| "./data".into()));
		let upload_dir = var("WEBPIFY_UPLOAD_DIR").map_or_else(|| data_dir.join("uploads"), PathBuf::from);
		let dist_dir = PathBuf::from(var("WEBPIFY_DIST_DIR").unwrap_or_else(|| "./dist".into()));
		let base_url = var("WEBPIFY_BASE_URL").unwrap_or_else(|| format!("http://{}", listen));

		let replace_policy = match var("WEBPIFY_REPLACE_POLICY") {
			Some(policy) => policy.parse()?,
			None => ReplacePolicy::default(),
		};
		let workers = match var("WEBPIFY_WORKERS") {
			Some(workers) => workers
				.trim()
				.parse::<usize>()
				.map_err(|_| Error::ConfigError(format!("WEBPIFY_WORKERS: not a number: {:?}", workers)))?,
			None => std::thread::available_parallelism().map_or(2, |n| n.get()),
		};

		Ok(Self {
			listen,
			data_dir,
			upload_dir,
			dist_dir,
			base_url,
			secret: var("WEBPIFY_SECRET"),
			admin_token: var("WEBPIFY_ADMIN_TOKEN"),
			replace_policy,
			workers: workers.max(1),
		})
	}
}

async fn run(mut builder: AppBuilder) -> ClResult<()> {
	let config = Config::from_env()?;
	info!("Data directory: {}", config.data_dir.display());
	info!("Upload directory: {}", config.upload_dir.display());

	let media_adapter = MetaAdapterSqlite::new(&config.data_dir).await?;
	let blob_adapter = BlobAdapterFs::new(config.upload_dir.clone().into()).await?;
	// One thread kept free for interactive conversions
	let worker = WorkerPool::new(1, config.workers.saturating_sub(1).max(1));

	builder
		.listen(config.listen)
		.base_url(config.base_url)
		.upload_dir(config.upload_dir)
		.dist_dir(config.dist_dir)
		.replace_policy(config.replace_policy)
		.worker(Arc::new(worker))
		.media_adapter(Arc::new(media_adapter))
		.blob_adapter(Arc::new(blob_adapter));
	if let Some(secret) = config.secret {
		builder.secret(secret);
	}
	match config.admin_token {
		Some(admin_token) => {
			builder.admin_token(admin_token);
		}
		None => warn!("WEBPIFY_ADMIN_TOKEN not set, admin page disabled"),
	}

	builder.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
	let builder = AppBuilder::new();
	match run(builder).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("FATAL: {}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
