//! App state type

use std::{path::Path, sync::Arc};

use crate::hooks::HookRegistry;
use crate::nonce::NonceService;
use crate::prelude::*;
use crate::settings::service::SettingsService;

use webpify_types::blob_adapter::BlobAdapter;
use webpify_types::media_adapter::MediaAdapter;
use webpify_types::worker;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path the upload directory is served under
pub const UPLOADS_PATH: &str = "/uploads";

/// What auto-convert does with the original when `keep_original` is off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplacePolicy {
	/// Swap the asset's file to the WebP in place, keeping its id
	#[default]
	InPlace,
	/// Register a sibling WebP asset, then delete the original asset
	Delete,
}

impl std::str::FromStr for ReplacePolicy {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"in_place" | "in-place" => Ok(Self::InPlace),
			"delete" => Ok(Self::Delete),
			other => Err(Error::ConfigError(format!("unknown replace policy {:?}", other))),
		}
	}
}

pub struct AppState {
	pub worker: Arc<worker::WorkerPool>,
	pub opts: AppBuilderOpts,

	pub media_adapter: Arc<dyn MediaAdapter>,
	pub blob_adapter: Arc<dyn BlobAdapter>,

	pub settings: Arc<SettingsService>,
	pub nonce: NonceService,
	pub hooks: HookRegistry,
}

impl AppState {
	/// Public URL of the upload directory, without trailing slash
	pub fn upload_base_url(&self) -> String {
		format!("{}{}", self.opts.base_url.trim_end_matches('/'), UPLOADS_PATH)
	}

	/// Unfiltered public URL of a file in the upload directory
	pub fn upload_url(&self, file_path: &str) -> String {
		format!("{}/{}", self.upload_base_url(), file_path.trim_start_matches('/'))
	}
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState").field("opts", &self.opts).finish_non_exhaustive()
	}
}

pub type App = Arc<AppState>;

pub struct Adapters {
	pub media_adapter: Option<Arc<dyn MediaAdapter>>,
	pub blob_adapter: Option<Arc<dyn BlobAdapter>>,
}

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Public origin of the service (e.g. `https://media.example.com`)
	pub base_url: Box<str>,
	/// Directory served under `/uploads`
	pub upload_dir: Box<Path>,
	/// Directory of the admin UI bundle
	pub dist_dir: Box<Path>,
	/// Bearer token for the admin page, `None` disables it
	pub admin_token: Option<Box<str>>,
	pub replace_policy: ReplacePolicy,
}


// vim: ts=4
