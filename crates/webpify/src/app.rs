//! App builder - constructs and runs the webpify application

use std::{path::PathBuf, sync::Arc};

use axum::Router;

use crate::blob_adapter::BlobAdapter;
use crate::media_adapter::MediaAdapter;
use crate::prelude::*;
use crate::{routes, utils, webserver, worker};
pub use webpify_core::app::{Adapters, App, AppBuilderOpts, AppState, ReplacePolicy, VERSION};
use webpify_core::hooks::{HookRegistry, LifecycleEvent};
use webpify_core::nonce::NonceService;
use webpify_core::settings::SettingsService;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	worker: Option<Arc<worker::WorkerPool>>,
	adapters: Adapters,
	secret: Option<Box<[u8]>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A subscriber may already be installed (tests build several apps)
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts {
				listen: "127.0.0.1:8080".into(),
				base_url: "http://127.0.0.1:8080".into(),
				upload_dir: PathBuf::from("./data/uploads").into(),
				dist_dir: PathBuf::from("./dist").into(),
				admin_token: None,
				replace_policy: ReplacePolicy::default(),
			},
			worker: None,
			adapters: Adapters { media_adapter: None, blob_adapter: None },
			secret: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn base_url(&mut self, base_url: impl Into<Box<str>>) -> &mut Self {
		self.opts.base_url = base_url.into();
		self
	}
	pub fn upload_dir(&mut self, upload_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.upload_dir = upload_dir.into();
		self
	}
	pub fn dist_dir(&mut self, dist_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.dist_dir = dist_dir.into();
		self
	}
	pub fn admin_token(&mut self, admin_token: impl Into<Box<str>>) -> &mut Self {
		self.opts.admin_token = Some(admin_token.into());
		self
	}
	pub fn replace_policy(&mut self, replace_policy: ReplacePolicy) -> &mut Self {
		self.opts.replace_policy = replace_policy;
		self
	}
	/// Key of the nonce and bulk cursor signatures (at least 16 bytes)
	pub fn secret(&mut self, secret: impl AsRef<[u8]>) -> &mut Self {
		self.secret = Some(secret.as_ref().into());
		self
	}
	pub fn worker(&mut self, worker: Arc<worker::WorkerPool>) -> &mut Self {
		self.worker = Some(worker);
		self
	}

	// Adapters
	pub fn media_adapter(&mut self, media_adapter: Arc<dyn MediaAdapter>) -> &mut Self {
		self.adapters.media_adapter = Some(media_adapter);
		self
	}
	pub fn blob_adapter(&mut self, blob_adapter: Arc<dyn BlobAdapter>) -> &mut Self {
		self.adapters.blob_adapter = Some(blob_adapter);
		self
	}

	/// Creates the app state and the router without serving it.
	///
	/// Fires the `Activated` lifecycle hooks.
	pub async fn build(self) -> ClResult<(App, Router)> {
		let Some(media_adapter) = self.adapters.media_adapter else {
			error!("FATAL: No media adapter configured");
			return Err(Error::Internal("No media adapter configured".to_string()));
		};
		let Some(blob_adapter) = self.adapters.blob_adapter else {
			error!("FATAL: No blob adapter configured");
			return Err(Error::Internal("No blob adapter configured".to_string()));
		};
		let Some(worker) = self.worker else {
			error!("FATAL: No worker pool defined");
			return Err(Error::Internal("No worker pool defined".to_string()));
		};

		let nonce = match self.secret {
			Some(secret) => NonceService::new(secret).inspect_err(|e| {
				error!("FATAL: Invalid secret: {}", e);
			})?,
			None => {
				warn!("No secret configured, nonces will not survive a restart");
				NonceService::new(format!("{}{}", utils::random_id()?, utils::random_id()?))?
			}
		};

		let mut hooks = HookRegistry::new();
		webpify_image::register_hooks(&mut hooks);
		info!("Registered {} hooks", hooks.len());

		let app: App = Arc::new(AppState {
			worker,
			opts: self.opts,
			settings: Arc::new(SettingsService::new(media_adapter.clone())),
			media_adapter,
			blob_adapter,
			nonce,
			hooks,
		});
		tokio::fs::create_dir_all(&app.opts.upload_dir).await.map_err(|e| {
			error!("FATAL: Cannot create upload dir: {}", e);
			Error::Internal(format!("Cannot create upload dir: {}", e))
		})?;

		let router = routes::init(app.clone());
		app.hooks.fire_lifecycle(&app, LifecycleEvent::Activated).await;

		Ok((app, router))
	}

	/// Builds the app and serves it until a shutdown signal arrives
	pub async fn run(self) -> ClResult<()> {
		info!("              _           _  __");
		info!("__      _____| |__  _ __ (_)/ _|_   _");
		info!("\\ \\ /\\ / / _ \\ '_ \\| '_ \\| | |_| | | |");
		info!(" \\ V  V /  __/ |_) | |_) | |  _| |_| |");
		info!("  \\_/\\_/ \\___|_.__/| .__/|_|_|  \\__, |");
		info!("                   |_|          |___/");
		info!("V{}", VERSION);
		info!("");

		let (app, router) = self.build().await?;
		let res = webserver::serve(app.clone(), router).await;
		app.hooks.fire_lifecycle(&app, LifecycleEvent::Deactivated).await;

		res
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
