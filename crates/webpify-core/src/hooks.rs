//! Hook registry
//!
//! Feature modules register observers here at startup. Events are dispatched
//! in the request (or startup step) that raised them, in registration order.
//!
//! * lifecycle hooks run when the app starts and stops
//! * asset-added hooks run after a new asset record has been created
//! * asset URL and srcset filters rewrite public URLs before they are returned

use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::app::AppState;
use crate::prelude::*;
use webpify_types::settings::ConverterSettings;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
	Activated,
	Deactivated,
}

impl LifecycleEvent {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Activated => "activated",
			Self::Deactivated => "deactivated",
		}
	}
}

/// One entry of a responsive image candidate list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrcsetCandidate {
	pub url: String,
	/// Width descriptor (`{width}w`)
	pub width: u32,
}

pub type LifecycleHook = Arc<dyn Fn(App, LifecycleEvent) -> BoxFuture<'static, ClResult<()>> + Send + Sync>;

pub type AssetAddedHook = Arc<dyn Fn(App, AssetId) -> BoxFuture<'static, ClResult<()>> + Send + Sync>;

/// Filters get the settings loaded for the current request
pub type AssetUrlFilter = Arc<dyn Fn(&AppState, &ConverterSettings, AssetId, String) -> String + Send + Sync>;

pub type SrcsetFilter = Arc<
	dyn Fn(&AppState, &ConverterSettings, AssetId, Vec<SrcsetCandidate>) -> Vec<SrcsetCandidate>
		+ Send
		+ Sync,
>;

#[derive(Default)]
pub struct HookRegistry {
	lifecycle: Vec<LifecycleHook>,
	asset_added: Vec<AssetAddedHook>,
	asset_url: Vec<AssetUrlFilter>,
	srcset: Vec<SrcsetFilter>,
}

impl HookRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	// Registration
	pub fn on_lifecycle<F, Fut>(&mut self, f: F) -> &mut Self
	where
		F: Fn(App, LifecycleEvent) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ClResult<()>> + Send + 'static,
	{
		self.lifecycle.push(Arc::new(move |app, ev| Box::pin(f(app, ev))));
		self
	}

	pub fn on_asset_added<F, Fut>(&mut self, f: F) -> &mut Self
	where
		F: Fn(App, AssetId) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ClResult<()>> + Send + 'static,
	{
		self.asset_added.push(Arc::new(move |app, id| Box::pin(f(app, id))));
		self
	}

	pub fn add_asset_url_filter<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(&AppState, &ConverterSettings, AssetId, String) -> String + Send + Sync + 'static,
	{
		self.asset_url.push(Arc::new(f));
		self
	}

	pub fn add_srcset_filter<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(&AppState, &ConverterSettings, AssetId, Vec<SrcsetCandidate>) -> Vec<SrcsetCandidate>
			+ Send
			+ Sync
			+ 'static,
	{
		self.srcset.push(Arc::new(f));
		self
	}

	// Dispatch
	/// Runs lifecycle hooks. Failures are logged, they never stop startup or shutdown.
	pub async fn fire_lifecycle(&self, app: &App, event: LifecycleEvent) {
		for hook in &self.lifecycle {
			if let Err(err) = hook(app.clone(), event).await {
				warn!("lifecycle hook ({}) failed: {}", event.as_str(), err);
			}
		}
	}

	/// Runs asset-added hooks in order.
	///
	/// A failing hook is logged and does not affect the others or the
	/// operation that created the asset.
	pub async fn fire_asset_added(&self, app: &App, asset_id: AssetId) {
		for hook in &self.asset_added {
			if let Err(err) = hook(app.clone(), asset_id).await {
				warn!("asset-added hook failed for asset {}: {}", asset_id, err);
			}
		}
	}

	pub fn filter_asset_url(
		&self,
		app: &AppState,
		settings: &ConverterSettings,
		asset_id: AssetId,
		url: String,
	) -> String {
		self.asset_url.iter().fold(url, |url, filter| filter(app, settings, asset_id, url))
	}

	pub fn filter_srcset(
		&self,
		app: &AppState,
		settings: &ConverterSettings,
		asset_id: AssetId,
		candidates: Vec<SrcsetCandidate>,
	) -> Vec<SrcsetCandidate> {
		self.srcset.iter().fold(candidates, |list, filter| filter(app, settings, asset_id, list))
	}

	pub fn len(&self) -> usize {
		self.lifecycle.len() + self.asset_added.len() + self.asset_url.len() + self.srcset.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for HookRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HookRegistry")
			.field("lifecycle", &self.lifecycle.len())
			.field("asset_added", &self.asset_added.len())
			.field("asset_url", &self.asset_url.len())
			.field("srcset", &self.srcset.len())
			.finish()
	}
}

// vim: ts=4
