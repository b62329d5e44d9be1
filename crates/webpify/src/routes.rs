use axum::{
	Router,
	extract::DefaultBodyLimit,
	middleware,
	routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::admin;
use crate::prelude::*;
use webpify_core::app::UPLOADS_PATH;
use webpify_core::middleware::{request_id, require_admin_token, require_capability, require_nonce};
use webpify_core::settings;
use webpify_image::handler;
use webpify_types::types::Capability;

/// Request body limit of the upload routes
pub const MAX_UPLOAD_SIZE: usize = 64 * 1024 * 1024;

fn init_ajax(app: &App) -> Router<App> {
	let upload_router = Router::new()
		.route("/ajax/convert_images", post(handler::post_convert_images))
		.route_layer(middleware::from_fn(require_capability(Capability::UploadFiles)));

	let manage_router = Router::new()
		.route("/ajax/bulk_convert_images", post(handler::post_bulk_convert_images))
		.route("/ajax/get_webp_settings", post(settings::handler::get_settings))
		.route("/ajax/save_webp_settings", post(settings::handler::save_settings))
		.route_layer(middleware::from_fn(require_capability(Capability::ManageOptions)));

	// require_nonce is added last so it runs before the capability checks
	Router::new()
		.merge(upload_router)
		.merge(manage_router)
		.route_layer(middleware::from_fn_with_state(app.clone(), require_nonce))
}

fn init_api(app: &App) -> Router<App> {
	let protected_router = Router::new()
		.route("/api/media", post(handler::post_media))
		.route_layer(middleware::from_fn(require_capability(Capability::UploadFiles)))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_nonce));

	let public_router = Router::new().route("/api/media/{id}", get(handler::get_media));

	Router::new().merge(protected_router).merge(public_router)
}

fn init_admin(app: &App) -> Router<App> {
	Router::new()
		.route("/admin", get(admin::get_admin))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_admin_token))
		.nest_service(admin::ASSETS_PATH, ServeDir::new(&app.opts.dist_dir))
}

pub fn init(app: App) -> Router {
	Router::new()
		.merge(init_ajax(&app))
		.merge(init_api(&app))
		.merge(init_admin(&app))
		.nest_service(UPLOADS_PATH, ServeDir::new(&app.opts.upload_dir))
		.layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
		.layer(middleware::from_fn(request_id))
		.with_state(app)
}

// vim: ts=4
