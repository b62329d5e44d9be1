//! Admin page shell.
//!
//! The settings and bulk conversion UI is an external bundle. This page only
//! provides its mount point and the `webpOptData` config object the bundle
//! reads on startup.

use axum::{extract::State, response::Html};
use serde::Serialize;

use crate::prelude::*;
use webpify_types::types::{AuthCtx, Role};

/// Path the UI bundle directory (`dist_dir`) is served under
pub const ASSETS_PATH: &str = "/admin/assets";

/// The operator behind the admin token acts as this user
const ADMIN_USER_ID: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
	pub ajax_url: String,
	pub nonce: String,
}

fn render(config: &AdminConfig) -> ClResult<String> {
	// `</` cannot end the inline script
	let config = serde_json::to_string(config)?.replace("</", "<\\/");

	Ok(format!(
		r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>WebP Optimizer Settings</title>
<link rel="stylesheet" href="{assets}/admin.css">
</head>
<body>
<div class="wrap">
<div id="webp-optimizer-admin-root"></div>
</div>
<script>window.webpOptData = {config};</script>
<script src="{assets}/bundle.js"></script>
</body>
</html>
"#,
		assets = ASSETS_PATH,
		config = config,
	))
}

/// GET /admin - Admin page with a fresh nonce
pub async fn get_admin(State(app): State<App>) -> ClResult<Html<String>> {
	let auth = AuthCtx { user_id: ADMIN_USER_ID, role: Role::Administrator };
	let config = AdminConfig {
		ajax_url: format!("{}/ajax", app.opts.base_url.trim_end_matches('/')),
		nonce: app.nonce.create_nonce(&auth, Timestamp::now())?,
	};

	Ok(Html(render(&config)?))
}


// vim: ts=4
