//! Shared test setup: an app on temporary storage, request builders and
//! sample images.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::{
	Router,
	body::{Body, to_bytes},
	http::{Request, StatusCode, header},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use webpify::App;
use webpify::AppBuilder;
use webpify::core::middleware::NONCE_HEADER;
use webpify::types::{AuthCtx, Role, Timestamp};
use webpify::worker::WorkerPool;
use webpify_blob_adapter_fs::BlobAdapterFs;
use webpify_meta_adapter_sqlite::MetaAdapterSqlite;

pub const BASE_URL: &str = "http://media.test";
pub const UPLOAD_BASE: &str = "http://media.test/uploads";
pub const ADMIN_TOKEN: &str = "operator-token";
const SECRET: &str = "test-secret-0123456789abcdef";

pub struct TestApp {
	pub app: App,
	pub router: Router,
	pub temp: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::with_builder(|_| {}).await
	}

	/// Builds an app, `configure` may adjust the builder before the build
	pub async fn with_builder(configure: impl FnOnce(&mut AppBuilder)) -> Self {
		let temp = TempDir::new().expect("Failed to create temp directory");
		let upload_dir = temp.path().join("uploads");

		let media_adapter =
			MetaAdapterSqlite::new(temp.path().join("data")).await.expect("Failed to open database");
		let blob_adapter =
			BlobAdapterFs::new(upload_dir.clone().into()).await.expect("Failed to create blob adapter");

		let mut builder = AppBuilder::new();
		builder
			.base_url(BASE_URL)
			.upload_dir(upload_dir)
			.dist_dir(temp.path().join("dist"))
			.admin_token(ADMIN_TOKEN)
			.secret(SECRET)
			.worker(Arc::new(WorkerPool::new(1, 1)))
			.media_adapter(Arc::new(media_adapter))
			.blob_adapter(Arc::new(blob_adapter));
		configure(&mut builder);

		let (app, router) = builder.build().await.expect("Failed to build app");
		Self { app, router, temp }
	}

	pub fn nonce(&self, user_id: u32, role: Role) -> String {
		self.app
			.nonce
			.create_nonce(&AuthCtx { user_id, role }, Timestamp::now())
			.expect("Failed to create nonce")
	}

	pub fn admin_nonce(&self) -> String {
		self.nonce(1, Role::Administrator)
	}

	pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
		let res = self.router.clone().oneshot(req).await.expect("Request failed");
		let status = res.status();
		let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("Failed to read body");
		let json = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap_or_else(|_| {
				Value::String(String::from_utf8_lossy(&bytes).into_owned())
			})
		};
		(status, json)
	}

	/// POST an urlencoded form, with the nonce in the header when given
	pub async fn post_form(
		&self,
		path: &str,
		nonce: Option<&str>,
		fields: &[(&str, String)],
	) -> (StatusCode, Value) {
		let body = serde_urlencoded::to_string(fields).expect("Failed to encode form");
		let mut req = Request::post(path)
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
		if let Some(nonce) = nonce {
			req = req.header(NONCE_HEADER, nonce);
		}
		self.send(req.body(Body::from(body)).expect("Failed to build request")).await
	}

	pub async fn post_multipart(
		&self,
		path: &str,
		nonce: Option<&str>,
		form: MultipartForm,
	) -> (StatusCode, Value) {
		let (content_type, body) = form.finish();
		let mut req = Request::post(path).header(header::CONTENT_TYPE, content_type);
		if let Some(nonce) = nonce {
			req = req.header(NONCE_HEADER, nonce);
		}
		self.send(req.body(Body::from(body)).expect("Failed to build request")).await
	}

	pub async fn get(&self, path: &str) -> (StatusCode, Value) {
		self.send(Request::get(path).body(Body::empty()).expect("Failed to build request")).await
	}

	pub async fn save_settings(&self, settings: Value) {
		let (status, body) = self
			.post_form(
				"/ajax/save_webp_settings",
				Some(&self.admin_nonce()),
				&[("settings", settings.to_string())],
			)
			.await;
		assert_eq!(status, StatusCode::OK, "save settings failed: {}", body);
	}

	pub fn upload_file_exists(&self, path: &str) -> bool {
		self.temp.path().join("uploads").join(path).is_file()
	}
}

// Multipart //
//***********//
const BOUNDARY: &str = "----webpify-test-boundary";

#[derive(Default)]
pub struct MultipartForm {
	body: Vec<u8>,
}

impl MultipartForm {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
		self.body.extend_from_slice(
			format!(
				"--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
				BOUNDARY, name, file_name, content_type
			)
			.as_bytes(),
		);
		self.body.extend_from_slice(data);
		self.body.extend_from_slice(b"\r\n");
		self
	}

	pub fn text(mut self, name: &str, value: &str) -> Self {
		self.body.extend_from_slice(
			format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", BOUNDARY, name, value)
				.as_bytes(),
		);
		self
	}

	pub fn finish(mut self) -> (String, Vec<u8>) {
		self.body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
		(format!("multipart/form-data; boundary={}", BOUNDARY), self.body)
	}
}

// Sample images //
//***************//
fn encode(img: &image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
	let mut buf = Cursor::new(Vec::new());
	img.write_to(&mut buf, format).expect("Failed to encode sample image");
	buf.into_inner()
}

fn gradient(width: u32, height: u32) -> image::RgbImage {
	image::RgbImage::from_fn(width, height, |x, y| {
		image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
	})
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
	encode(&image::DynamicImage::ImageRgb8(gradient(width, height)), image::ImageFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
	encode(&image::DynamicImage::ImageRgb8(gradient(width, height)), image::ImageFormat::Png)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
	let rgba = image::DynamicImage::ImageRgb8(gradient(width, height)).to_rgba8();
	encode(&image::DynamicImage::ImageRgba8(rgba), image::ImageFormat::Gif)
}

/// Checks the RIFF/WEBP signature
pub fn is_webp(data: &[u8]) -> bool {
	data.len() > 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

// vim: ts=4
