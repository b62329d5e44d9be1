//! Media library routes: auto-convert on upload, CDN rewriting, static files

mod common;

use axum::{
	body::{Body, to_bytes},
	http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{MultipartForm, TestApp, is_webp, jpeg, png};
use webpify::ReplacePolicy;
use webpify::error::Error;
use webpify::image::convert::{ConvertMode, convert_asset};
use webpify::media_adapter::{ListAssetOptions, MediaAdapter as _};
use webpify::types::AssetId;
use webpify::worker::Lane;

async fn upload(t: &TestApp, file_name: &str, content_type: &str, data: &[u8]) -> Value {
	let form = MultipartForm::new()
		.file("file", file_name, content_type, data)
		.text("title", "Holiday");
	let (status, body) = t.post_multipart("/api/media", Some(&t.admin_nonce()), form).await;
	assert_eq!(status, StatusCode::CREATED, "{}", body);
	body["data"].clone()
}

async fn count(t: &TestApp, mime_type: &str) -> u64 {
	let opts = ListAssetOptions::with_mime_types(&[mime_type]);
	t.app.media_adapter.count_assets(&opts).await.expect("count")
}

fn path_of(url: &Value) -> String {
	let url = url.as_str().expect("url");
	url.strip_prefix(&format!("{}/", common::UPLOAD_BASE)).expect("upload url").to_string()
}

#[tokio::test]
async fn test_upload_without_auto_convert() {
	let t = TestApp::new().await;

	let data = upload(&t, "beach.jpg", "image/jpeg", &jpeg(120, 80)).await;
	let asset = &data["asset"];
	assert_eq!(asset["id"], data["id"]);
	assert_eq!(asset["mimeType"], "image/jpeg");
	assert_eq!(asset["title"], "Holiday");
	assert_eq!((asset["width"].as_u64(), asset["height"].as_u64()), (Some(120), Some(80)));
	assert!(t.upload_file_exists(&path_of(&asset["url"])));
	assert_eq!(count(&t, "image/webp").await, 0);
}

#[tokio::test]
async fn test_mime_type_is_sniffed() {
	let t = TestApp::new().await;

	// Declared as octet-stream, content is PNG
	let data = upload(&t, "scan.bin", "application/octet-stream", &png(20, 20)).await;
	assert_eq!(data["asset"]["mimeType"], "image/png");
}

#[tokio::test]
async fn test_auto_convert_keeps_original() {
	let t = TestApp::new().await;
	t.save_settings(json!({ "auto_convert": true, "keep_original": true })).await;

	let data = upload(&t, "beach.jpg", "image/jpeg", &jpeg(120, 80)).await;
	assert_eq!(data["asset"]["mimeType"], "image/jpeg");
	assert!(t.upload_file_exists(&path_of(&data["asset"]["url"])));

	// A sibling WebP asset was registered, and not converted again
	assert_eq!(count(&t, "image/webp").await, 1);
	let webp = t
		.app
		.media_adapter
		.list_assets(&ListAssetOptions::with_mime_types(&["image/webp"]))
		.await
		.expect("list");
	assert!(webp[0].file_path.ends_with("/beach.webp"));
	assert_eq!(&*webp[0].title, "beach");
}

#[tokio::test]
async fn test_auto_convert_replaces_in_place() {
	let t = TestApp::new().await;
	t.save_settings(json!({ "auto_convert": true, "keep_original": false })).await;

	let data = upload(&t, "beach.jpg", "image/jpeg", &jpeg(400, 300)).await;
	let asset = &data["asset"];
	assert_eq!(asset["id"], data["id"]);
	assert_eq!(asset["mimeType"], "image/webp");
	assert_eq!(asset["title"], "Holiday");

	let path = path_of(&asset["url"]);
	assert!(path.ends_with("/beach.webp"), "{}", path);
	assert!(t.upload_file_exists(&path));
	assert!(!t.upload_file_exists(&path.replace(".webp", ".jpg")));
	assert_eq!(asset["sizes"]["thumbnail"].as_str().map(|u| u.ends_with("/beach-150x150.webp")), Some(true));
	assert_eq!(count(&t, "image/jpeg").await, 0);
	assert_eq!(count(&t, "image/webp").await, 1);
}

#[tokio::test]
async fn test_auto_convert_delete_policy() {
	let t = TestApp::with_builder(|b| {
		b.replace_policy(ReplacePolicy::Delete);
	})
	.await;
	t.save_settings(json!({ "auto_convert": true, "keep_original": false })).await;

	let data = upload(&t, "beach.jpg", "image/jpeg", &jpeg(64, 64)).await;
	// The uploaded asset is gone, replaced by a new WebP asset
	assert_eq!(data["asset"], Value::Null);
	assert_eq!(count(&t, "image/jpeg").await, 0);
	assert_eq!(count(&t, "image/webp").await, 1);
}

#[tokio::test]
async fn test_auto_convert_skips_disabled_formats() {
	let t = TestApp::new().await;
	t.save_settings(json!({
		"auto_convert": true,
		"keep_original": false,
		"supported_formats": { "jpeg": true, "png": false, "gif": true },
	}))
	.await;

	let data = upload(&t, "logo.png", "image/png", &png(40, 40)).await;
	assert_eq!(data["asset"]["mimeType"], "image/png");
	assert_eq!(count(&t, "image/webp").await, 0);
}

#[tokio::test]
async fn test_failed_auto_convert_keeps_upload() {
	let t = TestApp::new().await;
	t.save_settings(json!({ "auto_convert": true, "keep_original": false })).await;

	let data = upload(&t, "bad.jpg", "image/jpeg", b"\xff\xd8\xff\xe0 not really a jpeg").await;
	assert_eq!(data["asset"]["mimeType"], "image/jpeg");
	assert_eq!(count(&t, "image/webp").await, 0);
}

#[tokio::test]
async fn test_get_media_with_cdn() {
	let t = TestApp::new().await;
	let form = MultipartForm::new().file("images[]", "wide.jpg", "image/jpeg", &jpeg(1200, 600));
	let (_, body) = t.post_multipart("/ajax/convert_images", Some(&t.admin_nonce()), form).await;
	let id = body["data"]["converted"][0]["id"].as_u64().expect("id");

	let (status, body) = t.get(&format!("/api/media/{}", id)).await;
	assert_eq!(status, StatusCode::OK);
	let view = &body["data"];
	assert!(view["url"].as_str().is_some_and(|u| u.starts_with(common::UPLOAD_BASE)));
	let srcset = view["srcset"].as_array().expect("srcset");
	let widths: Vec<u64> = srcset.iter().filter_map(|c| c["width"].as_u64()).collect();
	assert_eq!(widths, vec![300, 768, 1024, 1200]);

	t.save_settings(json!({ "cdn_enabled": true, "cdn_url": "https://cdn.x" })).await;
	let (_, body) = t.get(&format!("/api/media/{}", id)).await;
	let view = &body["data"];
	let url = view["url"].as_str().expect("url");
	assert!(url.starts_with("https://cdn.x/"), "{}", url);
	assert!(url.ends_with("/wide.webp"));
	let srcset = view["srcset"].as_array().expect("srcset");
	assert_eq!(srcset.len(), 4);
	assert!(srcset.iter().all(|c| c["url"].as_str().is_some_and(|u| u.starts_with("https://cdn.x/"))));
	assert!(
		view["sizes"]
			.as_object()
			.expect("sizes")
			.values()
			.all(|u| u.as_str().is_some_and(|u| u.starts_with("https://cdn.x/")))
	);

	// The conversion response is filtered too
	let form = MultipartForm::new().file("images[]", "next.jpg", "image/jpeg", &jpeg(10, 10));
	let (_, body) = t.post_multipart("/ajax/convert_images", Some(&t.admin_nonce()), form).await;
	assert!(body["data"]["converted"][0]["url"].as_str().is_some_and(|u| u.starts_with("https://cdn.x/")));
}

#[tokio::test]
async fn test_failed_replace_removes_written_files() {
	let t = TestApp::new().await;

	let data = upload(&t, "beach.jpg", "image/jpeg", &jpeg(400, 300)).await;
	let asset_id = AssetId(data["id"].as_u64().expect("id"));
	let asset = t.app.media_adapter.read_asset(asset_id).await.expect("read asset");
	// Record removed behind the converter's back, the file stays
	t.app.media_adapter.delete_asset(asset_id).await.expect("delete asset");

	let res = convert_asset(&t.app, &asset, 80, ConvertMode::ReplaceInPlace, Lane::Batch).await;
	assert!(matches!(res, Err(Error::NotFound)), "{:?}", res);

	let jpg_path = asset.file_path.to_string();
	let dir = t.temp.path().join("uploads").join(jpg_path.rsplit_once('/').expect("dir").0);
	let mut files: Vec<String> = std::fs::read_dir(dir)
		.expect("read dir")
		.map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
		.collect();
	files.sort();
	assert_eq!(files, vec!["beach.jpg".to_string()]);
}

#[tokio::test]
async fn test_get_missing_media() {
	let t = TestApp::new().await;

	let (status, body) = t.get("/api/media/999").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"]["code"], "E-CORE-NOTFOUND");
}

#[tokio::test]
async fn test_uploads_are_served() {
	let t = TestApp::new().await;
	let form = MultipartForm::new().file("images[]", "served.jpg", "image/jpeg", &jpeg(32, 32));
	let (_, body) = t.post_multipart("/ajax/convert_images", Some(&t.admin_nonce()), form).await;
	let path = path_of(&body["data"]["converted"][0]["url"]);

	let req = Request::get(format!("/uploads/{}", path)).body(Body::empty()).expect("request");
	let res = t.router.clone().oneshot(req).await.expect("response");
	assert_eq!(res.status(), StatusCode::OK);
	let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
	assert!(is_webp(&bytes));

	let req = Request::get("/uploads/2026/01/missing.webp").body(Body::empty()).expect("request");
	let res = t.router.clone().oneshot(req).await.expect("response");
	assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// vim: ts=4
