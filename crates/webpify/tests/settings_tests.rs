//! Settings read and write through the AJAX actions

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use webpify::media_adapter::MediaAdapter as _;
use webpify::settings::SETTINGS_OPTION;

async fn read_settings(t: &TestApp) -> serde_json::Value {
	let (status, body) = t.post_form("/ajax/get_webp_settings", Some(&t.admin_nonce()), &[]).await;
	assert_eq!(status, StatusCode::OK, "{}", body);
	body["data"].clone()
}

#[tokio::test]
async fn test_defaults_when_nothing_saved() {
	let t = TestApp::new().await;

	assert_eq!(
		read_settings(&t).await,
		json!({
			"default_quality": 80,
			"auto_convert": false,
			"keep_original": true,
			"batch_size": 10,
			"cdn_enabled": false,
			"cdn_url": "",
			"supported_formats": { "jpeg": true, "png": true, "gif": true },
		})
	);
}

#[tokio::test]
async fn test_round_trip_with_coercion() {
	let t = TestApp::new().await;
	let payload = json!({
		"default_quality": "70",
		"auto_convert": "1",
		"keep_original": 0,
		"batch_size": "25",
		"cdn_enabled": true,
		"cdn_url": "https://cdn.x",
		"supported_formats": { "jpeg": "1", "png": false, "gif": "0" },
		"unknown_field": "dropped",
	});

	let (status, body) = t
		.post_form(
			"/ajax/save_webp_settings",
			Some(&t.admin_nonce()),
			&[("settings", payload.to_string())],
		)
		.await;
	assert_eq!(status, StatusCode::OK, "{}", body);
	assert_eq!(body["data"]["message"], "Settings saved successfully!");

	assert_eq!(
		read_settings(&t).await,
		json!({
			"default_quality": 70,
			"auto_convert": true,
			"keep_original": false,
			"batch_size": 25,
			"cdn_enabled": true,
			"cdn_url": "https://cdn.x",
			"supported_formats": { "jpeg": true, "png": false, "gif": false },
		})
	);

	let stored = t.app.media_adapter.read_option(SETTINGS_OPTION).await.expect("read");
	assert!(stored.is_some_and(|v| v.get("unknown_field").is_none()));
}

#[tokio::test]
async fn test_full_replace() {
	let t = TestApp::new().await;

	t.save_settings(json!({ "default_quality": 60, "auto_convert": true })).await;
	t.save_settings(json!({ "batch_size": 3 })).await;

	let settings = read_settings(&t).await;
	assert_eq!(settings["default_quality"], 80);
	assert_eq!(settings["auto_convert"], false);
	assert_eq!(settings["batch_size"], 3);
}

#[tokio::test]
async fn test_quality_is_clamped_and_bad_url_dropped() {
	let t = TestApp::new().await;

	t.save_settings(json!({ "default_quality": 250, "cdn_url": "javascript:alert(1)" })).await;
	let settings = read_settings(&t).await;
	assert_eq!(settings["default_quality"], 100);
	assert_eq!(settings["cdn_url"], "");

	t.save_settings(json!({ "default_quality": "-5" })).await;
	assert_eq!(read_settings(&t).await["default_quality"], 1);
}

#[tokio::test]
async fn test_rejected_payloads() {
	let t = TestApp::new().await;
	let nonce = t.admin_nonce();

	let (status, body) = t.post_form("/ajax/save_webp_settings", Some(&nonce), &[]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"]["message"], "No settings provided");

	for bad in ["{not json", "[1,2,3]", "\"text\""] {
		let (status, body) = t
			.post_form("/ajax/save_webp_settings", Some(&nonce), &[("settings", bad.to_string())])
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "{}", bad);
		assert_eq!(body["error"]["message"], "Invalid settings format", "{}", bad);
	}

	let (status, _) = t
		.post_form(
			"/ajax/save_webp_settings",
			Some(&nonce),
			&[("settings", json!({ "batch_size": 0 }).to_string())],
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	// Nothing was written
	assert_eq!(t.app.media_adapter.read_option(SETTINGS_OPTION).await.expect("read"), None);
}

// vim: ts=4
