//! Settings AJAX handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{
	extract::{Auth, FormFields, OptionalRequestId},
	prelude::*,
};
use webpify_types::settings::ConverterSettings;
use webpify_types::types::ApiResponse;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
	pub message: String,
}

/// POST /ajax/get_webp_settings - Current settings, defaults if never saved
pub async fn get_settings(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<ConverterSettings>>)> {
	let settings = app.settings.load().await?;
	let response = ApiResponse::new(settings).with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

/// POST /ajax/save_webp_settings - Replace the settings record
///
/// The `settings` form field carries the whole record as a JSON string.
pub async fn save_settings(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	form: FormFields,
) -> ClResult<(StatusCode, Json<ApiResponse<MessageResponse>>)> {
	let raw = form
		.get("settings")
		.filter(|s| !s.trim().is_empty())
		.ok_or_else(|| Error::ValidationError("No settings provided".into()))?;
	let payload: serde_json::Value = serde_json::from_str(raw)
		.map_err(|_| Error::ValidationError("Invalid settings format".into()))?;

	let settings = ConverterSettings::from_payload(&payload)?;
	app.settings.save(&settings).await?;
	info!("settings updated by user {}", auth.user_id);

	let response = ApiResponse::new(MessageResponse { message: "Settings saved successfully!".into() })
		.with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
