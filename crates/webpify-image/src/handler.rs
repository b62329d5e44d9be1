//! HTTP handlers of the conversion features and the media library

use axum::{
	Json,
	extract::{Multipart, Path, State},
	http::StatusCode,
};
use serde::Serialize;

use crate::bulk::{self, BulkRequest, BulkResponse};
use crate::codec;
use crate::convert::{self, ConversionResult};
use crate::library::{self, MediaView};
use crate::prelude::*;
use webpify_core::extract::{Auth, FormFields, OptionalRequestId};
use webpify_types::media_adapter::AssetMetadata;
use webpify_types::types::ApiResponse;
use webpify_types::utils;

/// Multipart field names accepted for uploaded images
const IMAGE_FIELDS: [&str; 2] = ["images[]", "images"];

#[derive(Debug, Serialize)]
pub struct ConvertImagesResponse {
	pub converted: Vec<ConversionResult>,
	pub errors: Vec<String>,
	pub message: String,
}

/// POST /ajax/convert_images - Convert uploaded images to new WebP assets
///
/// Every file is handled on its own: a failing file adds an entry to
/// `errors` and the others are still converted.
pub async fn post_convert_images(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	mut multipart: Multipart,
) -> ClResult<(StatusCode, Json<ApiResponse<ConvertImagesResponse>>)> {
	let settings = app.settings.load().await?;
	let mut converted = Vec::new();
	let mut errors = Vec::new();
	let mut received = 0usize;

	loop {
		let field = match multipart.next_field().await {
			Ok(Some(field)) => field,
			Ok(None) => break,
			Err(err) => {
				warn!("multipart stream failed: {}", err);
				errors.push(format!("Upload error: {}", err.body_text()));
				break;
			}
		};
		if !field.name().is_some_and(|name| IMAGE_FIELDS.contains(&name)) {
			continue;
		}
		received += 1;
		let file_name = field.file_name().unwrap_or("image").to_string();

		let data = match field.bytes().await {
			Ok(data) if !data.is_empty() => data,
			Ok(_) | Err(_) => {
				errors.push(format!("{}: Upload error", file_name));
				continue;
			}
		};

		match convert::convert_upload(&app, &settings, &file_name, data).await {
			Ok(result) => converted.push(result),
			Err(err) => {
				warn!("{}: conversion failed: {}", file_name, err);
				errors.push(format!("{}: {}", file_name, err));
			}
		}
	}

	if received == 0 && errors.is_empty() {
		return Err(Error::ValidationError("No images uploaded".into()));
	}
	info!("user {} converted {} of {} image(s)", auth.user_id, converted.len(), received);

	let message = format!("{} image(s) converted successfully", converted.len());
	let response = ApiResponse::new(ConvertImagesResponse { converted, errors, message })
		.with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

/// POST /ajax/bulk_convert_images - Run one round of a bulk conversion
pub async fn post_bulk_convert_images(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	form: FormFields,
) -> ClResult<(StatusCode, Json<ApiResponse<BulkResponse>>)> {
	let settings = app.settings.load().await?;
	let req = BulkRequest::from_form(&form);
	let res = bulk::run_round(&app, &auth, &settings, &req).await?;

	let response = ApiResponse::new(res).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// Media library //
//***************//
#[derive(Debug, Serialize)]
pub struct PostMediaResponse {
	pub id: AssetId,
	/// The asset after the asset-added hooks ran, `None` if one of them removed it
	pub asset: Option<MediaView>,
}

/// POST /api/media - Add a file to the media library
pub async fn post_media(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	mut multipart: Multipart,
) -> ClResult<(StatusCode, Json<ApiResponse<PostMediaResponse>>)> {
	let mut upload = None;
	let mut title = None;
	while let Some(field) = multipart.next_field().await? {
		match field.name() {
			Some("file") if upload.is_none() => {
				let file_name = utils::sanitize_file_name(field.file_name().unwrap_or("file"));
				let content_type = field.content_type().map(str::to_string);
				upload = Some((file_name, content_type, field.bytes().await?));
			}
			Some("title") => title = Some(field.text().await?),
			_ => {}
		}
	}
	let Some((file_name, content_type, data)) = upload else {
		return Err(Error::ValidationError("No file uploaded".into()));
	};
	if data.is_empty() {
		return Err(Error::ValidationError("Empty file".into()));
	}

	let mime_type = codec::sniff_mime_type(&data)
		.map(str::to_string)
		.or(content_type)
		.unwrap_or_else(|| "application/octet-stream".into());
	let dimensions = codec::dimensions(&data);

	let (stem, ext) = match file_name.rsplit_once('.') {
		Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_ascii_lowercase()),
		_ => (file_name.clone(), "bin".to_string()),
	};
	let dir = utils::upload_subdir(Timestamp::now());
	let file_path = library::unique_path(&app, &dir, &stem, &ext).await?;
	app.blob_adapter.write_file(&file_path, &data).await?;

	let metadata = dimensions.map(|(width, height)| AssetMetadata {
		width,
		height,
		file: file_path.as_str().into(),
		..Default::default()
	});
	let title = title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| stem.clone());
	let id = library::register_asset(&app, &file_path, &mime_type, title.trim(), metadata).await?;
	info!("user {} added asset {} ({})", auth.user_id, id, mime_type);

	let settings = app.settings.load().await?;
	let asset = match app.media_adapter.read_asset(id).await {
		Ok(asset) => Some(library::media_view(&app, &settings, &asset)),
		Err(Error::NotFound) => None,
		Err(err) => return Err(err),
	};

	let response =
		ApiResponse::new(PostMediaResponse { id, asset }).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/media/{id} - Public view of an asset, URLs filtered
pub async fn get_media(
	State(app): State<App>,
	Path(asset_id): Path<u64>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<MediaView>>)> {
	let settings = app.settings.load().await?;
	let asset = app.media_adapter.read_asset(AssetId(asset_id)).await?;
	let view = library::media_view(&app, &settings, &asset);

	Ok((StatusCode::OK, Json(ApiResponse::new(view).with_req_id(req_id.unwrap_or_default()))))
}

// vim: ts=4
