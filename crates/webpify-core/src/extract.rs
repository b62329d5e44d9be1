//! Custom extractors for webpify-specific data

use axum::extract::{Form, FromRequest, FromRequestParts, Multipart, Request};
use axum::http::{header, request::Parts};
use std::collections::HashMap;

use crate::prelude::*;
use webpify_types::types::AuthCtx;

// Auth //
//******//
/// Identity of a request that passed the nonce middleware
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::InvalidNonce)
		}
	}
}

// RequestId //
//***********//
/// Request ID for tracing and debugging
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Optional Request ID extractor - always succeeds, returns None if not available
#[derive(Clone, Debug)]
pub struct OptionalRequestId(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalRequestId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let req_id = parts.extensions.get::<RequestId>().map(|r| r.0.clone());
		Ok(OptionalRequestId(req_id))
	}
}

// FormFields //
//************//
/// Text fields of a form post, either urlencoded or multipart.
///
/// File parts of a multipart body are ignored. A body without content type
/// yields no fields.
#[derive(Debug, Clone, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}
}

impl<S> FromRequest<S> for FormFields
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let content_type = req
			.headers()
			.get(header::CONTENT_TYPE)
			.and_then(|h| h.to_str().ok())
			.unwrap_or_default()
			.to_ascii_lowercase();

		if content_type.starts_with("multipart/form-data") {
			let mut multipart = Multipart::from_request(req, state)
				.await
				.map_err(|err| Error::ValidationError(err.body_text()))?;
			let mut fields = HashMap::new();
			while let Some(field) = multipart.next_field().await? {
				if field.file_name().is_some() {
					continue;
				}
				let Some(name) = field.name().map(str::to_string) else { continue };
				fields.insert(name, field.text().await?);
			}
			Ok(FormFields(fields))
		} else if content_type.is_empty() {
			Ok(FormFields::default())
		} else {
			let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
				.await
				.map_err(|err| Error::ValidationError(err.body_text()))?;
			Ok(FormFields(fields))
		}
	}
}

// vim: ts=4
