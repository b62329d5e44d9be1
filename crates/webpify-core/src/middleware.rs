//! Custom middlewares

use axum::{
	body::Body,
	extract::{Query, State},
	http::{HeaderValue, Request, header},
	middleware::Next,
	response::Response,
};
use serde::Deserialize;
use std::{future::Future, pin::Pin, time::Instant};
use tracing::Instrument;

use crate::extract::{Auth, RequestId};
use crate::prelude::*;
use webpify_types::types::Capability;

pub const NONCE_HEADER: &str = "x-webpify-nonce";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

type MiddlewareFuture = Pin<Box<dyn Future<Output = ClResult<Response<Body>>> + Send>>;

// Request id and access log //
//***************************//
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response<Body> {
	let req_id = uuid::Uuid::new_v4().simple().to_string();
	let short_id = req_id.get(..8).unwrap_or(&req_id);
	let span = info_span!("REQ", id = %short_id);
	let start = Instant::now();

	span.in_scope(|| info!("REQ {} {}", req.method(), req.uri().path()));
	req.extensions_mut().insert(RequestId(req_id.clone()));

	let mut res = next.run(req).instrument(span.clone()).await;
	span.in_scope(|| {
		info!("RES {} {:.1}ms", res.status().as_u16(), start.elapsed().as_secs_f64() * 1000.0);
	});

	if let Ok(value) = HeaderValue::from_str(&req_id) {
		res.headers_mut().insert(REQUEST_ID_HEADER, value);
	}
	res
}

// Nonce //
//*******//
#[derive(Deserialize)]
struct NonceQuery {
	nonce: Option<String>,
}

fn request_nonce(req: &Request<Body>) -> Option<String> {
	if let Some(nonce) = req.headers().get(NONCE_HEADER).and_then(|h| h.to_str().ok()) {
		return Some(nonce.trim().to_string());
	}
	Query::<NonceQuery>::try_from_uri(req.uri()).ok().and_then(|q| q.0.nonce)
}

/// Verifies the request nonce and attaches the `Auth` it was issued to
pub async fn require_nonce(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let nonce = request_nonce(&req).ok_or(Error::InvalidNonce)?;
	let auth = app.nonce.verify_nonce(&nonce, Timestamp::now())?;
	debug!("nonce ok: user {} ({})", auth.user_id, auth.role.as_str());

	req.extensions_mut().insert(Auth(auth));
	Ok(next.run(req).await)
}

// Capabilities //
//**************//
/// Middleware factory rejecting requests whose role lacks `capability`.
///
/// Must be layered inside `require_nonce`.
pub fn require_capability(
	capability: Capability,
) -> impl Fn(Request<Body>, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static {
	move |req: Request<Body>, next: Next| {
		Box::pin(async move {
			let Some(Auth(auth)) = req.extensions().get::<Auth>() else {
				return Err(Error::InvalidNonce);
			};
			if !auth.role.can(capability) {
				warn!("user {} lacks {}", auth.user_id, capability.as_str());
				return Err(Error::PermissionDenied);
			}
			Ok(next.run(req).await)
		})
	}
}

// Admin token //
//*************//
/// Guards operator routes with the configured bearer token
pub async fn require_admin_token(
	State(app): State<App>,
	req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let expected = app.opts.admin_token.as_deref().ok_or(Error::Unauthorized)?;
	let token = req
		.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.ok_or(Error::Unauthorized)?;

	if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
		return Err(Error::Unauthorized);
	}
	Ok(next.run(req).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_request_nonce_sources() {
		let req = Request::builder()
			.uri("/ajax/get_webp_settings?nonce=from-query")
			.body(Body::empty())
			.unwrap();
		assert_eq!(request_nonce(&req).as_deref(), Some("from-query"));

		let req = Request::builder()
			.uri("/ajax/get_webp_settings?nonce=from-query")
			.header(NONCE_HEADER, "from-header")
			.body(Body::empty())
			.unwrap();
		assert_eq!(request_nonce(&req).as_deref(), Some("from-header"));

		let req = Request::builder().uri("/ajax/get_webp_settings").body(Body::empty()).unwrap();
		assert_eq!(request_nonce(&req), None);
	}

	#[test]
	fn test_constant_time_eq() {
		assert!(constant_time_eq(b"token", b"token"));
		assert!(!constant_time_eq(b"token", b"tokem"));
		assert!(!constant_time_eq(b"token", b"token2"));
	}
}

// vim: ts=4
