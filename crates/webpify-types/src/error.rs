//! Error type shared by every webpify crate
//!
//! Handlers return `ClResult<T>`; whatever escapes a handler is turned into
//! the JSON failure envelope by the `IntoResponse` impl below.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	// auth
	/// Missing, malformed, forged or expired nonce
	InvalidNonce,
	/// Authenticated, but the role lacks the required capability
	PermissionDenied,
	/// Missing or wrong bearer credential on operator routes
	Unauthorized,

	// request
	ValidationError(String),
	NotFound,

	// image pipeline
	UnsupportedFormat,
	ImageDecode(String),
	ImageEncode(String),

	// infrastructure
	DbError,
	Parse,
	ConfigError(String),
	Internal(String),
	Io(std::io::Error),
}

impl Error {
	/// Stable machine readable code used in the failure envelope
	pub fn code(&self) -> &'static str {
		match self {
			Error::InvalidNonce => "E-AUTH-NONCE",
			Error::PermissionDenied => "E-AUTH-NOPERM",
			Error::Unauthorized => "E-AUTH-UNAUTH",
			Error::ValidationError(_) => "E-VALIDATION",
			Error::NotFound => "E-CORE-NOTFOUND",
			Error::UnsupportedFormat => "E-IMG-FORMAT",
			Error::ImageDecode(_) => "E-IMG-DECODE",
			Error::ImageEncode(_) => "E-IMG-ENCODE",
			Error::DbError => "E-CORE-DBERR",
			Error::Parse => "E-CORE-PARSE",
			Error::ConfigError(_) => "E-CORE-CONFIG",
			Error::Internal(_) | Error::Io(_) => "E-INTERNAL",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::InvalidNonce | Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::ValidationError(_) | Error::Parse => StatusCode::BAD_REQUEST,
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			Error::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Error::ImageEncode(_)
			| Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::InvalidNonce => write!(f, "Invalid security token"),
			Error::PermissionDenied => write!(f, "Insufficient permissions"),
			Error::Unauthorized => write!(f, "Authentication required"),
			Error::ValidationError(msg) => write!(f, "{}", msg),
			Error::NotFound => write!(f, "Not found"),
			Error::UnsupportedFormat => write!(f, "Unsupported image type"),
			Error::ImageDecode(_) => write!(f, "Failed to create image resource"),
			Error::ImageEncode(_) => write!(f, "Failed to convert to WebP"),
			Error::DbError => write!(f, "Database error"),
			Error::Parse => write!(f, "Parse error"),
			Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "Internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!("request failed: {:?}", self);
		} else {
			tracing::warn!("request rejected: {}", self);
		}

		// Internal details stay in the log
		let message = match &self {
			Error::Internal(_) | Error::Io(_) | Error::DbError => "Internal server error".to_string(),
			err => err.to_string(),
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message,
			}
		});

		(status, Json(body)).into_response()
	}
}

// Conversions //
//*************//
impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("json error: {}", err);
		Self::Parse
	}
}

impl From<std::num::ParseIntError> for Error {
	fn from(_err: std::num::ParseIntError) -> Self {
		Self::Parse
	}
}

impl From<axum::http::Error> for Error {
	fn from(err: axum::http::Error) -> Self {
		Self::Internal(format!("http: {}", err))
	}
}

impl From<axum::extract::multipart::MultipartError> for Error {
	fn from(err: axum::extract::multipart::MultipartError) -> Self {
		Self::ValidationError(format!("Malformed upload: {}", err.body_text()))
	}
}

#[cfg(feature = "server")]
impl From<image::ImageError> for Error {
	fn from(err: image::ImageError) -> Self {
		match err {
			image::ImageError::Unsupported(_) => Self::UnsupportedFormat,
			image::ImageError::Decoding(e) => Self::ImageDecode(e.to_string()),
			image::ImageError::Limits(e) => Self::ImageDecode(e.to_string()),
			image::ImageError::Encoding(e) => Self::ImageEncode(e.to_string()),
			image::ImageError::IoError(e) => Self::Io(e),
			e @ image::ImageError::Parameter(_) => Self::Internal(e.to_string()),
		}
	}
}


// vim: ts=4
