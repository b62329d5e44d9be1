//! Converter settings record
//!
//! A single global record persisted as one JSON option. Inbound payloads are
//! loosely typed (form fields stringified by the browser), so every field is
//! coerced to its primitive type here, at the boundary, and the rest of the
//! code only ever sees a `ConverterSettings`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;

/// Option key the record is stored under
pub const SETTINGS_OPTION: &str = "webp_optimizer_settings";

pub const DEFAULT_QUALITY: u8 = 80;
pub const DEFAULT_BATCH_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedFormats {
	pub jpeg: bool,
	pub png: bool,
	pub gif: bool,
}

impl Default for SupportedFormats {
	fn default() -> Self {
		Self { jpeg: true, png: true, gif: true }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterSettings {
	pub default_quality: u8,
	pub auto_convert: bool,
	pub keep_original: bool,
	pub batch_size: u32,
	pub cdn_enabled: bool,
	pub cdn_url: String,
	pub supported_formats: SupportedFormats,
}

impl Default for ConverterSettings {
	fn default() -> Self {
		Self {
			default_quality: DEFAULT_QUALITY,
			auto_convert: false,
			keep_original: true,
			batch_size: DEFAULT_BATCH_SIZE,
			cdn_enabled: false,
			cdn_url: String::new(),
			supported_formats: SupportedFormats::default(),
		}
	}
}

impl ConverterSettings {
	/// Parse a loosely typed payload into a settings record.
	///
	/// Unknown fields are dropped, missing fields take their default value
	/// (a save is a full replace, never a merge with the stored record).
	pub fn from_payload(payload: &Value) -> ClResult<Self> {
		let obj = payload
			.as_object()
			.ok_or_else(|| Error::ValidationError("Invalid settings format".into()))?;
		let defaults = Self::default();

		let quality = coerce_int("default_quality", obj.get("default_quality"), defaults.default_quality.into())?;
		let batch_size = coerce_int("batch_size", obj.get("batch_size"), defaults.batch_size.into())?;
		if batch_size < 1 {
			return Err(Error::ValidationError("batch_size must be at least 1".into()));
		}

		let supported_formats = match obj.get("supported_formats") {
			None | Some(Value::Null) => defaults.supported_formats,
			Some(Value::Object(formats)) => SupportedFormats {
				jpeg: coerce_bool("supported_formats.jpeg", formats.get("jpeg"), true)?,
				png: coerce_bool("supported_formats.png", formats.get("png"), true)?,
				gif: coerce_bool("supported_formats.gif", formats.get("gif"), true)?,
			},
			Some(_) => {
				return Err(Error::ValidationError("Invalid value for supported_formats".into()));
			}
		};

		let cdn_url = coerce_string("cdn_url", obj.get("cdn_url"), "")?;

		Ok(Self {
			default_quality: clamp_quality(quality),
			auto_convert: coerce_bool("auto_convert", obj.get("auto_convert"), defaults.auto_convert)?,
			keep_original: coerce_bool("keep_original", obj.get("keep_original"), defaults.keep_original)?,
			batch_size: u32::try_from(batch_size).unwrap_or(u32::MAX),
			cdn_enabled: coerce_bool("cdn_enabled", obj.get("cdn_enabled"), defaults.cdn_enabled)?,
			cdn_url: sanitize_url(&cdn_url),
			supported_formats,
		})
	}

	/// MIME types the converter is allowed to touch
	pub fn enabled_mime_types(&self) -> Vec<&'static str> {
		let mut mime_types = Vec::with_capacity(3);
		if self.supported_formats.jpeg {
			mime_types.push("image/jpeg");
		}
		if self.supported_formats.png {
			mime_types.push("image/png");
		}
		if self.supported_formats.gif {
			mime_types.push("image/gif");
		}
		mime_types
	}

	pub fn is_mime_enabled(&self, mime_type: &str) -> bool {
		self.enabled_mime_types().contains(&mime_type)
	}
}

/// Clamp any integer into the valid WebP quality range
pub fn clamp_quality(quality: i64) -> u8 {
	quality.clamp(1, 100) as u8
}

// Coercion helpers //
//******************//
fn invalid(field: &str) -> Error {
	Error::ValidationError(format!("Invalid value for {}", field))
}

/// Integer value of a string, the lenient way: leading sign and digits,
/// anything after them ignored, no digits at all is zero.
pub fn leading_int(s: &str) -> i64 {
	let s = s.trim();
	let (neg, digits) = match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	};
	let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
	let value = digits[..end].parse::<i64>().unwrap_or(if end == 0 { 0 } else { i64::MAX });
	if neg { -value } else { value }
}

fn coerce_int(field: &str, value: Option<&Value>, default: i64) -> ClResult<i64> {
	match value {
		None | Some(Value::Null) => Ok(default),
		Some(Value::Bool(b)) => Ok(i64::from(*b)),
		Some(Value::Number(n)) => {
			n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).ok_or_else(|| invalid(field))
		}
		Some(Value::String(s)) => Ok(leading_int(s)),
		Some(_) => Err(invalid(field)),
	}
}

fn coerce_bool(field: &str, value: Option<&Value>, default: bool) -> ClResult<bool> {
	match value {
		None | Some(Value::Null) => Ok(default),
		Some(Value::Bool(b)) => Ok(*b),
		Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
		Some(Value::String(s)) => {
			let s = s.trim().to_ascii_lowercase();
			Ok(!matches!(s.as_str(), "" | "0" | "false" | "off" | "no"))
		}
		Some(_) => Err(invalid(field)),
	}
}

fn coerce_string(field: &str, value: Option<&Value>, default: &str) -> ClResult<String> {
	match value {
		None | Some(Value::Null) => Ok(default.to_string()),
		Some(Value::String(s)) => Ok(s.clone()),
		Some(Value::Number(n)) => Ok(n.to_string()),
		Some(Value::Bool(b)) => Ok(if *b { "1".into() } else { String::new() }),
		Some(_) => Err(invalid(field)),
	}
}

/// Keep only absolute http(s) URLs, anything else becomes empty
fn sanitize_url(raw: &str) -> String {
	let raw = raw.trim();
	match url::Url::parse(raw) {
		Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
			raw.to_string()
		}
		_ => {
			if !raw.is_empty() {
				debug!("dropping invalid cdn url {:?}", raw);
			}
			String::new()
		}
	}
}


// vim: ts=4
