//! Common types used throughout webpify.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// AssetId //
//*********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl std::fmt::Display for AssetId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for AssetId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(AssetId(s.parse()?))
	}
}

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Roles and capabilities //
//************************//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
	/// Change plugin settings, run bulk conversions
	ManageOptions,
	/// Upload and convert individual images
	UploadFiles,
}

impl Capability {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::ManageOptions => "manage_options",
			Self::UploadFiles => "upload_files",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Administrator,
	Editor,
	Author,
	Subscriber,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Administrator => "administrator",
			Self::Editor => "editor",
			Self::Author => "author",
			Self::Subscriber => "subscriber",
		}
	}

	pub fn from_str_opt(s: &str) -> Option<Self> {
		match s {
			"administrator" => Some(Self::Administrator),
			"editor" => Some(Self::Editor),
			"author" => Some(Self::Author),
			"subscriber" => Some(Self::Subscriber),
			_ => None,
		}
	}

	pub fn can(&self, capability: Capability) -> bool {
		match capability {
			Capability::ManageOptions => matches!(self, Self::Administrator),
			Capability::UploadFiles => !matches!(self, Self::Subscriber),
		}
	}
}

/// Identity proven by a verified nonce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
	pub user_id: u32,
	pub role: Role,
}

// ApiResponse //
//*************//
/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
	pub data: T,
	#[serde(rename = "reqId", skip_serializing_if = "Option::is_none")]
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, req_id: None }
	}

	pub fn with_req_id(mut self, req_id: impl Into<String>) -> Self {
		let req_id = req_id.into();
		if !req_id.is_empty() {
			self.req_id = Some(req_id);
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_role_capabilities() {
		assert!(Role::Administrator.can(Capability::ManageOptions));
		assert!(Role::Administrator.can(Capability::UploadFiles));
		assert!(Role::Author.can(Capability::UploadFiles));
		assert!(!Role::Author.can(Capability::ManageOptions));
		assert!(!Role::Editor.can(Capability::ManageOptions));
		assert!(!Role::Subscriber.can(Capability::UploadFiles));
	}

	#[test]
	fn test_api_response_req_id() {
		let json = serde_json::to_value(ApiResponse::new(1).with_req_id("")).unwrap();
		assert!(json.get("reqId").is_none());
		let json = serde_json::to_value(ApiResponse::new(1).with_req_id("r1")).unwrap();
		assert_eq!(json["reqId"], "r1");
		assert_eq!(json["data"], 1);
	}
}

// vim: ts=4
