//! Utility functions

use chrono::{DateTime, Datelike, Utc};

use crate::prelude::*;
use rand::RngExt;

pub const ID_LENGTH: usize = 24;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// Extensions of the formats the converter reads
const CONVERTIBLE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

pub fn random_id() -> ClResult<String> {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(ID_LENGTH);

	for _ in 0..ID_LENGTH {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	Ok(result)
}

/// Make an uploaded file name safe to use inside the upload directory.
///
/// Path components are stripped, whitespace becomes `-`, anything outside
/// `[A-Za-z0-9._-]` is dropped and leading dots are removed.
///
/// # Examples
/// - `"../../etc/My Photo.JPG"` → `"My-Photo.JPG"`
/// - `"été 2026.png"` → `"t-2026.png"`
/// - `"..."` → `"image"`
pub fn sanitize_file_name(name: &str) -> String {
	let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
	let mut result = String::with_capacity(base.len());
	for c in base.chars() {
		if c.is_whitespace() {
			if !result.ends_with('-') {
				result.push('-');
			}
		} else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
			result.push(c);
		}
	}
	let result = result.trim_start_matches('.').trim_matches('-');
	if result.is_empty() || result.chars().all(|c| c == '.') {
		"image".to_string()
	} else {
		result.to_string()
	}
}

/// Split a path into (directory, file name). The directory has no trailing `/`.
pub fn split_dir(path: &str) -> (&str, &str) {
	match path.rfind('/') {
		Some(pos) => (&path[..pos], &path[pos + 1..]),
		None => ("", path),
	}
}

/// Join a directory and a file name, either may be empty
pub fn join_path(dir: &str, file: &str) -> String {
	if dir.is_empty() { file.to_string() } else { format!("{}/{}", dir.trim_end_matches('/'), file) }
}

/// File name without its final extension
pub fn file_stem(path: &str) -> &str {
	let (_, name) = split_dir(path);
	match name.rfind('.') {
		Some(0) | None => name,
		Some(pos) => &name[..pos],
	}
}

/// Path of the WebP counterpart of a file.
///
/// A trailing `.jpg`, `.jpeg`, `.png` or `.gif` (any case) is replaced by
/// `.webp`, any other name gets `.webp` appended.
pub fn webp_path(path: &str) -> String {
	if let Some(pos) = path.rfind('.') {
		let ext = &path[pos + 1..];
		if !ext.contains('/') && CONVERTIBLE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
			return format!("{}.webp", &path[..pos]);
		}
	}
	format!("{}.webp", path)
}

/// `{stem}-{n}.{ext}` style candidate for unique file names, `n == 0` is the name itself
pub fn numbered_name(stem: &str, ext: &str, n: u32) -> String {
	if n == 0 { format!("{}.{}", stem, ext) } else { format!("{}-{}.{}", stem, n, ext) }
}

/// Year/month upload subdirectory for a timestamp (e.g. `2026/10`)
pub fn upload_subdir(ts: Timestamp) -> String {
	let dt = DateTime::<Utc>::from_timestamp(ts.0, 0).unwrap_or_default();
	format!("{:04}/{:02}", dt.year(), dt.month())
}


// vim: ts=4
