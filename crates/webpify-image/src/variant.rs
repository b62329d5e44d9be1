//! Size variants generated next to every converted image.
//!
//! Mirrors the intermediate sizes a media library keeps for responsive
//! images: a square cropped thumbnail and three bounded sizes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
	/// 150x150, cropped to fill
	Thumbnail,
	/// Fits in 300x300
	Medium,
	/// 768px wide, any height
	MediumLarge,
	/// Fits in 1024x1024
	Large,
}

impl SizeTier {
	pub const ALL: &'static [SizeTier] =
		&[Self::Thumbnail, Self::Medium, Self::MediumLarge, Self::Large];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Thumbnail => "thumbnail",
			Self::Medium => "medium",
			Self::MediumLarge => "medium_large",
			Self::Large => "large",
		}
	}

	pub fn from_str_opt(s: &str) -> Option<Self> {
		match s {
			"thumbnail" => Some(Self::Thumbnail),
			"medium" => Some(Self::Medium),
			"medium_large" => Some(Self::MediumLarge),
			"large" => Some(Self::Large),
			_ => None,
		}
	}

	/// Bounding box, `0` means unbounded
	pub fn bounding_box(&self) -> (u32, u32) {
		match self {
			Self::Thumbnail => (150, 150),
			Self::Medium => (300, 300),
			Self::MediumLarge => (768, 0),
			Self::Large => (1024, 1024),
		}
	}

	pub fn crop(&self) -> bool {
		matches!(self, Self::Thumbnail)
	}

	/// Whether the tier belongs in responsive candidate lists
	pub fn responsive(&self) -> bool {
		!self.crop()
	}

	/// Target dimensions for a source image, `None` if no variant is needed
	/// (the source is not larger than the tier).
	pub fn target_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
		if width == 0 || height == 0 {
			return None;
		}
		let (max_w, max_h) = self.bounding_box();

		if self.crop() {
			let dims = (width.min(max_w), height.min(max_h));
			return (dims != (width, height)).then_some(dims);
		}

		let scale_w = if max_w == 0 { f64::INFINITY } else { f64::from(max_w) / f64::from(width) };
		let scale_h = if max_h == 0 { f64::INFINITY } else { f64::from(max_h) / f64::from(height) };
		let scale = scale_w.min(scale_h);
		if scale >= 1.0 {
			return None;
		}

		let w = (f64::from(width) * scale).round().max(1.0) as u32;
		let h = (f64::from(height) * scale).round().max(1.0) as u32;
		Some((w, h))
	}
}

impl fmt::Display for SizeTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for SizeTier {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_str_opt(s).ok_or(())
	}
}

/// File name of a size variant: `{stem}-{w}x{h}.webp`
pub fn variant_file_name(stem: &str, width: u32, height: u32) -> String {
	format!("{}-{}x{}.webp", stem, width, height)
}


// vim: ts=4
