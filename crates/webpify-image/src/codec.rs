//! Format detection, decoding and WebP encoding.
//!
//! Everything here is synchronous and CPU bound, callers run it on the
//! worker pool.

use image::codecs::{gif::GifDecoder, jpeg::JpegDecoder, png::PngDecoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageFormat, Limits};
use std::io::Cursor;
use std::time::Instant;

use crate::prelude::*;
use crate::variant::SizeTier;

/// Formats the converter reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
	Jpeg,
	Png,
	Gif,
}

impl SourceFormat {
	pub fn mime_type(&self) -> &'static str {
		match self {
			Self::Jpeg => "image/jpeg",
			Self::Png => "image/png",
			Self::Gif => "image/gif",
		}
	}
}

/// Detect the source format from the byte signature, never from a file name
pub fn detect_format(data: &[u8]) -> ClResult<SourceFormat> {
	match image::guess_format(data) {
		Ok(ImageFormat::Jpeg) => Ok(SourceFormat::Jpeg),
		Ok(ImageFormat::Png) => Ok(SourceFormat::Png),
		Ok(ImageFormat::Gif) => Ok(SourceFormat::Gif),
		Ok(other) => {
			debug!("unsupported source format {:?}", other);
			Err(Error::UnsupportedFormat)
		}
		Err(_) => Err(Error::UnsupportedFormat),
	}
}

/// MIME type of any image format the library knows, for files added to the
/// library directly (these are not necessarily convertible)
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
	let format = image::guess_format(data).ok()?;
	Some(match format {
		ImageFormat::Jpeg => "image/jpeg",
		ImageFormat::Png => "image/png",
		ImageFormat::Gif => "image/gif",
		ImageFormat::WebP => "image/webp",
		ImageFormat::Avif => "image/avif",
		ImageFormat::Bmp => "image/bmp",
		ImageFormat::Tiff => "image/tiff",
		_ => return None,
	})
}

fn decode_error(err: image::ImageError) -> Error {
	match err {
		image::ImageError::Unsupported(_) => Error::UnsupportedFormat,
		err => Error::ImageDecode(err.to_string()),
	}
}

fn decode_with<D: ImageDecoder>(mut decoder: D) -> ClResult<DynamicImage> {
	decoder.set_limits(Limits::default()).map_err(decode_error)?;
	DynamicImage::from_decoder(decoder).map_err(decode_error)
}

/// Decode with the decoder matching the detected format. GIFs yield their first frame.
pub fn decode(data: &[u8]) -> ClResult<(SourceFormat, DynamicImage)> {
	let format = detect_format(data)?;
	let reader = Cursor::new(data);

	let image = match format {
		SourceFormat::Jpeg => decode_with(JpegDecoder::new(reader).map_err(decode_error)?)?,
		SourceFormat::Png => decode_with(PngDecoder::new(reader).map_err(decode_error)?)?,
		SourceFormat::Gif => decode_with(GifDecoder::new(reader).map_err(decode_error)?)?,
	};
	Ok((format, image))
}

/// Lossy WebP encoding, quality is clamped to 1..=100
pub fn encode_webp(image: &DynamicImage, quality: u8) -> ClResult<Vec<u8>> {
	let quality = f32::from(quality.clamp(1, 100));
	let (width, height) = (image.width(), image.height());

	let encoded = if image.color().has_alpha() {
		let rgba = image.to_rgba8();
		webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(false, quality)
	} else {
		let rgb = image.to_rgb8();
		webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
	};

	encoded.map(|mem| mem.to_vec()).map_err(|err| Error::ImageEncode(format!("{:?}", err)))
}

#[derive(Debug)]
pub struct EncodedImage {
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
}

#[derive(Debug)]
pub struct EncodedVariant {
	pub tier: SizeTier,
	pub image: EncodedImage,
}

/// A converted image: the full size WebP plus its size variants
#[derive(Debug)]
pub struct Converted {
	pub source_format: SourceFormat,
	pub main: EncodedImage,
	pub variants: Vec<EncodedVariant>,
}

/// Decode `data` once and encode the full size image and every needed size variant
pub fn convert(data: &[u8], quality: u8, tiers: &[SizeTier]) -> ClResult<Converted> {
	let now = Instant::now();
	let (source_format, image) = decode(data)?;
	let (width, height) = (image.width(), image.height());
	debug!("decoded {:?} {}x{} [{:.2}ms]", source_format, width, height, now.elapsed().as_millis());

	let now = Instant::now();
	let main = EncodedImage { data: encode_webp(&image, quality)?, width, height };
	debug!("encoded webp q{}: {} bytes [{:.2}ms]", quality, main.data.len(), now.elapsed().as_millis());

	let mut variants = Vec::new();
	for tier in tiers {
		let Some((w, h)) = tier.target_dimensions(width, height) else { continue };
		let resized = if tier.crop() {
			image.resize_to_fill(w, h, FilterType::Lanczos3)
		} else {
			image.resize_exact(w, h, FilterType::Lanczos3)
		};
		let data = encode_webp(&resized, quality)?;
		variants.push(EncodedVariant {
			tier: *tier,
			image: EncodedImage { data, width: resized.width(), height: resized.height() },
		});
	}

	Ok(Converted { source_format, main, variants })
}

/// Dimensions of an encoded image without a full decode
pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
	image::ImageReader::new(Cursor::new(data)).with_guessed_format().ok()?.into_dimensions().ok()
}


// vim: ts=4
