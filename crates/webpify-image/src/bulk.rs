//! Bulk conversion of the existing library, in rounds.
//!
//! Each request converts one batch (`batch_size` from the settings) and tells
//! the client whether to ask for another round. Two ways to address the next
//! batch are supported:
//!
//! * page mode: the client sends `page`, the server skips `(page - 1) *
//!   batch_size` matching assets. Assets replaced in place drop out of the
//!   matching set, which shifts later pages.
//! * cursor mode: the client sends back the `next_cursor` token of the
//!   previous round. The token is signed by the server and holds the id of
//!   the last asset handled, the run options and the accumulated counters,
//!   so the next batch starts right after that id whatever happened to
//!   earlier assets.
//!
//! Concurrent runs are not coordinated and may convert the same asset twice.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::convert::{self, ConvertMode};
use crate::prelude::*;
use webpify_core::extract::FormFields;
use webpify_types::media_adapter::{Asset, ListAssetOptions};
use webpify_types::settings::{ConverterSettings, DEFAULT_QUALITY, clamp_quality, leading_int};
use webpify_types::types::AuthCtx;
use webpify_types::worker::Lane;

const CURSOR_PURPOSE: &str = "bulk_cursor";

/// Per-round (or accumulated) counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
	/// Matching assets in the library when the run started (cursor mode) or
	/// when the round ran (page mode)
	pub total: u64,
	/// Assets handled, skipped ones included
	pub processed: u64,
	pub converted: u64,
	pub failed: u64,
	pub skipped: u64,
}

impl BatchStats {
	/// Add the counters of another round, `total` is kept
	pub fn accumulate(&mut self, round: &BatchStats) {
		self.processed += round.processed;
		self.converted += round.converted;
		self.failed += round.failed;
		self.skipped += round.skipped;
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BulkCursor {
	uid: u32,
	last_id: AssetId,
	total: u64,
	quality: u8,
	delete_original: bool,
	stats: BatchStats,
}

/// One bulk round as requested by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
	pub quality: u8,
	pub delete_original: bool,
	pub page: u64,
	pub cursor: Option<String>,
}

impl Default for BulkRequest {
	fn default() -> Self {
		Self { quality: DEFAULT_QUALITY, delete_original: false, page: 1, cursor: None }
	}
}

impl BulkRequest {
	pub fn from_form(form: &FormFields) -> Self {
		let quality = form.get("quality").map_or(i64::from(DEFAULT_QUALITY), leading_int);
		let page = form.get("page").map_or(1, leading_int).max(1);
		Self {
			quality: clamp_quality(quality),
			delete_original: form.get("delete_original") == Some("1"),
			page: page as u64,
			cursor: form.get("cursor").map(str::trim).filter(|c| !c.is_empty()).map(String::from),
		}
	}

	/// Form fields of this request, as a client posts them
	pub fn to_form(&self) -> Vec<(&'static str, String)> {
		let mut fields = vec![
			("quality", self.quality.to_string()),
			("delete_original", if self.delete_original { "1" } else { "0" }.to_string()),
			("page", self.page.to_string()),
		];
		if let Some(cursor) = &self.cursor {
			fields.push(("cursor", cursor.clone()));
		}
		fields
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
	pub message: String,
	pub stats: BatchStats,
	pub has_more: bool,
	/// Page for the next round. Offsets shift when the run replaces assets in
	/// place (`delete_original`), so page clients can miss assets then;
	/// `next_cursor` does not have this problem.
	pub next_page: u64,
	/// Continuation after the last asset of this round, set while `has_more`
	pub next_cursor: Option<String>,
	/// Counters of the whole run so far, when the server can tell
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub run_stats: Option<BatchStats>,
}

fn encode_cursor(app: &App, cursor: &BulkCursor) -> ClResult<String> {
	app.nonce.sign(CURSOR_PURPOSE, &serde_json::to_vec(cursor)?)
}

fn decode_cursor(app: &App, auth: &AuthCtx, token: &str) -> ClResult<BulkCursor> {
	let invalid = || Error::ValidationError("Invalid cursor".into());
	let payload = app.nonce.verify(CURSOR_PURPOSE, token).map_err(|_| invalid())?;
	let cursor: BulkCursor = serde_json::from_slice(&payload).map_err(|_| invalid())?;
	if cursor.uid != auth.user_id {
		warn!("user {} sent a cursor issued to user {}", auth.user_id, cursor.uid);
		return Err(invalid());
	}
	Ok(cursor)
}

async fn process_batch(app: &App, assets: &[Asset], quality: u8, delete_original: bool) -> BatchStats {
	let mode = if delete_original { ConvertMode::ReplaceInPlace } else { ConvertMode::Sibling };
	let mut stats = BatchStats::default();

	for asset in assets {
		stats.processed += 1;
		if app.blob_adapter.stat_file(&asset.file_path).await.is_none() {
			debug!("asset {} skipped, {} is missing", asset.asset_id, asset.file_path);
			stats.skipped += 1;
			continue;
		}
		match convert::convert_asset(app, asset, quality, mode, Lane::Batch).await {
			Ok(_) => stats.converted += 1,
			Err(err) => {
				warn!("asset {} ({}) conversion failed: {}", asset.asset_id, asset.file_path, err);
				stats.failed += 1;
			}
		}
	}
	stats
}

/// Matching assets skipped before `page`, `None` when it cannot be addressed
fn page_offset(page: u64, batch_size: u32) -> Option<u64> {
	page.saturating_sub(1)
		.checked_mul(u64::from(batch_size))
		.filter(|skip| i64::try_from(*skip).is_ok())
}

/// Runs one round of a bulk conversion
pub async fn run_round(
	app: &App,
	auth: &AuthCtx,
	settings: &ConverterSettings,
	req: &BulkRequest,
) -> ClResult<BulkResponse> {
	let batch_size = settings.batch_size.max(1);
	let mime_types = settings.enabled_mime_types();

	if let Some(token) = &req.cursor {
		let cursor = decode_cursor(app, auth, token)?;
		let opts = ListAssetOptions {
			after_id: Some(cursor.last_id),
			limit: Some(batch_size.saturating_add(1)),
			..ListAssetOptions::with_mime_types(mime_types.as_slice())
		};
		let mut assets = app.media_adapter.list_assets(&opts).await?;
		let has_more = assets.len() > batch_size as usize;
		assets.truncate(batch_size as usize);

		let mut stats = process_batch(app, &assets, cursor.quality, cursor.delete_original).await;
		stats.total = cursor.total;
		let mut run_stats = cursor.stats;
		run_stats.accumulate(&stats);

		let next_cursor = if has_more {
			let last_id = assets.last().map_or(cursor.last_id, |a| a.asset_id);
			Some(encode_cursor(app, &BulkCursor { last_id, stats: run_stats, ..cursor })?)
		} else {
			None
		};
		info!(
			"bulk round after asset {}: {} converted, {} failed, {} skipped (run: {}/{})",
			cursor.last_id, stats.converted, stats.failed, stats.skipped, run_stats.processed, stats.total
		);

		return Ok(BulkResponse {
			message: "Batch completed".into(),
			stats,
			has_more,
			next_page: req.page.saturating_add(1),
			next_cursor,
			run_stats: Some(run_stats),
		});
	}

	// Page mode
	let page = req.page.max(1);
	let skip = page_offset(page, batch_size)
		.ok_or_else(|| Error::ValidationError("Invalid page".into()))?;
	let opts = ListAssetOptions {
		offset: Some(skip),
		limit: Some(batch_size),
		..ListAssetOptions::with_mime_types(mime_types.as_slice())
	};
	let assets = app.media_adapter.list_assets(&opts).await?;
	let total = app.media_adapter.count_assets(&opts).await?;

	let mut stats = process_batch(app, &assets, req.quality, req.delete_original).await;
	stats.total = total;
	let has_more = skip.saturating_add(stats.processed) < total;

	let next_cursor = match assets.last() {
		Some(last) if has_more => Some(encode_cursor(
			app,
			&BulkCursor {
				uid: auth.user_id,
				last_id: last.asset_id,
				total,
				quality: req.quality,
				delete_original: req.delete_original,
				stats,
			},
		)?),
		_ => None,
	};
	info!(
		"bulk page {}: {} converted, {} failed, {} skipped of {}",
		page, stats.converted, stats.failed, stats.skipped, total
	);

	Ok(BulkResponse {
		message: "Batch completed".into(),
		stats,
		has_more,
		next_page: page.saturating_add(1),
		next_cursor,
		run_stats: (page == 1).then_some(stats),
	})
}

/// Client side loop: requests rounds until the server reports no more work.
///
/// Follows `next_cursor` when the server issues one, `next_page` otherwise.
/// Returns the accumulated counters, `total` from the first round.
pub async fn drive<F, Fut>(quality: u8, delete_original: bool, mut round: F) -> ClResult<BatchStats>
where
	F: FnMut(BulkRequest) -> Fut,
	Fut: Future<Output = ClResult<BulkResponse>>,
{
	let mut req = BulkRequest { quality, delete_original, page: 1, cursor: None };
	let mut totals: Option<BatchStats> = None;

	loop {
		let res = round(req.clone()).await?;
		let totals = totals.get_or_insert(BatchStats { total: res.stats.total, ..Default::default() });
		totals.accumulate(&res.stats);
		debug!("bulk progress: {}/{}", totals.processed, totals.total);

		if !res.has_more {
			return Ok(*totals);
		}
		req.page = res.next_page;
		req.cursor = res.next_cursor;
	}
}


// vim: ts=4
