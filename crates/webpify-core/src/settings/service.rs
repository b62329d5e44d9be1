//! Settings persistence

use std::sync::Arc;

use crate::prelude::*;
use webpify_types::media_adapter::MediaAdapter;
use webpify_types::settings::{ConverterSettings, SETTINGS_OPTION};

/// Reads and writes the converter settings record.
///
/// There is no cache: every request loads the record once and passes it
/// down explicitly, so a save is visible to the very next request.
pub struct SettingsService {
	meta: Arc<dyn MediaAdapter>,
}

impl SettingsService {
	pub fn new(meta: Arc<dyn MediaAdapter>) -> Self {
		Self { meta }
	}

	/// Stored settings, or the defaults if nothing was saved yet
	pub async fn load(&self) -> ClResult<ConverterSettings> {
		let Some(value) = self.meta.read_option(SETTINGS_OPTION).await? else {
			return Ok(ConverterSettings::default());
		};

		match serde_json::from_value::<ConverterSettings>(value.clone()) {
			Ok(settings) => Ok(settings),
			Err(err) => {
				// Older or hand-edited record, read it the lenient way
				debug!("stored settings not in canonical shape ({}), coercing", err);
				ConverterSettings::from_payload(&value).or_else(|err| {
					warn!("stored settings unusable ({}), using defaults", err);
					Ok(ConverterSettings::default())
				})
			}
		}
	}

	/// Replaces the stored record, last writer wins
	pub async fn save(&self, settings: &ConverterSettings) -> ClResult<()> {
		let value = serde_json::to_value(settings)?;
		self.meta.update_option(SETTINGS_OPTION, Some(value)).await?;
		info!(
			"settings saved: quality={} auto_convert={} keep_original={} batch_size={} cdn={}",
			settings.default_quality,
			settings.auto_convert,
			settings.keep_original,
			settings.batch_size,
			settings.cdn_enabled
		);
		Ok(())
	}
}

impl std::fmt::Debug for SettingsService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingsService").finish_non_exhaustive()
	}
}


// vim: ts=4
