//! CDN URL rewriting.
//!
//! When enabled, the upload base URL prefix of public asset URLs is swapped
//! for the configured CDN origin.

use webpify_core::hooks::{HookRegistry, SrcsetCandidate};
use webpify_types::settings::ConverterSettings;

pub fn register_hooks(hooks: &mut HookRegistry) {
	hooks.add_asset_url_filter(|app, settings, _asset_id, url| {
		rewrite_url(&url, &app.upload_base_url(), settings)
	});
	hooks.add_srcset_filter(|app, settings, _asset_id, candidates| {
		rewrite_srcset(candidates, &app.upload_base_url(), settings)
	});
}

fn cdn_base(settings: &ConverterSettings) -> Option<&str> {
	if !settings.cdn_enabled || settings.cdn_url.is_empty() {
		return None;
	}
	Some(settings.cdn_url.trim_end_matches('/'))
}

/// Replace `base_url` with the CDN URL, unchanged when the CDN is off
pub fn rewrite_url(url: &str, base_url: &str, settings: &ConverterSettings) -> String {
	match cdn_base(settings) {
		Some(cdn) if !url.is_empty() && !base_url.is_empty() => url.replace(base_url, cdn),
		_ => url.to_string(),
	}
}

pub fn rewrite_srcset(
	candidates: Vec<SrcsetCandidate>,
	base_url: &str,
	settings: &ConverterSettings,
) -> Vec<SrcsetCandidate> {
	if cdn_base(settings).is_none() {
		return candidates;
	}
	candidates
		.into_iter()
		.map(|c| SrcsetCandidate { url: rewrite_url(&c.url, base_url, settings), ..c })
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = "https://site.example/uploads";

	fn cdn_settings(url: &str) -> ConverterSettings {
		ConverterSettings { cdn_enabled: true, cdn_url: url.into(), ..Default::default() }
	}

	#[test]
	fn test_rewrite_when_enabled() {
		let settings = cdn_settings("https://cdn.x/");
		assert_eq!(
			rewrite_url("https://site.example/uploads/2026/10/a.webp", BASE, &settings),
			"https://cdn.x/2026/10/a.webp"
		);
	}

	#[test]
	fn test_unchanged_when_disabled_or_empty() {
		let url = "https://site.example/uploads/2026/10/a.webp";
		let off = ConverterSettings { cdn_url: "https://cdn.x".into(), ..Default::default() };
		assert_eq!(rewrite_url(url, BASE, &off), url);
		assert_eq!(rewrite_url(url, BASE, &cdn_settings("")), url);
		assert_eq!(rewrite_url("", BASE, &cdn_settings("https://cdn.x")), "");
	}

	#[test]
	fn test_foreign_urls_untouched() {
		let settings = cdn_settings("https://cdn.x");
		let url = "https://elsewhere.example/img.png";
		assert_eq!(rewrite_url(url, BASE, &settings), url);
	}

	#[test]
	fn test_rewrite_srcset() {
		let settings = cdn_settings("https://cdn.x");
		let candidates = vec![
			SrcsetCandidate { url: format!("{}/a-300x300.webp", BASE), width: 300 },
			SrcsetCandidate { url: format!("{}/a.webp", BASE), width: 500 },
		];
		let rewritten = rewrite_srcset(candidates, BASE, &settings);
		assert_eq!(rewritten[0].url, "https://cdn.x/a-300x300.webp");
		assert_eq!(rewritten[1], SrcsetCandidate { url: "https://cdn.x/a.webp".into(), width: 500 });
	}
}

// vim: ts=4
