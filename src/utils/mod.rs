//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use anyhow::{Context, Result};
use url::Url;

/// Normalize a target as typed on the command line into an absolute URL
///
/// Bare hosts such as `github.com` get an `https://` scheme.
pub fn normalize_url(target: &str) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        anyhow::bail!("Empty URL");
    }

    let candidate = if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{target}")
    };

    let parsed = Url::parse(&candidate).with_context(|| format!("Invalid URL: {target}"))?;
    if parsed.host_str().is_none() {
        anyhow::bail!("No host in URL: {target}");
    }

    // Url::parse appends a trailing slash to bare hosts; keep what the user typed
    Ok(candidate)
}

/// Normalize every target, keeping the raw text of any that fail
///
/// A target that cannot be normalized is passed through unchanged so the
/// probe reports it as a failed check alongside the others.
pub fn normalize_targets(targets: &[String]) -> Vec<String> {
    targets
        .iter()
        .map(|target| match normalize_url(target) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(target = %target, error = %e, "Keeping unnormalized target");
                target.clone()
            }
        })
        .collect()
}
