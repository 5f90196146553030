//! Assembler configuration.
//!
//! Resolved once at process startup and then passed into the bundle assembler. Nothing in this
//! crate reads environment variables; binaries resolve them and hand over plain values.

use crate::constants::{DEMIS_BASE, PROFILE_NOTIFICATION_BUNDLE_DISEASE};
use crate::{FhirError, FhirResult};

/// Configuration consumed by [`crate::NotificationBundleBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblerConfig {
    full_url_base: String,
    bundle_profile: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            full_url_base: DEMIS_BASE.to_string(),
            bundle_profile: PROFILE_NOTIFICATION_BUNDLE_DISEASE.to_string(),
        }
    }
}

impl AssemblerConfig {
    /// Create a new `AssemblerConfig`.
    ///
    /// A trailing `/` on `full_url_base` is removed.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if the base is not an `http(s)://` URL or the bundle
    /// profile is empty.
    pub fn new(full_url_base: &str, bundle_profile: &str) -> FhirResult<Self> {
        Ok(Self {
            full_url_base: validate_full_url_base(full_url_base)?,
            bundle_profile: validate_profile(bundle_profile)?,
        })
    }

    /// Base of absolute entry `fullUrl`s, without trailing slash.
    pub fn full_url_base(&self) -> &str {
        &self.full_url_base
    }

    pub fn bundle_profile(&self) -> &str {
        &self.bundle_profile
    }
}

fn validate_full_url_base(value: &str) -> FhirResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(FhirError::InvalidInput(
            "full URL base cannot be empty".into(),
        ));
    }

    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match host {
        Some(rest) if !rest.is_empty() && !rest.contains(char::is_whitespace) => {
            Ok(trimmed.to_string())
        }
        _ => Err(FhirError::InvalidInput(format!(
            "full URL base must be an http(s) URL, got '{}'",
            value
        ))),
    }
}

fn validate_profile(value: &str) -> FhirResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FhirError::InvalidInput(
            "bundle profile cannot be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parse the full URL base from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default DEMIS base.
pub fn full_url_base_from_env_value(value: Option<String>) -> FhirResult<String> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    match value {
        Some(v) => validate_full_url_base(&v),
        None => Ok(DEMIS_BASE.to_string()),
    }
}

/// Parse the bundle profile from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the disease notification bundle profile.
pub fn bundle_profile_from_env_value(value: Option<String>) -> FhirResult<String> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    Ok(value.unwrap_or_else(|| PROFILE_NOTIFICATION_BUNDLE_DISEASE.to_string()))
}
