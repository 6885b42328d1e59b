//! Manager settings.
//!
//! Settings are plain serde data so a page can ship them inline as JSON:
//!
//! ```
//! use behave_core::Settings;
//!
//! let settings = Settings::from_json(r#"{"data_attribute": "widget"}"#).unwrap();
//! assert_eq!(settings.discovery_attribute(), "data-widget");
//! assert!(settings.warn_unknown);
//! ```

use behave_dom::data_attribute;
use serde::{Deserialize, Serialize};

/// Result of settings validation.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings error.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The settings document is not valid JSON for [`Settings`].
	#[error("Failed to parse settings: {0}")]
	Parse(#[from] serde_json::Error),

	/// A field holds an unusable value.
	#[error("Invalid value for '{key}': {message}")]
	Invalid {
		/// Offending field.
		key: String,
		/// What is wrong with it.
		message: String,
	},
}

/// How the [`BehaviorManager`](crate::BehaviorManager) discovers behaviors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Suffix of the discovery attribute: `"behavior"` scans
	/// `data-behavior`.
	pub data_attribute: String,

	/// Warn about names with no registered behavior. When false they are
	/// skipped silently.
	pub warn_unknown: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			data_attribute: "behavior".to_string(),
			warn_unknown: true,
		}
	}
}

impl Settings {
	/// Parses and validates JSON settings. Missing keys take their defaults.
	pub fn from_json(json: &str) -> SettingsResult<Self> {
		let settings: Self = serde_json::from_str(json)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Checks that the attribute suffix yields a valid `data-*` name.
	pub fn validate(&self) -> SettingsResult<()> {
		let attribute = self.data_attribute.trim();
		if attribute.is_empty() {
			return Err(SettingsError::Invalid {
				key: "data_attribute".to_string(),
				message: "must not be empty".to_string(),
			});
		}
		let valid = attribute.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
		if !valid || attribute.starts_with('-') {
			return Err(SettingsError::Invalid {
				key: "data_attribute".to_string(),
				message: format!("`{}` is not a valid data attribute suffix", attribute),
			});
		}
		Ok(())
	}

	/// The attribute scanned for behavior names, e.g. `data-behavior`.
	pub fn discovery_attribute(&self) -> String {
		data_attribute(&[self.data_attribute.trim()])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = Settings::from_json("{}").unwrap();

		assert_eq!(settings, Settings::default());
		assert_eq!(settings.discovery_attribute(), "data-behavior");
	}

	#[rstest]
	fn test_attribute_is_lowercased() {
		let settings = Settings {
			data_attribute: "Widget".to_string(),
			..Settings::default()
		};

		assert_eq!(settings.discovery_attribute(), "data-widget");
	}

	#[rstest]
	#[case(r#"{"data_attribute": ""}"#)]
	#[case(r#"{"data_attribute": "has space"}"#)]
	#[case(r#"{"data_attribute": "-leading"}"#)]
	fn test_invalid_attribute_rejected(#[case] json: &str) {
		let err = Settings::from_json(json).unwrap_err();

		assert!(matches!(err, SettingsError::Invalid { ref key, .. } if key == "data_attribute"));
	}

	#[rstest]
	fn test_malformed_json_is_parse_error() {
		let err = Settings::from_json("{attribute").unwrap_err();

		assert!(matches!(err, SettingsError::Parse(_)));
	}
}
