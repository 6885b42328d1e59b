//! Error types for behavior construction and reconciliation.

/// Result alias used across the engine.
pub type BehaviorResult<T> = Result<T, BehaviorError>;

/// Errors surfaced by construction and reconciliation.
///
/// Unknown behavior names are reported as [`BehaviorError::UnknownBehavior`]
/// by the registry, but the child reconciler and the manager downgrade them to
/// warnings and keep going.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
	/// An `object`-typed prop attribute did not contain valid JSON.
	#[error("Invalid JSON in `{attribute}` for behavior {behavior}: {source}")]
	InvalidPropJson {
		/// Behavior being constructed.
		behavior: String,
		/// Attribute that failed to parse.
		attribute: String,
		/// Parser error.
		#[source]
		source: serde_json::Error,
	},

	/// A single-node child group matched nothing under the behavior's node.
	#[error("Behavior {behavior} expects a `{attribute}` child for group `{group}`, none was found")]
	MissingChild {
		/// Owning behavior.
		behavior: String,
		/// Child group name.
		group: String,
		/// Discovery attribute that was queried.
		attribute: String,
	},

	/// No behavior with this name is registered.
	#[error("No loaded behavior called {name}")]
	UnknownBehavior {
		/// Requested behavior name.
		name: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_invalid_prop_json_display_names_attribute() {
		let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
		let err = BehaviorError::InvalidPropJson {
			behavior: "FilterControl".to_string(),
			attribute: "data-filtercontrol-config".to_string(),
			source,
		};

		let message = err.to_string();
		assert!(message.contains("data-filtercontrol-config"));
		assert!(message.contains("FilterControl"));
		assert!(std::error::Error::source(&err).is_some());
	}

	#[rstest]
	fn test_missing_child_display() {
		let err = BehaviorError::MissingChild {
			behavior: "Toggle".to_string(),
			group: "label".to_string(),
			attribute: "data-toggle-label".to_string(),
		};

		assert_eq!(
			err.to_string(),
			"Behavior Toggle expects a `data-toggle-label` child for group `label`, none was found"
		);
	}
}
