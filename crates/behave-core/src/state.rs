//! Instance-owned state and the update contract.

use std::fmt;

use serde_json::{Map, Value};

use crate::props::is_truthy;

/// A behavior's state: a JSON object.
///
/// Only [`Behavior::set_state`](crate::Behavior::set_state) mutates the
/// instance's copy; readers get clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State(Map<String, Value>);

impl State {
	/// Empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds state from a JSON object; other values yield empty state.
	pub fn from_value(value: Value) -> Self {
		match value {
			Value::Object(map) => Self(map),
			_ => Self::default(),
		}
	}

	/// Reads a key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Reads a key, `null` when absent.
	pub fn value(&self, key: &str) -> Value {
		self.get(key).cloned().unwrap_or(Value::Null)
	}

	/// Truthiness of a key; absent keys are false.
	pub fn bool(&self, key: &str) -> bool {
		self.get(key).is_some_and(is_truthy)
	}

	/// String payload of a key.
	pub fn str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// The underlying map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Overwrites every key present in `partial`; other keys are kept.
	pub fn merge(&mut self, partial: Map<String, Value>) {
		for (key, value) in partial {
			self.0.insert(key, value);
		}
	}

	/// State as a JSON object.
	pub fn to_value(&self) -> Value {
		Value::Object(self.0.clone())
	}
}

/// Argument of [`Behavior::set_state`](crate::Behavior::set_state).
pub enum StateUpdate {
	/// Keys to overwrite.
	Partial(Map<String, Value>),
	/// Computes the keys to overwrite from the current state.
	With(Box<dyn FnOnce(&State) -> Map<String, Value>>),
}

impl StateUpdate {
	/// Functional update.
	///
	/// ```
	/// use behave_core::{State, StateUpdate};
	/// use serde_json::{Map, Value};
	///
	/// let toggle = StateUpdate::with(|state: &State| {
	///     let mut partial = Map::new();
	///     partial.insert("isOn".to_string(), Value::Bool(!state.bool("isOn")));
	///     partial
	/// });
	/// # let _ = toggle;
	/// ```
	pub fn with<F>(f: F) -> Self
	where
		F: FnOnce(&State) -> Map<String, Value> + 'static,
	{
		Self::With(Box::new(f))
	}

	pub(crate) fn resolve(self, state: &State) -> Map<String, Value> {
		match self {
			Self::Partial(partial) => partial,
			Self::With(f) => f(state),
		}
	}
}

impl fmt::Debug for StateUpdate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Partial(partial) => f.debug_tuple("Partial").field(partial).finish(),
			Self::With(_) => f.debug_tuple("With").field(&"<fn>").finish(),
		}
	}
}

impl From<Map<String, Value>> for StateUpdate {
	fn from(partial: Map<String, Value>) -> Self {
		Self::Partial(partial)
	}
}

impl From<Value> for StateUpdate {
	/// Objects become partial updates; any other value is an empty update.
	fn from(value: Value) -> Self {
		match value {
			Value::Object(partial) => Self::Partial(partial),
			other => {
				crate::warn_log!("Ignoring non-object state update: {}", other);
				Self::Partial(Map::new())
			}
		}
	}
}
