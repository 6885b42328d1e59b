//! Props: attribute-derived and parent-supplied inputs of a behavior.
//!
//! Props are not plain data. A parent hands its children callbacks (its own
//! bound methods) and occasionally nodes, so every entry is a [`PropValue`].
//!
//! ## Attribute props
//!
//! A behavior declares a prop-type table. At construction each declared prop
//! is read from `data-<behavior>-<prop>`:
//!
//! | Type | Attribute present | Attribute absent |
//! |------|-------------------|------------------|
//! | [`PropType::Object`] | parsed as JSON | `null` |
//! | [`PropType::Boolean`] | `true` | `false` |
//! | [`PropType::String`] | raw string | `null` |

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use behave_dom::{Node, data_attribute};
use serde_json::Value;

use crate::error::{BehaviorError, BehaviorResult};

/// A cloneable function with identity, passed down as a prop.
///
/// Children call these to report back to their parent
/// (`props.call("onChange", &[value])`).
#[derive(Clone)]
pub struct Callback {
	inner: Rc<dyn Fn(&[PropValue])>,
}

impl Callback {
	/// Wraps a function.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&[PropValue]) + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Invokes the callback.
	pub fn call(&self, args: &[PropValue]) {
		(self.inner)(args)
	}

	/// Address of the shared function.
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner) as *const () as usize
	}
}

impl PartialEq for Callback {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl fmt::Debug for Callback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback").field("id", &self.id()).finish()
	}
}

/// One prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
	/// Plain data.
	Json(Value),
	/// A function supplied by the parent.
	Callback(Callback),
	/// A DOM node.
	Node(Node),
}

impl PropValue {
	/// JSON `null`.
	pub fn null() -> Self {
		Self::Json(Value::Null)
	}

	/// The JSON payload, if this is data.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Json(value) => Some(value),
			_ => None,
		}
	}

	/// The string payload, if this is a JSON string.
	pub fn as_str(&self) -> Option<&str> {
		self.as_json().and_then(Value::as_str)
	}

	/// The callback, if this is one.
	pub fn as_callback(&self) -> Option<&Callback> {
		match self {
			Self::Callback(callback) => Some(callback),
			_ => None,
		}
	}

	/// The node, if this is one.
	pub fn as_node(&self) -> Option<&Node> {
		match self {
			Self::Node(node) => Some(node),
			_ => None,
		}
	}

	/// True for JSON `null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Json(Value::Null))
	}

	/// Script-style truthiness: callbacks and nodes are truthy, JSON follows
	/// [`is_truthy`].
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Json(value) => is_truthy(value),
			Self::Callback(_) | Self::Node(_) => true,
		}
	}
}

/// Script-style truthiness of a JSON value.
///
/// `null`, `false`, `0` and `""` are falsy; arrays and objects are truthy even
/// when empty.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

impl From<Value> for PropValue {
	fn from(value: Value) -> Self {
		Self::Json(value)
	}
}

impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Json(Value::Bool(value))
	}
}

impl From<i64> for PropValue {
	fn from(value: i64) -> Self {
		Self::Json(Value::from(value))
	}
}

impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::Json(Value::String(value.to_string()))
	}
}

impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Json(Value::String(value))
	}
}

impl From<Callback> for PropValue {
	fn from(value: Callback) -> Self {
		Self::Callback(value)
	}
}

impl From<Node> for PropValue {
	fn from(value: Node) -> Self {
		Self::Node(value)
	}
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
	fn from(value: Option<T>) -> Self {
		value.map_or_else(Self::null, Into::into)
	}
}

/// An ordered prop map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
	/// Empty props.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts or replaces a prop.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
		self.0.insert(name.into(), value.into());
	}

	/// Looks up a prop.
	pub fn get(&self, name: &str) -> Option<&PropValue> {
		self.0.get(name)
	}

	/// Whether a prop is present (even if `null`).
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	/// JSON payload of a prop.
	pub fn json(&self, name: &str) -> Option<&Value> {
		self.get(name).and_then(PropValue::as_json)
	}

	/// String payload of a prop.
	pub fn str(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(PropValue::as_str)
	}

	/// Truthiness of a prop; absent props are false.
	pub fn bool(&self, name: &str) -> bool {
		self.get(name).is_some_and(PropValue::is_truthy)
	}

	/// Callback stored under `name`.
	pub fn callback(&self, name: &str) -> Option<&Callback> {
		self.get(name).and_then(PropValue::as_callback)
	}

	/// Node stored under `name`.
	pub fn node(&self, name: &str) -> Option<&Node> {
		self.get(name).and_then(PropValue::as_node)
	}

	/// Invokes the callback stored under `name`.
	///
	/// Returns false when there is no such callback.
	pub fn call(&self, name: &str, args: &[PropValue]) -> bool {
		match self.callback(name) {
			Some(callback) => {
				callback.call(args);
				true
			}
			None => false,
		}
	}

	/// `self` overlaid with `explicit`; explicit entries win.
	pub fn merged(&self, explicit: &Props) -> Props {
		let mut merged = self.clone();
		for (name, value) in &explicit.0 {
			merged.0.insert(name.clone(), value.clone());
		}
		merged
	}

	/// Number of props.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether there are no props.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value))
	}
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.collect(),
		)
	}
}

/// How a prop attribute string becomes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropType {
	/// JSON-parsed.
	Object,
	/// Presence-based.
	Boolean,
	/// Raw string.
	#[default]
	String,
}

impl From<&str> for PropType {
	/// `"object"` and `"boolean"` select their types; anything else is a string.
	fn from(name: &str) -> Self {
		match name {
			"object" => Self::Object,
			"boolean" => Self::Boolean,
			_ => Self::String,
		}
	}
}

impl PropType {
	/// Converts the raw attribute (if present) to a value.
	pub fn parse(self, raw: Option<&str>) -> Result<Value, serde_json::Error> {
		match (self, raw) {
			(Self::Object, Some(raw)) => serde_json::from_str(raw),
			(Self::Object, None) => Ok(Value::Null),
			(Self::Boolean, raw) => Ok(Value::Bool(raw.is_some())),
			(Self::String, raw) => Ok(raw.map_or(Value::Null, |raw| Value::String(raw.to_string()))),
		}
	}
}

/// Reads every declared prop from `data-<behavior>-<prop>` on `node`.
pub(crate) fn attribute_props(
	behavior: &str,
	node: &Node,
	prop_types: &[(String, PropType)],
) -> BehaviorResult<Props> {
	let mut props = Props::new();
	for (name, prop_type) in prop_types {
		let attribute = data_attribute(&[behavior, name]);
		let raw = node.get_attribute(&attribute);
		let value = prop_type
			.parse(raw.as_deref())
			.map_err(|source| BehaviorError::InvalidPropJson {
				behavior: behavior.to_string(),
				attribute: attribute.clone(),
				source,
			})?;
		props.insert(name.clone(), value);
	}
	Ok(props)
}
