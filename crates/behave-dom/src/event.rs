//! Events and listener identities.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::node::Node;

/// An event delivered to a [`Listener`].
///
/// Backends translate their native event into this shape. `detail` carries
/// backend-specific extras (for example `{"key": "Enter"}` for keyboard
/// events on the web backend).
#[derive(Debug)]
pub struct Event {
	kind: String,
	current_target: Node,
	target: Option<Node>,
	detail: Value,
	default_prevented: Cell<bool>,
}

impl Event {
	/// Creates an event of `kind` delivered to `current_target`.
	pub fn new(kind: impl Into<String>, current_target: Node) -> Self {
		Self {
			kind: kind.into(),
			current_target,
			target: None,
			detail: Value::Null,
			default_prevented: Cell::new(false),
		}
	}

	/// Sets the originating node when it differs from the current target.
	pub fn with_target(mut self, target: Node) -> Self {
		self.target = Some(target);
		self
	}

	/// Attaches backend-specific data.
	pub fn with_detail(mut self, detail: Value) -> Self {
		self.detail = detail;
		self
	}

	/// Event name, e.g. `click`.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// The node the listener is attached to.
	pub fn current_target(&self) -> &Node {
		&self.current_target
	}

	/// The node the event originated from. Falls back to the current target.
	pub fn target(&self) -> &Node {
		self.target.as_ref().unwrap_or(&self.current_target)
	}

	/// Backend-specific payload; `Null` when there is none.
	pub fn detail(&self) -> &Value {
		&self.detail
	}

	/// Asks the backend to cancel the default action.
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	/// Whether a listener called [`Event::prevent_default`].
	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

/// A cloneable event handler with identity.
///
/// Two `Listener`s are equal only when they share the same allocation, which
/// is what the listener cache compares: re-creating a closure every pass yields
/// a new identity and therefore a remove/add pair.
#[derive(Clone)]
pub struct Listener {
	inner: Rc<dyn Fn(&Event)>,
}

impl Listener {
	/// Wraps a handler function.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Invokes the handler.
	pub fn call(&self, event: &Event) {
		(self.inner)(event)
	}

	/// Address of the shared handler, stable for the listener's lifetime.
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner) as *const () as usize
	}
}

impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Listener").field("id", &self.id()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::{MemoryDocument, element};
	use rstest::rstest;

	#[rstest]
	fn test_listener_identity_follows_clones() {
		let a = Listener::new(|_| {});
		let b = Listener::new(|_| {});

		assert_eq!(a, a.clone());
		assert_ne!(a, b);
	}

	#[rstest]
	fn test_event_target_falls_back_to_current_target() {
		let doc = MemoryDocument::new();
		let node = doc.append_to_body(element("button"));
		let event = Event::new("click", node.clone());

		assert_eq!(event.kind(), "click");
		assert_eq!(event.target(), &node);
		assert!(!event.default_prevented());

		event.prevent_default();
		assert!(event.default_prevented());
	}
}
