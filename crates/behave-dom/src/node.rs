//! Node handles and the backend trait behind them.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use serde_json::Value;

use crate::event::Listener;

/// Operations the reconciliation engine needs from a DOM element.
///
/// Implementations are cheap handles onto a node owned elsewhere (the
/// browser, or a [`MemoryDocument`](crate::MemoryDocument)). Every write goes
/// straight to the node; implementations must not cache.
pub trait DomNode: fmt::Debug + 'static {
	/// Upcast used by [`DomNode::is_same_node`] implementations to downcast
	/// the other side.
	fn as_any(&self) -> &dyn Any;

	/// Returns true if both handles point at the same physical node.
	fn is_same_node(&self, other: &dyn DomNode) -> bool;

	/// Lowercase tag name.
	fn tag_name(&self) -> String;

	/// Reads an HTML attribute. `name` must be lowercase.
	fn get_attribute(&self, name: &str) -> Option<String>;

	/// Returns true if the attribute is present, whatever its value.
	fn has_attribute(&self, name: &str) -> bool {
		self.get_attribute(name).is_some()
	}

	/// All descendants (not the node itself) carrying `attribute`, in document
	/// order. Equivalent to `querySelectorAll("[attribute]")`.
	fn descendants_with_attribute(&self, attribute: &str) -> Vec<Node>;

	/// Reads a DOM property such as `value`, `checked` or `textContent`.
	fn property(&self, name: &str) -> Value;

	/// Assigns a DOM property (not an HTML attribute).
	fn set_property(&self, name: &str, value: &Value);

	/// `classList.add`.
	fn add_class(&self, class: &str);

	/// `classList.remove`.
	fn remove_class(&self, class: &str);

	/// `classList.contains`.
	fn has_class(&self, class: &str) -> bool;

	/// Reads an inline style declaration; empty when unset.
	fn style(&self, name: &str) -> String;

	/// Direct inline style assignment (`node.style[name] = value`).
	fn set_style(&self, name: &str, value: &str);

	/// Custom property assignment (`node.style.setProperty(name, value)`).
	fn set_style_property(&self, name: &str, value: &str);

	/// Attaches `listener` for `event`.
	fn add_event_listener(&self, event: &str, listener: &Listener);

	/// Detaches a listener previously attached with the same identity.
	fn remove_event_listener(&self, event: &str, listener: &Listener);

	/// Whether the node is still attached to its document.
	fn is_connected(&self) -> bool;
}

/// Shared handle to a DOM node.
///
/// Equality is node identity, so two handles obtained through different
/// queries compare equal when they reach the same element.
#[derive(Clone)]
pub struct Node(Rc<dyn DomNode>);

impl Node {
	/// Wraps a backend node.
	pub fn new(node: impl DomNode) -> Self {
		Self(Rc::new(node))
	}

	/// Returns the backend node if it is a `T`.
	pub fn downcast_ref<T: DomNode>(&self) -> Option<&T> {
		self.0.as_any().downcast_ref::<T>()
	}
}

impl Deref for Node {
	type Target = dyn DomNode;

	fn deref(&self) -> &Self::Target {
		&*self.0
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0) || self.0.is_same_node(&*other.0)
	}
}

impl Eq for Node {}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}
