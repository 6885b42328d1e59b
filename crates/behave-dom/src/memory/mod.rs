//! In-memory document backend.
//!
//! Nodes live in an arena owned by the document; [`MemoryNode`] handles hold
//! the document and an index. Every call the reconciliation engine makes
//! through [`DomNode`] is appended to a mutation log, so a pass that changes
//! nothing leaves the log untouched.
//!
//! ```
//! use behave_dom::{DomNode, MemoryDocument, Mutation, element};
//!
//! let doc = MemoryDocument::new();
//! let node = doc.append_to_body(element("div").attr("data-behavior", "Toggle"));
//!
//! node.add_class("is-on");
//! assert!(node.has_class("is-on"));
//! assert_eq!(doc.mutation_count(), 1);
//! assert!(matches!(doc.take_mutations()[0], Mutation::AddClass { .. }));
//! ```

mod builder;

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::event::{Event, Listener};
use crate::node::{DomNode, Node};

pub use builder::{ElementBuilder, element};

/// Index of a node inside its [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// The `<body>` node every document starts with.
	pub const BODY: NodeId = NodeId(0);

	/// Arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

/// One recorded call made through [`DomNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
	/// `node[name] = value`
	SetProperty {
		/// Target node.
		node: NodeId,
		/// Property name.
		name: String,
		/// Assigned value.
		value: Value,
	},
	/// `classList.add(class)`
	AddClass {
		/// Target node.
		node: NodeId,
		/// Class name.
		class: String,
	},
	/// `classList.remove(class)`
	RemoveClass {
		/// Target node.
		node: NodeId,
		/// Class name.
		class: String,
	},
	/// `style[name] = value`
	SetStyle {
		/// Target node.
		node: NodeId,
		/// Style property.
		name: String,
		/// Assigned value, empty for removal.
		value: String,
	},
	/// `style.setProperty(name, value)`
	SetStyleProperty {
		/// Target node.
		node: NodeId,
		/// Custom property name, including the leading `--`.
		name: String,
		/// Assigned value, empty for removal.
		value: String,
	},
	/// `addEventListener(event, listener)`
	AddListener {
		/// Target node.
		node: NodeId,
		/// Event name.
		event: String,
		/// [`Listener::id`] of the attached listener.
		listener: usize,
	},
	/// `removeEventListener(event, listener)`
	RemoveListener {
		/// Target node.
		node: NodeId,
		/// Event name.
		event: String,
		/// [`Listener::id`] of the detached listener.
		listener: usize,
	},
}

impl Mutation {
	/// The node the call targeted.
	pub fn node(&self) -> NodeId {
		match self {
			Self::SetProperty { node, .. }
			| Self::AddClass { node, .. }
			| Self::RemoveClass { node, .. }
			| Self::SetStyle { node, .. }
			| Self::SetStyleProperty { node, .. }
			| Self::AddListener { node, .. }
			| Self::RemoveListener { node, .. } => *node,
		}
	}
}

#[derive(Debug, Default)]
struct NodeData {
	tag: String,
	attributes: Vec<(String, String)>,
	classes: Vec<String>,
	properties: BTreeMap<String, Value>,
	style: BTreeMap<String, String>,
	text: String,
	listeners: Vec<(String, Listener)>,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct DocumentData {
	nodes: Vec<NodeData>,
	mutations: Vec<Mutation>,
}

impl DocumentData {
	fn node(&self, id: NodeId) -> &NodeData {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
		&mut self.nodes[id.0]
	}

	fn insert(&mut self, parent: NodeId, builder: ElementBuilder) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData {
			tag: builder.tag,
			attributes: builder.attributes,
			classes: builder.classes,
			properties: builder.properties,
			style: builder.style,
			text: builder.text,
			listeners: Vec::new(),
			parent: Some(parent),
			children: Vec::new(),
		});
		self.node_mut(parent).children.push(id);
		for child in builder.children {
			self.insert(id, child);
		}
		id
	}

	fn detach(&mut self, id: NodeId) {
		if let Some(parent) = self.node_mut(id).parent.take() {
			self.node_mut(parent).children.retain(|child| *child != id);
		}
	}

	fn collect_with_attribute(&self, id: NodeId, attribute: &str, out: &mut Vec<NodeId>) {
		for child in &self.node(id).children {
			if self.node(*child).attributes.iter().any(|(name, _)| name == attribute) {
				out.push(*child);
			}
			self.collect_with_attribute(*child, attribute, out);
		}
	}

	fn text_content(&self, id: NodeId, out: &mut String) {
		let node = self.node(id);
		out.push_str(&node.text);
		for child in &node.children {
			self.text_content(*child, out);
		}
	}

	fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
		let node = self.node(id);
		if name == "class" {
			return (!node.classes.is_empty()).then(|| node.classes.join(" "));
		}
		node.attributes
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, value)| value.clone())
	}

	fn write_property(&mut self, id: NodeId, name: &str, value: &Value) {
		match name {
			"textContent" => {
				let children = std::mem::take(&mut self.node_mut(id).children);
				for child in children {
					self.node_mut(child).parent = None;
				}
				self.node_mut(id).text = display_value(value);
			}
			"className" => {
				self.node_mut(id).classes = display_value(value)
					.split_whitespace()
					.map(str::to_string)
					.collect();
			}
			_ => {
				self.node_mut(id)
					.properties
					.insert(name.to_string(), value.clone());
			}
		}
	}

	fn read_property(&self, id: NodeId, name: &str) -> Value {
		let node = self.node(id);
		if let Some(value) = node.properties.get(name) {
			return value.clone();
		}
		match name {
			"textContent" => {
				let mut text = String::new();
				self.text_content(id, &mut text);
				Value::String(text)
			}
			"className" => Value::String(node.classes.join(" ")),
			"tagName" => Value::String(node.tag.to_ascii_uppercase()),
			"checked" | "disabled" | "selected" | "hidden" | "required" | "readOnly" => {
				Value::Bool(self.attribute(id, &name.to_ascii_lowercase()).is_some())
			}
			"value" => Value::String(self.attribute(id, "value").unwrap_or_default()),
			_ => self
				.attribute(id, &name.to_ascii_lowercase())
				.map_or(Value::Null, Value::String),
		}
	}

	fn write_html(&self, id: NodeId, out: &mut String) {
		let node = self.node(id);
		out.push('<');
		out.push_str(&node.tag);
		if !node.classes.is_empty() {
			out.push_str(" class=\"");
			out.push_str(&html_escape(&node.classes.join(" ")));
			out.push('"');
		}
		if !node.style.is_empty() {
			let declarations: Vec<String> = node
				.style
				.iter()
				.map(|(name, value)| format!("{}: {}", name, value))
				.collect();
			out.push_str(" style=\"");
			out.push_str(&html_escape(&declarations.join("; ")));
			out.push('"');
		}
		for (name, value) in &node.attributes {
			out.push(' ');
			out.push_str(name);
			if !value.is_empty() {
				out.push_str("=\"");
				out.push_str(&html_escape(value));
				out.push('"');
			}
		}
		if is_void(&node.tag) {
			out.push_str(" />");
			return;
		}
		out.push('>');
		out.push_str(&html_escape(&node.text));
		for child in &node.children {
			self.write_html(*child, out);
		}
		out.push_str("</");
		out.push_str(&node.tag);
		out.push('>');
	}
}

/// An in-memory document with a mutation log.
///
/// Cloning yields another handle to the same document.
#[derive(Clone)]
pub struct MemoryDocument {
	data: Rc<RefCell<DocumentData>>,
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for MemoryDocument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.data.borrow();
		f.debug_struct("MemoryDocument")
			.field("nodes", &data.nodes.len())
			.field("mutations", &data.mutations.len())
			.finish()
	}
}

impl MemoryDocument {
	/// Creates a document containing an empty `<body>`.
	pub fn new() -> Self {
		let data = DocumentData {
			nodes: vec![NodeData {
				tag: "body".to_string(),
				..NodeData::default()
			}],
			mutations: Vec::new(),
		};
		Self {
			data: Rc::new(RefCell::new(data)),
		}
	}

	/// Handle to `<body>`.
	pub fn body(&self) -> Node {
		self.node(NodeId::BODY)
	}

	/// Handle to the node with `id`.
	///
	/// # Panics
	///
	/// Panics when `id` does not belong to this document.
	pub fn node(&self, id: NodeId) -> Node {
		assert!(
			id.0 < self.data.borrow().nodes.len(),
			"node {:?} does not belong to this document",
			id
		);
		Node::new(MemoryNode {
			data: Rc::clone(&self.data),
			id,
		})
	}

	/// Arena id of `node`, if it belongs to this document.
	pub fn id_of(&self, node: &Node) -> Option<NodeId> {
		node.downcast_ref::<MemoryNode>()
			.filter(|memory| Rc::ptr_eq(&memory.data, &self.data))
			.map(|memory| memory.id)
	}

	/// Mounts `builder` as the last child of `<body>`.
	pub fn append_to_body(&self, builder: ElementBuilder) -> Node {
		let id = self.data.borrow_mut().insert(NodeId::BODY, builder);
		self.node(id)
	}

	/// Mounts `builder` as the last child of `parent`.
	///
	/// Returns `None` when `parent` belongs to another document.
	pub fn append(&self, parent: &Node, builder: ElementBuilder) -> Option<Node> {
		let parent = self.id_of(parent)?;
		let id = self.data.borrow_mut().insert(parent, builder);
		Some(self.node(id))
	}

	/// Detaches `node` (and its subtree) from its parent.
	///
	/// Returns false when the node was already detached or belongs elsewhere.
	pub fn remove(&self, node: &Node) -> bool {
		let Some(id) = self.id_of(node) else {
			return false;
		};
		if id == NodeId::BODY {
			return false;
		}
		let mut data = self.data.borrow_mut();
		let attached = data.node(id).parent.is_some();
		data.detach(id);
		attached
	}

	/// Sets or replaces an HTML attribute. Not logged.
	pub fn set_attribute(&self, node: &Node, name: &str, value: impl Into<String>) {
		let Some(id) = self.id_of(node) else {
			return;
		};
		let name = name.to_ascii_lowercase();
		let value = value.into();
		let mut data = self.data.borrow_mut();
		if name == "class" {
			data.node_mut(id).classes = value.split_whitespace().map(str::to_string).collect();
			return;
		}
		let attributes = &mut data.node_mut(id).attributes;
		match attributes.iter_mut().find(|(n, _)| *n == name) {
			Some(slot) => slot.1 = value,
			None => attributes.push((name, value)),
		}
	}

	/// Writes a property the way the browser does on user input (typing,
	/// toggling a checkbox). Not logged, since no script made the call.
	pub fn set_field(&self, node: &Node, name: &str, value: Value) {
		if let Some(id) = self.id_of(node) {
			self.data.borrow_mut().write_property(id, name, &value);
		}
	}

	/// Fires `kind` at `node` and returns the delivered event.
	///
	/// Listeners run in attachment order on the target only; there is no
	/// capture or bubbling phase.
	pub fn dispatch(&self, node: &Node, kind: &str) -> Event {
		self.dispatch_event(Event::new(kind, node.clone()))
	}

	/// Delivers a prepared event to its current target.
	pub fn dispatch_event(&self, event: Event) -> Event {
		let listeners: Vec<Listener> = match self.id_of(event.current_target()) {
			Some(id) => self
				.data
				.borrow()
				.node(id)
				.listeners
				.iter()
				.filter(|(name, _)| name == event.kind())
				.map(|(_, listener)| listener.clone())
				.collect(),
			None => Vec::new(),
		};
		tracing::trace!(event = event.kind(), listeners = listeners.len(), "dispatch");
		for listener in listeners {
			listener.call(&event);
		}
		event
	}

	/// Number of listeners attached to `node` for `event`.
	pub fn listener_count(&self, node: &Node, event: &str) -> usize {
		self.id_of(node).map_or(0, |id| {
			self.data
				.borrow()
				.node(id)
				.listeners
				.iter()
				.filter(|(name, _)| name == event)
				.count()
		})
	}

	/// Serializes `node` and its subtree.
	pub fn outer_html(&self, node: &Node) -> String {
		let mut out = String::new();
		if let Some(id) = self.id_of(node) {
			self.data.borrow().write_html(id, &mut out);
		}
		out
	}

	/// Copy of the mutation log.
	pub fn mutations(&self) -> Vec<Mutation> {
		self.data.borrow().mutations.clone()
	}

	/// Drains the mutation log.
	pub fn take_mutations(&self) -> Vec<Mutation> {
		std::mem::take(&mut self.data.borrow_mut().mutations)
	}

	/// Clears the mutation log.
	pub fn clear_mutations(&self) {
		self.data.borrow_mut().mutations.clear();
	}

	/// Number of logged mutations.
	pub fn mutation_count(&self) -> usize {
		self.data.borrow().mutations.len()
	}
}

/// Handle onto one node of a [`MemoryDocument`].
pub struct MemoryNode {
	data: Rc<RefCell<DocumentData>>,
	id: NodeId,
}

impl MemoryNode {
	/// Arena id.
	pub fn id(&self) -> NodeId {
		self.id
	}

	fn record(&self, mutation: Mutation) {
		tracing::trace!(?mutation, "memory dom");
		self.data.borrow_mut().mutations.push(mutation);
	}
}

impl fmt::Debug for MemoryNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.data.borrow();
		write!(f, "<{} #{}>", data.node(self.id).tag, self.id.0)
	}
}

impl DomNode for MemoryNode {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn is_same_node(&self, other: &dyn DomNode) -> bool {
		other
			.as_any()
			.downcast_ref::<MemoryNode>()
			.is_some_and(|other| Rc::ptr_eq(&self.data, &other.data) && self.id == other.id)
	}

	fn tag_name(&self) -> String {
		self.data.borrow().node(self.id).tag.clone()
	}

	fn get_attribute(&self, name: &str) -> Option<String> {
		self.data.borrow().attribute(self.id, name)
	}

	fn descendants_with_attribute(&self, attribute: &str) -> Vec<Node> {
		let mut ids = Vec::new();
		self.data
			.borrow()
			.collect_with_attribute(self.id, attribute, &mut ids);
		ids.into_iter()
			.map(|id| {
				Node::new(MemoryNode {
					data: Rc::clone(&self.data),
					id,
				})
			})
			.collect()
	}

	fn property(&self, name: &str) -> Value {
		self.data.borrow().read_property(self.id, name)
	}

	fn set_property(&self, name: &str, value: &Value) {
		self.data.borrow_mut().write_property(self.id, name, value);
		self.record(Mutation::SetProperty {
			node: self.id,
			name: name.to_string(),
			value: value.clone(),
		});
	}

	fn add_class(&self, class: &str) {
		{
			let mut data = self.data.borrow_mut();
			let classes = &mut data.node_mut(self.id).classes;
			if !classes.iter().any(|c| c == class) {
				classes.push(class.to_string());
			}
		}
		self.record(Mutation::AddClass {
			node: self.id,
			class: class.to_string(),
		});
	}

	fn remove_class(&self, class: &str) {
		self.data
			.borrow_mut()
			.node_mut(self.id)
			.classes
			.retain(|c| c != class);
		self.record(Mutation::RemoveClass {
			node: self.id,
			class: class.to_string(),
		});
	}

	fn has_class(&self, class: &str) -> bool {
		self.data
			.borrow()
			.node(self.id)
			.classes
			.iter()
			.any(|c| c == class)
	}

	fn style(&self, name: &str) -> String {
		self.data
			.borrow()
			.node(self.id)
			.style
			.get(name)
			.cloned()
			.unwrap_or_default()
	}

	fn set_style(&self, name: &str, value: &str) {
		write_style(&mut self.data.borrow_mut(), self.id, name, value);
		self.record(Mutation::SetStyle {
			node: self.id,
			name: name.to_string(),
			value: value.to_string(),
		});
	}

	fn set_style_property(&self, name: &str, value: &str) {
		write_style(&mut self.data.borrow_mut(), self.id, name, value);
		self.record(Mutation::SetStyleProperty {
			node: self.id,
			name: name.to_string(),
			value: value.to_string(),
		});
	}

	fn add_event_listener(&self, event: &str, listener: &Listener) {
		{
			let mut data = self.data.borrow_mut();
			let listeners = &mut data.node_mut(self.id).listeners;
			if !listeners.iter().any(|(name, l)| name == event && l == listener) {
				listeners.push((event.to_string(), listener.clone()));
			}
		}
		self.record(Mutation::AddListener {
			node: self.id,
			event: event.to_string(),
			listener: listener.id(),
		});
	}

	fn remove_event_listener(&self, event: &str, listener: &Listener) {
		self.data
			.borrow_mut()
			.node_mut(self.id)
			.listeners
			.retain(|(name, l)| !(name == event && l == listener));
		self.record(Mutation::RemoveListener {
			node: self.id,
			event: event.to_string(),
			listener: listener.id(),
		});
	}

	fn is_connected(&self) -> bool {
		let data = self.data.borrow();
		let mut current = self.id;
		loop {
			if current == NodeId::BODY {
				return true;
			}
			match data.node(current).parent {
				Some(parent) => current = parent,
				None => return false,
			}
		}
	}
}

fn write_style(data: &mut DocumentData, id: NodeId, name: &str, value: &str) {
	let style = &mut data.node_mut(id).style;
	if value.is_empty() {
		style.remove(name);
	} else {
		style.insert(name.to_string(), value.to_string());
	}
}

/// String coercion used for `textContent` and `className` writes.
fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

fn is_void(tag: &str) -> bool {
	matches!(
		tag,
		"area"
			| "base" | "br"
			| "col" | "embed"
			| "hr" | "img"
			| "input" | "link"
			| "meta" | "source"
			| "track" | "wbr"
	)
}

fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::cell::Cell;

	#[fixture]
	fn doc() -> MemoryDocument {
		MemoryDocument::new()
	}

	#[rstest]
	fn test_descendants_with_attribute_in_document_order(doc: MemoryDocument) {
		let root = doc.append_to_body(
			element("div")
				.attr("data-behavior", "Group")
				.child(element("input").attr("data-group-input", "").attr("value", "a"))
				.child(
					element("div")
						.child(element("input").attr("data-group-input", "").attr("value", "b")),
				)
				.child(element("span")),
		);

		let inputs = root.descendants_with_attribute("data-group-input");

		assert_eq!(inputs.len(), 2);
		assert_eq!(inputs[0].property("value"), json!("a"));
		assert_eq!(inputs[1].property("value"), json!("b"));
		assert!(root.descendants_with_attribute("data-behavior").is_empty());
	}

	#[rstest]
	fn test_handles_to_same_node_are_equal(doc: MemoryDocument) {
		let root = doc.append_to_body(element("div").child(element("p").flag("data-x")));
		let first = root.descendants_with_attribute("data-x");
		let second = root.descendants_with_attribute("data-x");

		assert_eq!(first[0], second[0]);
		assert_ne!(first[0], root);
	}

	#[rstest]
	fn test_every_dom_call_is_logged(doc: MemoryDocument) {
		let node = doc.append_to_body(element("div"));
		let listener = Listener::new(|_| {});

		node.set_property("hidden", &json!(true));
		node.add_class("a");
		node.add_class("a");
		node.remove_class("a");
		node.set_style("display", "none");
		node.set_style_property("--gap", "4px");
		node.add_event_listener("click", &listener);
		node.remove_event_listener("click", &listener);

		assert_eq!(doc.mutation_count(), 8);
		assert!(doc.mutations().iter().all(|m| Some(m.node()) == doc.id_of(&node)));
	}

	#[rstest]
	fn test_set_field_is_not_logged(doc: MemoryDocument) {
		let input = doc.append_to_body(element("input").attr("type", "checkbox"));

		doc.set_field(&input, "checked", json!(true));

		assert_eq!(input.property("checked"), json!(true));
		assert_eq!(doc.mutation_count(), 0);
	}

	#[rstest]
	fn test_text_content_replaces_children(doc: MemoryDocument) {
		let label = doc.append_to_body(element("label").child(element("b").text("old")));
		assert_eq!(label.property("textContent"), json!("old"));

		label.set_property("textContent", &json!("new"));

		assert_eq!(doc.outer_html(&label), "<label>new</label>");
	}

	#[rstest]
	fn test_style_removal_with_empty_value(doc: MemoryDocument) {
		let node = doc.append_to_body(element("div"));

		node.set_style("display", "none");
		assert_eq!(node.style("display"), "none");

		node.set_style("display", "");
		assert_eq!(node.style("display"), "");
		assert_eq!(doc.outer_html(&node), "<div></div>");
	}

	#[rstest]
	fn test_dispatch_runs_listeners_for_matching_event(doc: MemoryDocument) {
		let button = doc.append_to_body(element("button"));
		let clicks = Rc::new(Cell::new(0));
		let counter = Rc::clone(&clicks);
		let listener = Listener::new(move |event| {
			counter.set(counter.get() + 1);
			event.prevent_default();
		});
		button.add_event_listener("click", &listener);
		button.add_event_listener("click", &listener);

		let event = doc.dispatch(&button, "click");
		doc.dispatch(&button, "blur");

		assert_eq!(clicks.get(), 1);
		assert!(event.default_prevented());
		assert_eq!(doc.listener_count(&button, "click"), 1);
	}

	#[rstest]
	fn test_remove_disconnects_subtree(doc: MemoryDocument) {
		let outer = doc.append_to_body(element("section").child(element("div").flag("data-inner")));
		let inner = outer.descendants_with_attribute("data-inner").remove(0);
		assert!(inner.is_connected());

		assert!(doc.remove(&outer));

		assert!(!outer.is_connected());
		assert!(!inner.is_connected());
		assert!(!doc.remove(&outer));
	}

	#[rstest]
	fn test_outer_html_serializes_subtree(doc: MemoryDocument) {
		let node = doc.append_to_body(
			element("div")
				.attr("class", "a b")
				.attr("data-behavior", "Toggle")
				.child(element("input").flag("checked")),
		);

		assert_eq!(
			doc.outer_html(&node),
			"<div class=\"a b\" data-behavior=\"Toggle\"><input checked /></div>"
		);
	}

	#[rstest]
	#[case("checked", json!(true))]
	#[case("value", json!("on"))]
	#[case("tagName", json!("INPUT"))]
	#[case("data-missing", Value::Null)]
	fn test_property_reads_reflect_attributes(doc: MemoryDocument, #[case] name: &str, #[case] expected: Value) {
		let input = doc.append_to_body(element("input").flag("checked").attr("value", "on"));

		assert_eq!(input.property(name), expected);
	}
}
