//! Render descriptions: what the DOM should look like, as functions of the
//! owning behavior.
//!
//! A description is built once per behavior definition and evaluated on every
//! reconciliation pass. Every entry is a function of the owner and, for
//! child-scoped entries, of the child node, so nothing in here holds state.
//!
//! ```ignore
//! use behave_core::prelude::*;
//! use serde_json::json;
//!
//! let render = RenderDescription::new()
//!     .attributes(Attributes::new().class("is-on", |this, _| this.state().bool("isOn")))
//!     .listeners(Listeners::new().on("click", |this, _| this.handler("toggle")))
//!     .child(
//!         "label",
//!         ChildDescription::new().attributes(Attributes::new().property("textContent", |this, _| {
//!             json!(if this.state().bool("isOn") { "On" } else { "Off" })
//!         })),
//!     );
//! ```

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use behave_dom::{Listener, Node};
use serde_json::Value;

use crate::behavior::Behavior;
use crate::props::PropValue;

/// Computes a property or style value.
pub type ValueFn = Rc<dyn Fn(&Behavior, Option<&Node>) -> Value>;
/// Computes classList membership.
pub type ClassFn = Rc<dyn Fn(&Behavior, Option<&Node>) -> bool>;
/// Computes the listener for an event; `None` means no listener this pass.
pub type ListenerFn = Rc<dyn Fn(&Behavior, Option<&Node>) -> Option<Listener>>;
/// Computes one prop forwarded to a child behavior.
pub type PropFn = Rc<dyn Fn(&Behavior, Option<&Node>) -> PropValue>;
/// Computes a child description for one node of a group.
pub type TemplateFn = Rc<dyn Fn(&Behavior, &Node) -> ChildDescription>;

/// Attribute-like state of a node: classes, inline styles and properties.
#[derive(Clone, Default)]
pub struct Attributes {
	pub(crate) class_list: Vec<(String, ClassFn)>,
	pub(crate) style: Vec<(String, ValueFn)>,
	pub(crate) properties: Vec<(String, ValueFn)>,
}

impl Attributes {
	/// Empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Toggles `class` according to `predicate`.
	pub fn class<F>(mut self, class: impl Into<String>, predicate: F) -> Self
	where
		F: Fn(&Behavior, Option<&Node>) -> bool + 'static,
	{
		self.class_list.push((class.into(), Rc::new(predicate)));
		self
	}

	/// Sets inline style `name`. A `null` result removes the declaration;
	/// names starting with `--` are custom properties.
	pub fn style<F>(mut self, name: impl Into<String>, compute: F) -> Self
	where
		F: Fn(&Behavior, Option<&Node>) -> Value + 'static,
	{
		self.style.push((name.into(), Rc::new(compute)));
		self
	}

	/// Assigns DOM property `name` (`node[name] = value`).
	pub fn property<F>(mut self, name: impl Into<String>, compute: F) -> Self
	where
		F: Fn(&Behavior, Option<&Node>) -> Value + 'static,
	{
		self.properties.push((name.into(), Rc::new(compute)));
		self
	}

	/// Whether nothing is declared.
	pub fn is_empty(&self) -> bool {
		self.class_list.is_empty() && self.style.is_empty() && self.properties.is_empty()
	}
}

impl fmt::Debug for Attributes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Attributes")
			.field("class_list", &names(&self.class_list))
			.field("style", &names(&self.style))
			.field("properties", &names(&self.properties))
			.finish()
	}
}

/// Event listeners of a node, keyed by event name.
#[derive(Clone, Default)]
pub struct Listeners {
	pub(crate) entries: Vec<(String, ListenerFn)>,
}

impl Listeners {
	/// Empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares the listener for `event`.
	pub fn on<F>(mut self, event: impl Into<String>, produce: F) -> Self
	where
		F: Fn(&Behavior, Option<&Node>) -> Option<Listener> + 'static,
	{
		self.entries.push((event.into(), Rc::new(produce)));
		self
	}

	/// Whether nothing is declared.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl fmt::Debug for Listeners {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Listeners").field(&names(&self.entries)).finish()
	}
}

/// What a parent declares for one child node: props for the child's behavior
/// plus attributes and listeners the parent applies to the node itself.
#[derive(Clone, Default)]
pub struct ChildDescription {
	pub(crate) props: Vec<(String, PropFn)>,
	pub(crate) attributes: Option<Attributes>,
	pub(crate) listeners: Option<Listeners>,
}

impl ChildDescription {
	/// Empty description (the child is only discovered and instantiated).
	pub fn new() -> Self {
		Self::default()
	}

	/// Forwards prop `name` to the child behavior.
	pub fn prop<F>(mut self, name: impl Into<String>, compute: F) -> Self
	where
		F: Fn(&Behavior, Option<&Node>) -> PropValue + 'static,
	{
		self.props.push((name.into(), Rc::new(compute)));
		self
	}

	/// Attributes applied to the child node.
	pub fn attributes(mut self, attributes: Attributes) -> Self {
		self.attributes = Some(attributes);
		self
	}

	/// Listeners attached to the child node.
	pub fn listeners(mut self, listeners: Listeners) -> Self {
		self.listeners = Some(listeners);
		self
	}

	/// The declared prop functions, in declaration order.
	pub fn prop_fns(&self) -> &[(String, PropFn)] {
		&self.props
	}
}

impl fmt::Debug for ChildDescription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChildDescription")
			.field("props", &names(&self.props))
			.field("attributes", &self.attributes)
			.field("listeners", &self.listeners)
			.finish()
	}
}

/// How many nodes a child group binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
	/// Exactly one node; its absence is an error.
	One,
	/// Any number of nodes, including none.
	Many,
}

/// The description applied to each node of a group.
#[derive(Clone)]
pub enum ChildTemplate {
	/// Same description for every node.
	Fixed(ChildDescription),
	/// Description computed per node, once per pass.
	PerNode(TemplateFn),
}

impl ChildTemplate {
	pub(crate) fn resolve(&self, owner: &Behavior, node: &Node) -> Cow<'_, ChildDescription> {
		match self {
			Self::Fixed(description) => Cow::Borrowed(description),
			Self::PerNode(template) => Cow::Owned(template(owner, node)),
		}
	}
}

impl fmt::Debug for ChildTemplate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fixed(description) => f.debug_tuple("Fixed").field(description).finish(),
			Self::PerNode(_) => f.debug_tuple("PerNode").field(&"<fn>").finish(),
		}
	}
}

/// A named set of descendant nodes found through `data-<behavior>-<name>`.
#[derive(Debug, Clone)]
pub struct ChildGroup {
	pub(crate) name: String,
	pub(crate) cardinality: Cardinality,
	pub(crate) template: ChildTemplate,
}

impl ChildGroup {
	/// Group name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Group cardinality.
	pub fn cardinality(&self) -> Cardinality {
		self.cardinality
	}
}

/// The full description of a behavior's node and its children.
#[derive(Debug, Clone, Default)]
pub struct RenderDescription {
	pub(crate) attributes: Attributes,
	pub(crate) listeners: Listeners,
	pub(crate) children: Vec<ChildGroup>,
}

impl RenderDescription {
	/// Empty description.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attributes of the behavior's own node.
	pub fn attributes(mut self, attributes: Attributes) -> Self {
		self.attributes = attributes;
		self
	}

	/// Listeners of the behavior's own node.
	pub fn listeners(mut self, listeners: Listeners) -> Self {
		self.listeners = listeners;
		self
	}

	/// Declares a single child.
	pub fn child(self, name: impl Into<String>, description: ChildDescription) -> Self {
		self.group(name, Cardinality::One, ChildTemplate::Fixed(description))
	}

	/// Declares a single child whose description depends on its node.
	pub fn child_with<F>(self, name: impl Into<String>, template: F) -> Self
	where
		F: Fn(&Behavior, &Node) -> ChildDescription + 'static,
	{
		self.group(name, Cardinality::One, ChildTemplate::PerNode(Rc::new(template)))
	}

	/// Declares a list of children sharing one description.
	pub fn children(self, name: impl Into<String>, description: ChildDescription) -> Self {
		self.group(name, Cardinality::Many, ChildTemplate::Fixed(description))
	}

	/// Declares a list of children with a per-node description.
	pub fn children_with<F>(self, name: impl Into<String>, template: F) -> Self
	where
		F: Fn(&Behavior, &Node) -> ChildDescription + 'static,
	{
		self.group(name, Cardinality::Many, ChildTemplate::PerNode(Rc::new(template)))
	}

	fn group(mut self, name: impl Into<String>, cardinality: Cardinality, template: ChildTemplate) -> Self {
		let name = name.into();
		self.children.retain(|group| group.name != name);
		self.children.push(ChildGroup {
			name,
			cardinality,
			template,
		});
		self
	}

	/// Declared child groups, in declaration order.
	pub fn groups(&self) -> &[ChildGroup] {
		&self.children
	}
}

fn names<T>(entries: &[(String, T)]) -> Vec<&str> {
	entries.iter().map(|(name, _)| name.as_str()).collect()
}
