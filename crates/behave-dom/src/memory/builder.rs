//! Element builder for [`MemoryDocument`](super::MemoryDocument) fixtures.

use std::collections::BTreeMap;

use serde_json::Value;

/// Describes an element subtree to mount into a memory document.
///
/// Mirrors server-rendered markup: attributes, classes, text and children.
/// Properties can be preset to model browser state that has no attribute,
/// such as a checkbox already toggled by the user.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
	pub(super) tag: String,
	pub(super) attributes: Vec<(String, String)>,
	pub(super) classes: Vec<String>,
	pub(super) properties: BTreeMap<String, Value>,
	pub(super) style: BTreeMap<String, String>,
	pub(super) text: String,
	pub(super) children: Vec<ElementBuilder>,
}

/// Starts an element builder.
pub fn element(tag: impl Into<String>) -> ElementBuilder {
	ElementBuilder::new(tag)
}

impl ElementBuilder {
	/// Creates a builder for `tag`.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into().to_ascii_lowercase(),
			attributes: Vec::new(),
			classes: Vec::new(),
			properties: BTreeMap::new(),
			style: BTreeMap::new(),
			text: String::new(),
			children: Vec::new(),
		}
	}

	/// Adds an attribute. Names are lowercased; `class` is split into the
	/// class list.
	pub fn attr(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		let name = name.as_ref().to_ascii_lowercase();
		let value = value.into();
		if name == "class" {
			for class in value.split_whitespace() {
				self = self.class(class);
			}
			return self;
		}
		match self.attributes.iter_mut().find(|(n, _)| *n == name) {
			Some(slot) => slot.1 = value,
			None => self.attributes.push((name, value)),
		}
		self
	}

	/// Adds a valueless attribute such as `checked` or `data-foo`.
	pub fn flag(self, name: impl AsRef<str>) -> Self {
		self.attr(name, "")
	}

	/// Adds one class.
	pub fn class(mut self, class: impl Into<String>) -> Self {
		let class = class.into();
		if !self.classes.contains(&class) {
			self.classes.push(class);
		}
		self
	}

	/// Presets a DOM property.
	pub fn property(mut self, name: impl Into<String>, value: Value) -> Self {
		self.properties.insert(name.into(), value);
		self
	}

	/// Presets an inline style declaration.
	pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.style.insert(name.into(), value.into());
		self
	}

	/// Sets the element's own text.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = text.into();
		self
	}

	/// Appends a child element.
	pub fn child(mut self, child: ElementBuilder) -> Self {
		self.children.push(child);
		self
	}

	/// Appends several child elements.
	pub fn children(mut self, children: impl IntoIterator<Item = ElementBuilder>) -> Self {
		self.children.extend(children);
		self
	}
}
