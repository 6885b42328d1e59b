//! Browser backend over `web_sys::Element` (wasm32 only).
//!
//! Listeners need a JS function to attach and the *same* JS function to
//! detach, so every attached [`Listener`] is wrapped in a `Closure` that is kept
//! alive in a per-thread table until it is removed again.

use std::any::Any;
use std::cell::RefCell;

use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, HtmlElement};

use crate::event::{Event, Listener};
use crate::node::{DomNode, Node};

struct Attached {
	element: Element,
	event: String,
	listener: usize,
	closure: Closure<dyn FnMut(web_sys::Event)>,
}

thread_local! {
	static ATTACHED: RefCell<Vec<Attached>> = const { RefCell::new(Vec::new()) };
}

/// Handle onto a live browser element.
#[derive(Debug, Clone)]
pub struct WebNode {
	element: Element,
}

impl WebNode {
	/// Wraps an element.
	pub fn new(element: Element) -> Self {
		Self { element }
	}

	/// The wrapped element.
	pub fn element(&self) -> &Element {
		&self.element
	}

	fn style_declaration(&self) -> Option<web_sys::CssStyleDeclaration> {
		self.element
			.dyn_ref::<HtmlElement>()
			.map(HtmlElement::style)
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Node::new(WebNode::new(element))
	}
}

impl DomNode for WebNode {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn is_same_node(&self, other: &dyn DomNode) -> bool {
		other
			.as_any()
			.downcast_ref::<WebNode>()
			.is_some_and(|other| other.element == self.element)
	}

	fn tag_name(&self) -> String {
		self.element.tag_name().to_ascii_lowercase()
	}

	fn get_attribute(&self, name: &str) -> Option<String> {
		self.element.get_attribute(name)
	}

	fn has_attribute(&self, name: &str) -> bool {
		self.element.has_attribute(name)
	}

	fn descendants_with_attribute(&self, attribute: &str) -> Vec<Node> {
		let list = match self.element.query_selector_all(&format!("[{}]", attribute)) {
			Ok(list) => list,
			Err(err) => {
				warn(&format!("query for [{}] failed: {:?}", attribute, err));
				return Vec::new();
			}
		};
		(0..list.length())
			.filter_map(|i| list.item(i))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.map(Node::from)
			.collect()
	}

	fn property(&self, name: &str) -> Value {
		match js_sys::Reflect::get(&self.element, &JsValue::from_str(name)) {
			Ok(value) => from_js(&value),
			Err(_) => Value::Null,
		}
	}

	fn set_property(&self, name: &str, value: &Value) {
		if let Err(err) = js_sys::Reflect::set(&self.element, &JsValue::from_str(name), &to_js(value)) {
			warn(&format!("setting property {} failed: {:?}", name, err));
		}
	}

	fn add_class(&self, class: &str) {
		if let Err(err) = self.element.class_list().add_1(class) {
			warn(&format!("classList.add({}) failed: {:?}", class, err));
		}
	}

	fn remove_class(&self, class: &str) {
		if let Err(err) = self.element.class_list().remove_1(class) {
			warn(&format!("classList.remove({}) failed: {:?}", class, err));
		}
	}

	fn has_class(&self, class: &str) -> bool {
		self.element.class_list().contains(class)
	}

	fn style(&self, name: &str) -> String {
		self.style_declaration()
			.and_then(|style| {
				if name.starts_with("--") {
					style.get_property_value(name).ok()
				} else {
					js_sys::Reflect::get(&style, &JsValue::from_str(name))
						.ok()
						.and_then(|value| value.as_string())
				}
			})
			.unwrap_or_default()
	}

	fn set_style(&self, name: &str, value: &str) {
		let Some(style) = self.style_declaration() else {
			return;
		};
		if let Err(err) = js_sys::Reflect::set(&style, &JsValue::from_str(name), &JsValue::from_str(value)) {
			warn(&format!("style.{} assignment failed: {:?}", name, err));
		}
	}

	fn set_style_property(&self, name: &str, value: &str) {
		let Some(style) = self.style_declaration() else {
			return;
		};
		if let Err(err) = style.set_property(name, value) {
			warn(&format!("style.setProperty({}) failed: {:?}", name, err));
		}
	}

	fn add_event_listener(&self, event: &str, listener: &Listener) {
		let already = ATTACHED.with(|attached| {
			attached.borrow().iter().any(|entry| {
				entry.element == self.element && entry.event == event && entry.listener == listener.id()
			})
		});
		if already {
			return;
		}

		let handler = listener.clone();
		let current = self.element.clone();
		let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |raw: web_sys::Event| {
			let mut event = Event::new(raw.type_(), Node::from(current.clone()));
			if let Some(target) = raw.target().and_then(|t| t.dyn_into::<Element>().ok()) {
				event = event.with_target(Node::from(target));
			}
			if let Some(keyboard) = raw.dyn_ref::<web_sys::KeyboardEvent>() {
				event = event.with_detail(serde_json::json!({ "key": keyboard.key() }));
			}
			handler.call(&event);
			if event.default_prevented() {
				raw.prevent_default();
			}
		});

		if let Err(err) = self
			.element
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
		{
			warn(&format!("addEventListener({}) failed: {:?}", event, err));
			return;
		}
		ATTACHED.with(|attached| {
			attached.borrow_mut().push(Attached {
				element: self.element.clone(),
				event: event.to_string(),
				listener: listener.id(),
				closure,
			});
		});
	}

	fn remove_event_listener(&self, event: &str, listener: &Listener) {
		let entry = ATTACHED.with(|attached| {
			let mut attached = attached.borrow_mut();
			let position = attached.iter().position(|entry| {
				entry.element == self.element && entry.event == event && entry.listener == listener.id()
			})?;
			Some(attached.remove(position))
		});
		let Some(entry) = entry else {
			return;
		};
		if let Err(err) = self
			.element
			.remove_event_listener_with_callback(event, entry.closure.as_ref().unchecked_ref())
		{
			warn(&format!("removeEventListener({}) failed: {:?}", event, err));
		}
	}

	fn is_connected(&self) -> bool {
		self.element.is_connected()
	}
}

fn warn(message: &str) {
	web_sys::console::warn_1(&JsValue::from_str(&format!("[behave-dom] {}", message)));
}

fn to_js(value: &Value) -> JsValue {
	match value {
		Value::Null => JsValue::NULL,
		Value::Bool(b) => JsValue::from_bool(*b),
		Value::Number(n) => n.as_f64().map_or(JsValue::NULL, JsValue::from_f64),
		Value::String(s) => JsValue::from_str(s),
		Value::Array(_) | Value::Object(_) => {
			js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
		}
	}
}

fn from_js(value: &JsValue) -> Value {
	if value.is_null() || value.is_undefined() {
		return Value::Null;
	}
	if let Some(b) = value.as_bool() {
		return Value::Bool(b);
	}
	if let Some(n) = value.as_f64() {
		return serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number);
	}
	if let Some(s) = value.as_string() {
		return Value::String(s);
	}
	js_sys::JSON::stringify(value)
		.ok()
		.and_then(|json| json.as_string())
		.and_then(|json| serde_json::from_str(&json).ok())
		.unwrap_or(Value::Null)
}
