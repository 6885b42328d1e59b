//! Behavior definitions and their builder.
//!
//! A definition is immutable once built and shared through `Rc` by every
//! instance created from it.
//!
//! ```
//! use behave_core::prelude::*;
//! use serde_json::json;
//!
//! let toggle = define("Toggle")
//!     .prop_type("label", PropType::String)
//!     .initial_state(|_| json!({"isOn": false}))
//!     .handler("toggle", |this, _event| {
//!         let next = !this.state().bool("isOn");
//!         this.set_state(json!({"isOn": next}));
//!     })
//!     .render(
//!         RenderDescription::new()
//!             .attributes(Attributes::new().class("is-on", |this, _| this.state().bool("isOn")))
//!             .listeners(Listeners::new().on("click", |this, _| this.handler("toggle"))),
//!     )
//!     .build();
//!
//! assert_eq!(toggle.name(), "Toggle");
//! ```

use std::fmt;
use std::rc::Rc;

use behave_dom::{Event, Node};
use serde_json::Value;

use crate::behavior::Behavior;
use crate::error::BehaviorResult;
use crate::props::{PropType, PropValue, Props};
use crate::registry::Registry;
use crate::render::RenderDescription;
use crate::state::State;

/// Computes the initial state object.
pub type InitialStateFn = Rc<dyn Fn(&Behavior) -> Value>;
/// Lifecycle hook without arguments.
pub type HookFn = Rc<dyn Fn(&Behavior)>;
/// Post-update hook, given the props and state before the update.
pub type UpdateFn = Rc<dyn Fn(&Behavior, &Props, &State)>;
/// Event handler, bound to the instance as a [`Listener`](behave_dom::Listener).
pub type HandlerFn = Rc<dyn Fn(&Behavior, &Event)>;
/// Instance method, bound as a [`Callback`](crate::Callback) so it can be
/// passed to children as a prop.
pub type MethodFn = Rc<dyn Fn(&Behavior, &[PropValue])>;

/// A named behavior: prop types, lifecycle hooks, bound functions and a
/// render description.
pub struct BehaviorDefinition {
	name: String,
	prop_types: Vec<(String, PropType)>,
	initial_state: Option<InitialStateFn>,
	init: Option<HookFn>,
	on_update: Option<UpdateFn>,
	will_unmount: Option<HookFn>,
	handlers: Vec<(String, HandlerFn)>,
	methods: Vec<(String, MethodFn)>,
	render: RenderDescription,
}

impl BehaviorDefinition {
	/// Starts a definition.
	pub fn builder(name: impl Into<String>) -> BehaviorBuilder {
		BehaviorBuilder::new(name)
	}

	/// Behavior name, as written in discovery attributes.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared prop types, in declaration order.
	pub fn prop_types(&self) -> &[(String, PropType)] {
		&self.prop_types
	}

	/// The render description evaluated on every pass.
	pub fn render_description(&self) -> &RenderDescription {
		&self.render
	}

	pub(crate) fn initial_state(&self) -> Option<&InitialStateFn> {
		self.initial_state.as_ref()
	}

	pub(crate) fn init_hook(&self) -> Option<&HookFn> {
		self.init.as_ref()
	}

	pub(crate) fn update_hook(&self) -> Option<&UpdateFn> {
		self.on_update.as_ref()
	}

	pub(crate) fn unmount_hook(&self) -> Option<&HookFn> {
		self.will_unmount.as_ref()
	}

	pub(crate) fn handlers(&self) -> &[(String, HandlerFn)] {
		&self.handlers
	}

	pub(crate) fn methods(&self) -> &[(String, MethodFn)] {
		&self.methods
	}

	/// Creates an instance on `node`.
	///
	/// Props declared in [`prop_types`](Self::prop_types) are read from the
	/// node's attributes and overlaid with `initial_props`. The first pass runs
	/// before this returns, followed by the `init` hook.
	pub fn initialize(self: &Rc<Self>, node: Node, registry: &Registry, initial_props: Props) -> BehaviorResult<Behavior> {
		Behavior::initialize(Rc::clone(self), node, registry.clone(), initial_props)
	}
}

impl fmt::Debug for BehaviorDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BehaviorDefinition")
			.field("name", &self.name)
			.field("prop_types", &self.prop_types)
			.field("handlers", &self.handlers.iter().map(|(name, _)| name).collect::<Vec<_>>())
			.field("methods", &self.methods.iter().map(|(name, _)| name).collect::<Vec<_>>())
			.field("render", &self.render)
			.finish_non_exhaustive()
	}
}

/// Shorthand for [`BehaviorDefinition::builder`].
pub fn define(name: impl Into<String>) -> BehaviorBuilder {
	BehaviorBuilder::new(name)
}

/// Builder for [`BehaviorDefinition`].
pub struct BehaviorBuilder {
	definition: BehaviorDefinition,
}

impl BehaviorBuilder {
	fn new(name: impl Into<String>) -> Self {
		Self {
			definition: BehaviorDefinition {
				name: name.into(),
				prop_types: Vec::new(),
				initial_state: None,
				init: None,
				on_update: None,
				will_unmount: None,
				handlers: Vec::new(),
				methods: Vec::new(),
				render: RenderDescription::new(),
			},
		}
	}

	/// Declares a prop read from `data-<name>-<prop>`.
	pub fn prop_type(mut self, name: impl Into<String>, prop_type: impl Into<PropType>) -> Self {
		let name = name.into();
		let prop_type = prop_type.into();
		match self.definition.prop_types.iter_mut().find(|(existing, _)| *existing == name) {
			Some(entry) => entry.1 = prop_type,
			None => self.definition.prop_types.push((name, prop_type)),
		}
		self
	}

	/// Initial state; runs after props are known, before the first pass.
	pub fn initial_state<F>(mut self, f: F) -> Self
	where
		F: Fn(&Behavior) -> Value + 'static,
	{
		self.definition.initial_state = Some(Rc::new(f));
		self
	}

	/// Runs once, after the first pass.
	pub fn init<F>(mut self, f: F) -> Self
	where
		F: Fn(&Behavior) + 'static,
	{
		self.definition.init = Some(Rc::new(f));
		self
	}

	/// Runs after every pass except the first.
	pub fn on_update<F>(mut self, f: F) -> Self
	where
		F: Fn(&Behavior, &Props, &State) + 'static,
	{
		self.definition.on_update = Some(Rc::new(f));
		self
	}

	/// Runs when the manager tears the instance down.
	pub fn will_unmount<F>(mut self, f: F) -> Self
	where
		F: Fn(&Behavior) + 'static,
	{
		self.definition.will_unmount = Some(Rc::new(f));
		self
	}

	/// Adds an event handler, available as [`Behavior::handler`].
	pub fn handler<F>(mut self, name: impl Into<String>, f: F) -> Self
	where
		F: Fn(&Behavior, &Event) + 'static,
	{
		replace_named(&mut self.definition.handlers, name.into(), Rc::new(f));
		self
	}

	/// Adds an instance method, available as [`Behavior::method`].
	pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
	where
		F: Fn(&Behavior, &[PropValue]) + 'static,
	{
		replace_named(&mut self.definition.methods, name.into(), Rc::new(f));
		self
	}

	/// Sets the render description.
	pub fn render(mut self, render: RenderDescription) -> Self {
		self.definition.render = render;
		self
	}

	/// Finishes the definition.
	pub fn build(self) -> Rc<BehaviorDefinition> {
		Rc::new(self.definition)
	}
}

fn replace_named<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
	match entries.iter_mut().find(|(existing, _)| *existing == name) {
		Some(entry) => entry.1 = value,
		None => entries.push((name, value)),
	}
}
