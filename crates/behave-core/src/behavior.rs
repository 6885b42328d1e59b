//! Behavior instances: one definition bound to one node.
//!
//! # Lifecycle
//!
//! 1. Attribute props are read and overlaid with the parent-supplied props.
//! 2. Handlers and methods are bound once, so their identities stay stable
//!    for the life of the instance.
//! 3. Initial state is computed.
//! 4. The first pass runs silently (no `on_update`).
//! 5. `init` runs.
//!
//! Afterwards a pass runs on every [`Behavior::set_props`] (synchronously)
//! and on the scheduled flush following [`Behavior::set_state`]. Several
//! `set_state` calls before a flush produce a single pass whose `on_update`
//! sees the props and state from before the first call.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use behave_dom::{Listener, Node};

use crate::definition::BehaviorDefinition;
use crate::error::BehaviorResult;
use crate::props::{Callback, PropValue, Props, attribute_props};
use crate::reconcile::{self, Cache};
use crate::registry::Registry;
use crate::render::PropFn;
use crate::state::{State, StateUpdate};
use crate::{debug_log, error_log};

/// Where an instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Building; the first pass and `init` have not completed.
	Constructing,
	/// Idle between passes.
	Ready,
	/// A pass is running.
	Updating,
	/// `will_unmount` ran. Scheduled passes are skipped.
	Unmounted,
}

/// A node reached through a child group, with the behavior built on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
	/// The child node.
	pub node: Node,
	/// Its behavior, if the node named a registered one.
	pub behavior: Option<Behavior>,
}

struct PendingPass {
	prev_props: Props,
	prev_state: State,
}

pub(crate) struct BehaviorInner {
	definition: Rc<BehaviorDefinition>,
	node: Node,
	registry: Registry,
	attr_props: Props,
	props: RefCell<Props>,
	state: RefCell<State>,
	cache: RefCell<Cache>,
	handlers: HashMap<String, Listener>,
	methods: HashMap<String, Callback>,
	pending: RefCell<Option<PendingPass>>,
	phase: Cell<Phase>,
}

/// A live behavior instance. Cloning yields another handle to the same
/// instance; equality is instance identity.
#[derive(Clone)]
pub struct Behavior {
	inner: Rc<BehaviorInner>,
}

/// Non-owning handle to a [`Behavior`].
#[derive(Clone)]
pub struct WeakBehavior {
	inner: Weak<BehaviorInner>,
}

impl WeakBehavior {
	/// The instance, if still alive.
	pub fn upgrade(&self) -> Option<Behavior> {
		self.inner.upgrade().map(|inner| Behavior { inner })
	}
}

impl fmt::Debug for WeakBehavior {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("WeakBehavior")
	}
}

impl Behavior {
	pub(crate) fn initialize(
		definition: Rc<BehaviorDefinition>,
		node: Node,
		registry: Registry,
		initial_props: Props,
	) -> BehaviorResult<Self> {
		let attr_props = attribute_props(definition.name(), &node, definition.prop_types())?;
		let props = attr_props.merged(&initial_props);

		let inner = Rc::new_cyclic(|weak: &Weak<BehaviorInner>| BehaviorInner {
			handlers: bind_handlers(&definition, weak),
			methods: bind_methods(&definition, weak),
			definition: Rc::clone(&definition),
			node,
			registry,
			attr_props,
			props: RefCell::new(props),
			state: RefCell::new(State::new()),
			cache: RefCell::new(Cache::default()),
			pending: RefCell::new(None),
			phase: Cell::new(Phase::Constructing),
		});
		let behavior = Self { inner };

		if let Some(initial_state) = definition.initial_state() {
			let state = State::from_value(initial_state(&behavior));
			*behavior.inner.state.borrow_mut() = state;
		}

		if let Err(err) = behavior.run_pass(None) {
			behavior.inner.phase.set(Phase::Unmounted);
			behavior.release();
			return Err(err);
		}
		if let Some(init) = definition.init_hook() {
			init(&behavior);
		}
		behavior.inner.phase.set(Phase::Ready);
		debug_log!("Initialized {} on <{}>", behavior.name(), behavior.node().tag_name());
		Ok(behavior)
	}

	/// Name of the definition.
	pub fn name(&self) -> &str {
		self.inner.definition.name()
	}

	/// The node this instance is bound to.
	pub fn node(&self) -> &Node {
		&self.inner.node
	}

	/// The definition this instance was built from.
	pub fn definition(&self) -> &Rc<BehaviorDefinition> {
		&self.inner.definition
	}

	/// The registry used to build child behaviors.
	pub fn registry(&self) -> &Registry {
		&self.inner.registry
	}

	/// Current props.
	pub fn props(&self) -> Props {
		self.inner.props.borrow().clone()
	}

	/// Props read from the node's attributes at construction.
	pub fn attr_props(&self) -> &Props {
		&self.inner.attr_props
	}

	/// Current state.
	pub fn state(&self) -> State {
		self.inner.state.borrow().clone()
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> Phase {
		self.inner.phase.get()
	}

	/// Whether a state-triggered pass is scheduled but has not run.
	pub fn has_pending_update(&self) -> bool {
		self.inner.pending.borrow().is_some()
	}

	/// Merges `update` into state and schedules a pass.
	///
	/// State is updated immediately; the DOM catches up when the scheduler
	/// runs the pass. Calls made before that coalesce into one pass.
	pub fn set_state(&self, update: impl Into<StateUpdate>) {
		let previous = self.state();
		let partial = update.into().resolve(&previous);
		self.inner.state.borrow_mut().merge(partial);
		self.schedule_pass(previous);
	}

	/// Replaces the parent-supplied props and runs a pass immediately.
	///
	/// Attribute props stay underneath; entries in `props` win.
	pub fn set_props(&self, props: Props) -> BehaviorResult<()> {
		let next = self.inner.attr_props.merged(&props);
		let prev_props = self.inner.props.replace(next);
		let prev_state = self.state();
		self.run_pass(Some(PendingPass { prev_props, prev_state }))
	}

	/// Bound event handler `name`. The same listener is returned on every
	/// call.
	pub fn handler(&self, name: &str) -> Option<Listener> {
		self.inner.handlers.get(name).cloned()
	}

	/// Bound method `name`, suitable for passing to children as a prop.
	pub fn method(&self, name: &str) -> Option<Callback> {
		self.inner.methods.get(name).cloned()
	}

	/// Invokes method `name`. Returns false when there is none.
	pub fn call(&self, name: &str, args: &[PropValue]) -> bool {
		match self.method(name) {
			Some(method) => {
				method.call(args);
				true
			}
			None => false,
		}
	}

	/// The node bound to single-child group `group`, once reconciled.
	pub fn get_child(&self, group: &str) -> Option<ChildRef> {
		self.get_children(group).into_iter().next()
	}

	/// Nodes bound to child group `group`, in document order.
	pub fn get_children(&self, group: &str) -> Vec<ChildRef> {
		let cache = self.inner.cache.borrow();
		cache
			.groups
			.get(group)
			.map(|slots| {
				slots
					.iter()
					.map(|slot| ChildRef {
						node: slot.node.clone(),
						behavior: slot.behavior.clone(),
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Evaluates prop functions into plain props.
	pub fn resolve_props(&self, props: &[(String, PropFn)], node: Option<&Node>) -> Props {
		props
			.iter()
			.map(|(name, compute)| (name.clone(), compute(self, node)))
			.collect()
	}

	/// Runs the `will_unmount` hook once and stops further scheduled passes.
	///
	/// Listeners attached by reconciliation are detached afterwards, and child
	/// behaviors built by this instance are unmounted with it.
	pub fn will_unmount(&self) {
		if self.phase() == Phase::Unmounted {
			return;
		}
		self.inner.pending.borrow_mut().take();
		if let Some(hook) = self.inner.definition.unmount_hook() {
			hook(self);
		}
		self.inner.phase.set(Phase::Unmounted);
		// The hook may have scheduled a pass of its own.
		self.inner.pending.borrow_mut().take();
		self.release();
		debug_log!("Unmounted {}", self.name());
	}

	/// Non-owning handle.
	pub fn downgrade(&self) -> WeakBehavior {
		WeakBehavior {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Detaches every listener this instance attached and unmounts the
	/// children it built.
	fn release(&self) {
		let children = self.inner.cache.borrow_mut().detach_listeners(&self.inner.node);
		for child in children {
			child.will_unmount();
		}
	}

	pub(crate) fn cache(&self) -> &RefCell<Cache> {
		&self.inner.cache
	}

	fn schedule_pass(&self, prev_state: State) {
		if self.phase() == Phase::Unmounted {
			return;
		}
		{
			let mut pending = self.inner.pending.borrow_mut();
			if pending.is_some() {
				return;
			}
			*pending = Some(PendingPass {
				prev_props: self.inner.props.borrow().clone(),
				prev_state,
			});
		}
		let weak = self.downgrade();
		self.inner.registry.scheduler().defer(Box::new(move || {
			if let Some(behavior) = weak.upgrade() {
				behavior.flush_pending();
			}
		}));
	}

	fn flush_pending(&self) {
		let Some(pending) = self.inner.pending.borrow_mut().take() else {
			return;
		};
		if self.phase() == Phase::Unmounted {
			return;
		}
		if let Err(err) = self.run_pass(Some(pending)) {
			error_log!("Deferred update of {} failed: {}", self.name(), err);
		}
	}

	/// One reconciliation pass. `previous` is `None` only for the silent
	/// first pass.
	fn run_pass(&self, previous: Option<PendingPass>) -> BehaviorResult<()> {
		let settled = self.phase();
		if settled == Phase::Ready {
			self.inner.phase.set(Phase::Updating);
		}
		let result = reconcile::reconcile(self, self.inner.definition.render_description());
		self.inner.phase.set(settled);
		result?;

		if let (Some(previous), Some(on_update)) = (previous, self.inner.definition.update_hook()) {
			on_update(self, &previous.prev_props, &previous.prev_state);
		}
		Ok(())
	}
}

fn bind_handlers(definition: &BehaviorDefinition, weak: &Weak<BehaviorInner>) -> HashMap<String, Listener> {
	definition
		.handlers()
		.iter()
		.map(|(name, handler)| {
			let weak = weak.clone();
			let handler = Rc::clone(handler);
			let listener = Listener::new(move |event| {
				if let Some(inner) = weak.upgrade() {
					handler(&Behavior { inner }, event);
				}
			});
			(name.clone(), listener)
		})
		.collect()
}

fn bind_methods(definition: &BehaviorDefinition, weak: &Weak<BehaviorInner>) -> HashMap<String, Callback> {
	definition
		.methods()
		.iter()
		.map(|(name, method)| {
			let weak = weak.clone();
			let method = Rc::clone(method);
			let callback = Callback::new(move |args: &[PropValue]| {
				if let Some(inner) = weak.upgrade() {
					method(&Behavior { inner }, args);
				}
			});
			(name.clone(), callback)
		})
		.collect()
}

impl PartialEq for Behavior {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Behavior {}

impl fmt::Debug for Behavior {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Behavior")
			.field("name", &self.name())
			.field("node", &self.inner.node)
			.field("phase", &self.phase())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::define;
	use crate::scheduler::TaskQueue;
	use behave_dom::{MemoryDocument, element};
	use rstest::rstest;
	use serde_json::json;

	fn counter_registry(queue: &TaskQueue) -> Registry {
		let counter = define("Counter")
			.initial_state(|_| json!({"count": 0}))
			.handler("increment", |this, _| {
				this.set_state(StateUpdate::with(|state: &State| {
					let next = state.get("count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
					json!({"count": next}).as_object().cloned().unwrap_or_default()
				}));
			})
			.build();
		Registry::builder().register(counter).scheduler(queue.clone()).build()
	}

	#[rstest]
	fn test_phase_is_ready_after_initialize() {
		let queue = TaskQueue::new();
		let registry = counter_registry(&queue);
		let doc = MemoryDocument::new();
		let node = doc.append_to_body(element("button"));

		let behavior = registry.initialize("Counter", node, Props::new()).unwrap();

		assert_eq!(behavior.phase(), Phase::Ready);
		assert_eq!(behavior.state().to_value(), json!({"count": 0}));
	}

	#[rstest]
	fn test_handler_identity_is_stable() {
		let queue = TaskQueue::new();
		let registry = counter_registry(&queue);
		let doc = MemoryDocument::new();
		let behavior = registry
			.initialize("Counter", doc.append_to_body(element("button")), Props::new())
			.unwrap();

		assert_eq!(behavior.handler("increment"), behavior.handler("increment"));
		assert!(behavior.handler("missing").is_none());
	}

	#[rstest]
	fn test_functional_updates_compose_before_flush() {
		let queue = TaskQueue::new();
		let registry = counter_registry(&queue);
		let doc = MemoryDocument::new();
		let node = doc.append_to_body(element("button"));
		let behavior = registry.initialize("Counter", node.clone(), Props::new()).unwrap();
		let increment = behavior.handler("increment").unwrap();

		increment.call(&behave_dom::Event::new("click", node.clone()));
		increment.call(&behave_dom::Event::new("click", node));

		assert_eq!(behavior.state().value("count"), json!(2));
		assert!(behavior.has_pending_update());
		assert_eq!(queue.len(), 1);
		queue.run_until_idle();
		assert!(!behavior.has_pending_update());
	}

	#[rstest]
	fn test_unmounted_instance_skips_scheduled_pass() {
		let queue = TaskQueue::new();
		let registry = counter_registry(&queue);
		let doc = MemoryDocument::new();
		let behavior = registry
			.initialize("Counter", doc.append_to_body(element("button")), Props::new())
			.unwrap();

		behavior.set_state(json!({"count": 5}));
		behavior.will_unmount();
		behavior.set_state(json!({"count": 6}));

		assert_eq!(behavior.phase(), Phase::Unmounted);
		assert!(!behavior.has_pending_update());
		queue.run_until_idle();
		assert_eq!(behavior.state().value("count"), json!(6));
	}

	#[rstest]
	fn test_pass_scheduled_by_unmount_hook_is_dropped() {
		let queue = TaskQueue::new();
		let closing = define("Closing")
			.initial_state(|_| json!({"open": true}))
			.will_unmount(|this| this.set_state(json!({"open": false})))
			.build();
		let registry = Registry::builder().register(closing).scheduler(queue.clone()).build();
		let doc = MemoryDocument::new();
		let behavior = registry
			.initialize("Closing", doc.append_to_body(element("dialog")), Props::new())
			.unwrap();

		behavior.will_unmount();

		assert!(!behavior.has_pending_update());
		doc.clear_mutations();
		queue.run_until_idle();
		assert_eq!(doc.mutation_count(), 0);
	}

	#[rstest]
	fn test_dropped_instance_task_is_a_no_op() {
		let queue = TaskQueue::new();
		let registry = counter_registry(&queue);
		let doc = MemoryDocument::new();
		let behavior = registry
			.initialize("Counter", doc.append_to_body(element("button")), Props::new())
			.unwrap();

		behavior.set_state(json!({"count": 1}));
		drop(behavior);

		assert_eq!(queue.run_until_idle(), 1);
	}
}
