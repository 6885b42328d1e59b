//! Reconciliation: bringing a node in line with a render description while
//! writing only what changed since the previous pass.
//!
//! Each behavior instance owns a [`Cache`]. Caches are taken out of the
//! instance for the duration of a sub-pass and put back afterwards, so render
//! functions and child constructors can read the owner without hitting a
//! borrowed `RefCell`.

mod attributes;
mod children;
mod listeners;

use std::collections::HashMap;

use behave_dom::{Listener, Node};
use serde_json::Value;

use crate::behavior::Behavior;
use crate::error::BehaviorResult;
use crate::render::RenderDescription;

pub(crate) use attributes::reconcile_attributes;
pub(crate) use listeners::reconcile_listeners;

/// Last values written per attribute key.
#[derive(Debug, Default)]
pub(crate) struct AttributeCache {
	pub(crate) class_list: HashMap<String, bool>,
	/// Raw computed values, before CSS text conversion.
	pub(crate) style: HashMap<String, Value>,
	pub(crate) properties: HashMap<String, Value>,
}

/// Attached listener per event name. Absent means nothing attached.
#[derive(Debug, Default)]
pub(crate) struct ListenerCache {
	pub(crate) attached: HashMap<String, Listener>,
}

impl ListenerCache {
	/// Removes every cached listener from `node`.
	pub(crate) fn detach_all(&mut self, node: &Node) {
		for (event, listener) in self.attached.drain() {
			node.remove_event_listener(&event, &listener);
		}
	}
}

/// One discovered child node and what the parent has done to it.
#[derive(Debug)]
pub(crate) struct ChildSlot {
	pub(crate) node: Node,
	pub(crate) instantiated: bool,
	pub(crate) behavior: Option<Behavior>,
	pub(crate) attributes: AttributeCache,
	pub(crate) listeners: ListenerCache,
}

impl ChildSlot {
	fn new(node: Node) -> Self {
		Self {
			node,
			instantiated: false,
			behavior: None,
			attributes: AttributeCache::default(),
			listeners: ListenerCache::default(),
		}
	}
}

/// Everything one behavior instance remembers between passes.
#[derive(Debug, Default)]
pub(crate) struct Cache {
	pub(crate) attributes: AttributeCache,
	pub(crate) listeners: ListenerCache,
	/// Child groups, keyed by group name. The node list of a group is fixed the
	/// first time it is reconciled.
	pub(crate) groups: HashMap<String, Vec<ChildSlot>>,
}

impl Cache {
	/// Detaches the listeners attached to `node` and to every child slot.
	///
	/// Returns the child behaviors built so far; they are not touched here so
	/// the caller can unmount them once this cache is no longer borrowed.
	pub(crate) fn detach_listeners(&mut self, node: &Node) -> Vec<Behavior> {
		self.listeners.detach_all(node);
		let mut children = Vec::new();
		for slot in self.groups.values_mut().flatten() {
			slot.listeners.detach_all(&slot.node);
			children.extend(slot.behavior.clone());
		}
		children
	}
}

/// Runs one full pass for `owner`: own attributes, own listeners, then every
/// child group in declaration order.
pub(crate) fn reconcile(owner: &Behavior, description: &RenderDescription) -> BehaviorResult<()> {
	let node = owner.node();

	let mut attributes = std::mem::take(&mut owner.cache().borrow_mut().attributes);
	reconcile_attributes(owner, node, &description.attributes, &mut attributes, None);
	owner.cache().borrow_mut().attributes = attributes;

	let mut listeners = std::mem::take(&mut owner.cache().borrow_mut().listeners);
	reconcile_listeners(owner, node, &description.listeners, &mut listeners, None);
	owner.cache().borrow_mut().listeners = listeners;

	for group in description.groups() {
		children::reconcile_group(owner, group)?;
	}
	Ok(())
}
