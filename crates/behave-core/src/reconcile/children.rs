use std::rc::Rc;

use behave_dom::{Node, data_attribute};

use super::{ChildSlot, reconcile_attributes, reconcile_listeners};
use crate::behavior::Behavior;
use crate::error::{BehaviorError, BehaviorResult};
use crate::render::{Cardinality, ChildDescription, ChildGroup};
use crate::{debug_log, warn_log};

/// Reconciles one child group of `owner`.
///
/// The first call discovers the group's nodes through
/// `data-<owner>-<group>` and fixes that list for the lifetime of the owner.
/// Each node gets its behavior instantiated once; later passes forward fresh
/// props to it and reconcile the parent-declared attributes and listeners.
pub(crate) fn reconcile_group(owner: &Behavior, group: &ChildGroup) -> BehaviorResult<()> {
	let attribute = data_attribute(&[owner.name(), group.name()]);
	let count = match slot_count(owner, group) {
		Some(count) => count,
		None => discover(owner, group, &attribute)?,
	};

	for index in 0..count {
		let Some((node, instantiated, behavior)) = slot_snapshot(owner, group, index) else {
			continue;
		};
		let description = group.template.resolve(owner, &node);

		if !instantiated {
			let behavior = instantiate(owner, &node, &attribute, &description)?;
			with_slot(owner, group, index, |slot| {
				slot.behavior = behavior;
				slot.instantiated = true;
			});
		} else if let Some(child) = behavior {
			child.set_props(owner.resolve_props(description.prop_fns(), Some(&node)))?;
		}

		if let Some(attributes) = &description.attributes {
			let mut cache = with_slot(owner, group, index, |slot| std::mem::take(&mut slot.attributes)).unwrap_or_default();
			reconcile_attributes(owner, &node, attributes, &mut cache, Some(&node));
			with_slot(owner, group, index, |slot| slot.attributes = cache);
		}
		if let Some(listeners) = &description.listeners {
			let mut cache = with_slot(owner, group, index, |slot| std::mem::take(&mut slot.listeners)).unwrap_or_default();
			reconcile_listeners(owner, &node, listeners, &mut cache, Some(&node));
			with_slot(owner, group, index, |slot| slot.listeners = cache);
		}
	}
	Ok(())
}

fn slot_count(owner: &Behavior, group: &ChildGroup) -> Option<usize> {
	owner.cache().borrow().groups.get(group.name()).map(Vec::len)
}

fn discover(owner: &Behavior, group: &ChildGroup, attribute: &str) -> BehaviorResult<usize> {
	let mut nodes = owner.node().descendants_with_attribute(attribute);
	if group.cardinality() == Cardinality::One {
		if nodes.is_empty() {
			return Err(BehaviorError::MissingChild {
				behavior: owner.name().to_string(),
				group: group.name().to_string(),
				attribute: attribute.to_string(),
			});
		}
		nodes.truncate(1);
	}
	debug_log!("{} bound {} node(s) for `{}`", owner.name(), nodes.len(), attribute);

	let slots: Vec<ChildSlot> = nodes.into_iter().map(ChildSlot::new).collect();
	let count = slots.len();
	owner.cache().borrow_mut().groups.insert(group.name().to_string(), slots);
	Ok(count)
}

fn slot_snapshot(owner: &Behavior, group: &ChildGroup, index: usize) -> Option<(Node, bool, Option<Behavior>)> {
	let cache = owner.cache().borrow();
	let slot = cache.groups.get(group.name())?.get(index)?;
	Some((slot.node.clone(), slot.instantiated, slot.behavior.clone()))
}

fn with_slot<R>(owner: &Behavior, group: &ChildGroup, index: usize, f: impl FnOnce(&mut ChildSlot) -> R) -> Option<R> {
	let mut cache = owner.cache().borrow_mut();
	cache.groups.get_mut(group.name())?.get_mut(index).map(f)
}

/// Builds the behavior named by the child's discovery attribute.
///
/// An empty value or an unregistered name leaves a node-only slot.
fn instantiate(
	owner: &Behavior,
	node: &Node,
	attribute: &str,
	description: &ChildDescription,
) -> BehaviorResult<Option<Behavior>> {
	let raw = node.get_attribute(attribute).unwrap_or_default();
	let mut names = raw.split_whitespace();
	let Some(name) = names.next() else {
		return Ok(None);
	};
	if names.next().is_some() {
		warn_log!(
			"`{}` under {} lists several behaviors ({}); only {} is instantiated",
			attribute,
			owner.name(),
			raw.trim(),
			name
		);
	}

	let definition = match owner.registry().definition(name) {
		Ok(definition) => Rc::clone(definition),
		Err(err) => {
			warn_log!("{}", err);
			return Ok(None);
		}
	};
	let props = owner.resolve_props(description.prop_fns(), Some(node));
	definition.initialize(node.clone(), owner.registry(), props).map(Some)
}
