use behave_dom::Node;

use super::ListenerCache;
use crate::behavior::Behavior;
use crate::render::Listeners;

/// Swaps listeners whose identity changed. An unchanged identity is left
/// attached; a `None` result detaches whatever was there.
pub(crate) fn reconcile_listeners(
	owner: &Behavior,
	node: &Node,
	listeners: &Listeners,
	cache: &mut ListenerCache,
	arg: Option<&Node>,
) {
	for (event, produce) in &listeners.entries {
		let next = produce(owner, arg);
		if cache.attached.get(event) == next.as_ref() {
			continue;
		}
		if let Some(previous) = cache.attached.remove(event) {
			node.remove_event_listener(event, &previous);
		}
		if let Some(next) = next {
			node.add_event_listener(event, &next);
			cache.attached.insert(event.clone(), next);
		}
	}
}
