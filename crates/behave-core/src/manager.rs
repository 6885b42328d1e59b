//! Page-level lifecycle: finds behavior-bearing nodes, builds their behaviors
//! and tears them down again.
//!
//! ## Discovery
//!
//! ```text
//! <div data-behavior="Toggle Tooltip">     <- two behaviors on one node
//!   <span data-toggle-label></span>        <- child of Toggle, not scanned here
//! </div>
//! ```
//!
//! [`BehaviorManager::create_behaviors`] scans a root and its descendants for
//! the discovery attribute and builds every named behavior that is not
//! already active on that node. [`BehaviorManager::destroy_behaviors`] runs
//! `will_unmount` for every active behavior in a removed subtree.

use std::rc::Rc;

use behave_dom::Node;

use crate::behavior::Behavior;
use crate::error::BehaviorError;
use crate::props::Props;
use crate::registry::Registry;
use crate::settings::{Settings, SettingsResult};
use crate::{debug_log, error_log, warn_log};

/// Outcome of one [`BehaviorManager::create_behaviors`] scan.
#[derive(Debug, Default)]
pub struct ScanReport {
	/// Instances built by this scan.
	pub created: usize,
	/// Names found on nodes that are already active.
	pub already_active: usize,
	/// Names with no registered behavior.
	pub unknown: Vec<String>,
	/// Construction failures; the scan continued past each one.
	pub errors: Vec<BehaviorError>,
}

impl ScanReport {
	/// Whether every discovered name was built or already active.
	pub fn is_clean(&self) -> bool {
		self.unknown.is_empty() && self.errors.is_empty()
	}
}

/// Keeps track of the behaviors living on a page.
#[derive(Debug)]
pub struct BehaviorManager {
	registry: Registry,
	settings: Settings,
	attribute: String,
	active: Vec<Behavior>,
}

impl BehaviorManager {
	/// Creates a manager scanning for `settings.data_attribute`.
	///
	/// Fails when the settings do not pass [`Settings::validate`].
	pub fn new(registry: Registry, settings: Settings) -> SettingsResult<Self> {
		settings.validate()?;
		let attribute = settings.discovery_attribute();
		Ok(Self {
			registry,
			settings,
			attribute,
			active: Vec::new(),
		})
	}

	/// The registry behaviors are built from.
	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Active settings.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Builds the behaviors named under `root`, `root` included.
	pub fn create_behaviors(&mut self, root: &Node) -> ScanReport {
		let mut report = ScanReport::default();
		for node in self.behavior_nodes(root) {
			let names = node.get_attribute(&self.attribute).unwrap_or_default();
			for name in names.split_whitespace() {
				if self.behavior(&node, name).is_some() {
					report.already_active += 1;
					continue;
				}
				let definition = match self.registry.definition(name) {
					Ok(definition) => Rc::clone(definition),
					Err(err) => {
						if self.settings.warn_unknown {
							warn_log!("{}", err);
						}
						report.unknown.push(name.to_string());
						continue;
					}
				};
				match definition.initialize(node.clone(), &self.registry, Props::new()) {
					Ok(behavior) => {
						debug_log!("Created {} on <{}>", name, node.tag_name());
						self.active.push(behavior);
						report.created += 1;
					}
					Err(err) => {
						error_log!("Failed to create {}: {}", name, err);
						report.errors.push(err);
					}
				}
			}
		}
		report
	}

	/// Unmounts every active behavior on `root` or its behavior-bearing
	/// descendants. Returns the number of instances unmounted.
	pub fn destroy_behaviors(&mut self, root: &Node) -> usize {
		let nodes = self.behavior_nodes(root);
		let before = self.active.len();
		let mut removed = Vec::new();
		self.active.retain(|behavior| {
			if nodes.contains(behavior.node()) {
				removed.push(behavior.clone());
				false
			} else {
				true
			}
		});
		for behavior in &removed {
			behavior.will_unmount();
			debug_log!("Destroyed {}", behavior.name());
		}
		before - self.active.len()
	}

	/// Unmounts every active behavior whose node has left the document.
	///
	/// Hosts without mutation observation call this after removing markup.
	pub fn destroy_disconnected(&mut self) -> usize {
		let before = self.active.len();
		let mut removed = Vec::new();
		self.active.retain(|behavior| {
			if behavior.node().is_connected() {
				true
			} else {
				removed.push(behavior.clone());
				false
			}
		});
		for behavior in &removed {
			behavior.will_unmount();
			debug_log!("Destroyed detached {}", behavior.name());
		}
		before - self.active.len()
	}

	/// Active behaviors on `node`, in creation order.
	pub fn behaviors(&self, node: &Node) -> Vec<Behavior> {
		self.active.iter().filter(|behavior| behavior.node() == node).cloned().collect()
	}

	/// The active behavior called `name` on `node`.
	pub fn behavior(&self, node: &Node, name: &str) -> Option<Behavior> {
		self.active
			.iter()
			.find(|behavior| behavior.node() == node && behavior.name() == name)
			.cloned()
	}

	/// Number of active instances.
	pub fn len(&self) -> usize {
		self.active.len()
	}

	/// Whether no instance is active.
	pub fn is_empty(&self) -> bool {
		self.active.is_empty()
	}

	fn behavior_nodes(&self, root: &Node) -> Vec<Node> {
		let mut nodes = Vec::new();
		if root.has_attribute(&self.attribute) {
			nodes.push(root.clone());
		}
		nodes.extend(root.descendants_with_attribute(&self.attribute));
		nodes
	}
}

/// Scans `document.body`, then keeps the manager in sync with DOM insertions
/// and removals. Removals in a batch are processed before additions, so a
/// moved node is torn down and rebuilt.
#[cfg(target_arch = "wasm32")]
pub fn observe(
	manager: &Rc<std::cell::RefCell<BehaviorManager>>,
) -> Result<web_sys::MutationObserver, wasm_bindgen::JsValue> {
	use wasm_bindgen::JsCast;
	use wasm_bindgen::closure::Closure;
	use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord, NodeList};

	fn elements(list: NodeList) -> Vec<Node> {
		(0..list.length())
			.filter_map(|index| list.item(index))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.map(Node::from)
			.collect()
	}

	let body = web_sys::window()
		.and_then(|window| window.document())
		.and_then(|document| document.body())
		.ok_or_else(|| wasm_bindgen::JsValue::from_str("document.body is not available"))?;

	let root = Node::from(Element::from(body.clone()));
	let report = manager.borrow_mut().create_behaviors(&root);
	debug_log!("Initial scan created {} behavior(s)", report.created);

	let observed = Rc::clone(manager);
	let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
		move |records: js_sys::Array, _observer: MutationObserver| {
			let records: Vec<MutationRecord> =
				records.iter().filter_map(|record| record.dyn_into().ok()).collect();
			let Ok(mut manager) = observed.try_borrow_mut() else {
				error_log!("Behavior manager is busy; mutation batch dropped");
				return;
			};
			for record in &records {
				for node in elements(record.removed_nodes()) {
					manager.destroy_behaviors(&node);
				}
			}
			for record in &records {
				for node in elements(record.added_nodes()) {
					manager.create_behaviors(&node);
				}
			}
		},
	);

	let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
	let options = MutationObserverInit::new();
	options.set_child_list(true);
	options.set_subtree(true);
	observer.observe_with_options(&body, &options)?;
	callback.forget();
	Ok(observer)
}
