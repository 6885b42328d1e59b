//! Lifecycle Integration Tests
//!
//! Page scanning, the Toggle scenario end to end, and teardown.
//!
//! Test Categories:
//! - Category 1: Toggle end to end
//! - Category 2: Manager scanning
//! - Category 3: Teardown
//! - Category 4: Listener release

mod utils;

use std::cell::Cell;
use std::rc::Rc;

use behave_core::prelude::*;
use behave_dom::element;
use rstest::rstest;
use serde_json::json;
use utils::{Page, page, toggle};

fn toggle_markup(page: &Page) -> Node {
	page.doc.append_to_body(
		element("button")
			.attr("data-behavior", "Toggle")
			.child(element("span").attr("data-toggle-label", "")),
	)
}

// ============================================================================
// Category 1: Toggle end to end
// ============================================================================

/// Construction renders the off state; a state change renders on after the
/// deferred pass
#[rstest]
fn test_toggle_end_to_end(page: Page) {
	let mut manager = BehaviorManager::new(page.registry([toggle()]), Settings::default()).unwrap();
	let button = toggle_markup(&page);

	let report = manager.create_behaviors(&page.doc.body());

	assert_eq!(report.created, 1);
	assert!(report.is_clean());
	let label = button.descendants_with_attribute("data-toggle-label").remove(0);
	assert!(!button.has_class("is-on"));
	assert_eq!(label.property("textContent"), json!("Off"));

	let toggle = manager.behavior(&button, "Toggle").unwrap();
	toggle.set_state(json!({"isOn": true}));
	assert!(!button.has_class("is-on"));

	page.flush();
	assert!(button.has_class("is-on"));
	assert_eq!(label.property("textContent"), json!("On"));
}

/// Clicks go through the bound handler and the scheduler
#[rstest]
fn test_toggle_click(page: Page) {
	let mut manager = BehaviorManager::new(page.registry([toggle()]), Settings::default()).unwrap();
	let button = toggle_markup(&page);
	manager.create_behaviors(&button);

	page.doc.dispatch(&button, "click");
	page.doc.dispatch(&button, "click");
	page.doc.dispatch(&button, "click");
	assert_eq!(page.queue.len(), 1);
	page.flush();

	assert!(button.has_class("is-on"));
	assert_eq!(page.doc.outer_html(&button), "<button class=\"is-on\" data-behavior=\"Toggle\"><span data-toggle-label>On</span></button>");
}

// ============================================================================
// Category 2: Manager scanning
// ============================================================================

/// Unknown names and construction failures are reported, the rest is built
#[rstest]
fn test_scan_report_collects_failures(page: Page) {
	let filter = define("Filter").prop_type("config", PropType::Object).build();
	let mut manager = BehaviorManager::new(page.registry([toggle(), filter]), Settings::default()).unwrap();
	toggle_markup(&page);
	page.doc.append_to_body(element("div").attr("data-behavior", "Filter").attr("data-filter-config", "{oops"));
	page.doc.append_to_body(element("div").attr("data-behavior", "Carousel"));

	let report = manager.create_behaviors(&page.doc.body());

	assert_eq!(report.created, 1);
	assert_eq!(report.unknown, vec!["Carousel".to_string()]);
	assert_eq!(report.errors.len(), 1);
	assert!(matches!(report.errors[0], BehaviorError::InvalidPropJson { .. }));
	assert_eq!(manager.len(), 1);
}

/// The discovery attribute comes from settings
#[rstest]
fn test_custom_discovery_attribute(page: Page) {
	let settings = Settings::from_json(r#"{"data_attribute": "widget", "warn_unknown": false}"#).unwrap();
	let mut manager = BehaviorManager::new(page.registry([toggle()]), settings).unwrap();
	toggle_markup(&page);
	let widget = page.doc.append_to_body(
		element("button")
			.attr("data-widget", "Toggle")
			.child(element("span").attr("data-toggle-label", "")),
	);

	let report = manager.create_behaviors(&page.doc.body());

	assert_eq!(report.created, 1);
	assert_eq!(manager.behaviors(&widget).len(), 1);
}

// ============================================================================
// Category 3: Teardown
// ============================================================================

/// Removing a subtree unmounts its behaviors once and drops their pending pass
#[rstest]
fn test_destroy_runs_unmount_hook(page: Page) {
	let unmounted = Rc::new(Cell::new(0));
	let counter = Rc::clone(&unmounted);
	let tracked = define("Tracked")
		.initial_state(|_| json!({"n": 0}))
		.will_unmount(move |_| counter.set(counter.get() + 1))
		.render(RenderDescription::new().attributes(Attributes::new().property("title", |this, _| this.state().value("n"))))
		.build();
	let mut manager = BehaviorManager::new(page.registry([tracked]), Settings::default()).unwrap();
	let section = page.doc.append_to_body(
		element("section")
			.attr("data-behavior", "Tracked")
			.child(element("div").attr("data-behavior", "Tracked")),
	);
	manager.create_behaviors(&page.doc.body());
	let outer = manager.behavior(&section, "Tracked").unwrap();
	assert_eq!(manager.len(), 2);

	outer.set_state(json!({"n": 1}));
	page.doc.remove(&section);
	let destroyed = manager.destroy_behaviors(&section);
	page.writes();
	page.flush();

	assert_eq!(destroyed, 2);
	assert_eq!(unmounted.get(), 2);
	assert!(manager.is_empty());
	assert_eq!(outer.phase(), Phase::Unmounted);
	assert!(page.writes().is_empty());

	outer.will_unmount();
	assert_eq!(unmounted.get(), 2);
}

/// A moved node is torn down and rebuilt by a remove-then-add sequence
#[rstest]
fn test_rescan_after_destroy_rebuilds(page: Page) {
	let mut manager = BehaviorManager::new(page.registry([toggle()]), Settings::default()).unwrap();
	let button = toggle_markup(&page);
	manager.create_behaviors(&button);
	let first = manager.behavior(&button, "Toggle").unwrap();

	manager.destroy_behaviors(&button);
	manager.create_behaviors(&button);

	let second = manager.behavior(&button, "Toggle").unwrap();
	assert_ne!(first, second);
	assert_eq!(manager.len(), 1);
}

// ============================================================================
// Category 4: Listener release
// ============================================================================

/// A child that listens on its own node and counts its unmounts.
fn chip(unmounted: &Rc<Cell<usize>>) -> Rc<BehaviorDefinition> {
	let counter = Rc::clone(unmounted);
	define("Chip")
		.prop_type("meta", PropType::Object)
		.handler("press", |_, _| {})
		.will_unmount(move |_| counter.set(counter.get() + 1))
		.render(RenderDescription::new().listeners(Listeners::new().on("click", |this, _| this.handler("press"))))
		.build()
}

/// A parent listening on itself and on each chip node.
fn chip_list() -> Rc<BehaviorDefinition> {
	define("ChipList")
		.handler("focus", |_, _| {})
		.handler("select", |_, _| {})
		.render(
			RenderDescription::new()
				.listeners(Listeners::new().on("focus", |this, _| this.handler("focus")))
				.children(
					"chip",
					ChildDescription::new().listeners(Listeners::new().on("change", |this, _| this.handler("select"))),
				),
		)
		.build()
}

/// Retried constructions that fail on a missing child leave no listener behind
#[rstest]
fn test_failed_construction_detaches_listeners(page: Page) {
	let registry = page.registry([toggle()]);
	let button = page.doc.append_to_body(element("button").attr("data-behavior", "Toggle"));

	for _ in 0..3 {
		let result = registry.initialize("Toggle", button.clone(), Props::new());
		assert!(matches!(result, Err(BehaviorError::MissingChild { .. })));
	}

	assert_eq!(page.doc.listener_count(&button, "click"), 0);
}

/// A child failing mid-pass releases the parent and the children built before it
#[rstest]
fn test_failed_child_releases_built_siblings(page: Page) {
	let unmounted = Rc::new(Cell::new(0));
	let registry = page.registry([chip_list(), chip(&unmounted)]);
	let list = page.doc.append_to_body(
		element("ul")
			.child(element("li").attr("data-chiplist-chip", "Chip"))
			.child(element("li").attr("data-chiplist-chip", "Chip").attr("data-chip-meta", "{oops")),
	);
	let first = list.descendants_with_attribute("data-chiplist-chip").remove(0);

	let err = registry.initialize("ChipList", list.clone(), Props::new()).unwrap_err();

	assert!(matches!(err, BehaviorError::InvalidPropJson { .. }));
	assert_eq!(page.doc.listener_count(&list, "focus"), 0);
	assert_eq!(page.doc.listener_count(&first, "click"), 0);
	assert_eq!(page.doc.listener_count(&first, "change"), 0);
	assert_eq!(unmounted.get(), 1);
}

/// Destroying a behavior detaches its listeners and unmounts the children it built
#[rstest]
fn test_destroy_detaches_listeners(page: Page) {
	let unmounted = Rc::new(Cell::new(0));
	let mut manager = BehaviorManager::new(page.registry([chip_list(), chip(&unmounted)]), Settings::default()).unwrap();
	let list = page.doc.append_to_body(
		element("ul")
			.attr("data-behavior", "ChipList")
			.child(element("li").attr("data-chiplist-chip", "Chip"))
			.child(element("li").attr("data-chiplist-chip", "Chip")),
	);
	manager.create_behaviors(&page.doc.body());
	let chips: Vec<Node> = manager
		.behavior(&list, "ChipList")
		.unwrap()
		.get_children("chip")
		.into_iter()
		.map(|child| child.node)
		.collect();
	assert_eq!(page.doc.listener_count(&list, "focus"), 1);
	assert!(chips.iter().all(|chip| page.doc.listener_count(chip, "click") == 1));

	page.doc.remove(&list);
	manager.destroy_behaviors(&list);

	assert_eq!(page.doc.listener_count(&list, "focus"), 0);
	for chip in &chips {
		assert_eq!(page.doc.listener_count(chip, "click"), 0);
		assert_eq!(page.doc.listener_count(chip, "change"), 0);
	}
	assert_eq!(unmounted.get(), 2);
}

/// Clicks after teardown reach nothing and schedule nothing
#[rstest]
fn test_click_after_destroy_is_ignored(page: Page) {
	let mut manager = BehaviorManager::new(page.registry([toggle()]), Settings::default()).unwrap();
	let button = toggle_markup(&page);
	manager.create_behaviors(&button);

	manager.destroy_behaviors(&button);
	page.doc.dispatch(&button, "click");

	assert_eq!(page.doc.listener_count(&button, "click"), 0);
	assert!(page.queue.is_empty());
	assert!(!button.has_class("is-on"));
}
