//! Property-based tests for reconciliation
//!
//! Uses proptest to verify, over arbitrary sequences of state updates:
//! 1. A pass that follows another pass with the same inputs writes nothing
//! 2. The DOM always matches the last committed state
//! 3. Each pass writes at most one call per changed key

use behave_core::prelude::*;
use behave_dom::{MemoryDocument, element};
use proptest::prelude::*;
use serde_json::{Value, json};

fn widget() -> std::rc::Rc<BehaviorDefinition> {
	define("Widget")
		.initial_state(|_| json!({"active": false, "width": null, "title": ""}))
		.render(
			RenderDescription::new().attributes(
				Attributes::new()
					.class("is-active", |this, _| this.state().bool("active"))
					.style("width", |this, _| this.state().value("width"))
					.property("title", |this, _| this.state().value("title")),
			),
		)
		.build()
}

fn update() -> impl Strategy<Value = (bool, Option<u8>, String)> {
	(any::<bool>(), proptest::option::of(0u8..4), "[a-c]{0,2}")
}

fn width(value: Option<u8>) -> Value {
	value.map_or(Value::Null, |px| json!(format!("{}px", px)))
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Property: reconciling twice with the same inputs is a no-op the second time
	#[test]
	fn test_second_pass_is_silent(updates in proptest::collection::vec(update(), 1..12)) {
		let queue = TaskQueue::new();
		let registry = Registry::builder().register(widget()).scheduler(queue.clone()).build();
		let doc = MemoryDocument::new();
		let node = doc.append_to_body(element("div"));
		let widget = registry.initialize("Widget", node.clone(), Props::new()).unwrap();

		let mut previous = (false, None, String::new());
		for (active, px, title) in updates {
			doc.clear_mutations();
			widget.set_state(json!({"active": active, "width": width(px), "title": title}));
			queue.run_until_idle();

			let changed = usize::from(active != previous.0)
				+ usize::from(px != previous.1)
				+ usize::from(title != previous.2);
			prop_assert_eq!(doc.mutation_count(), changed);

			prop_assert_eq!(node.has_class("is-active"), active);
			prop_assert_eq!(node.style("width"), px.map(|px| format!("{}px", px)).unwrap_or_default());
			prop_assert_eq!(node.property("title"), json!(title.clone()));

			doc.clear_mutations();
			widget.set_props(Props::new()).unwrap();
			prop_assert_eq!(doc.mutation_count(), 0);

			previous = (active, px, title);
		}
	}
}
