//! Shared fixtures for the integration suites.
//!
//! Every suite drives deferred passes through a [`TaskQueue`] it owns, and
//! observes DOM writes through the [`MemoryDocument`] mutation log.

#![allow(dead_code)]

use std::rc::Rc;

use behave_core::prelude::*;
use behave_dom::{MemoryDocument, Mutation};
use rstest::fixture;
use serde_json::json;

/// A document plus the queue its registry defers to.
pub struct Page {
	pub doc: MemoryDocument,
	pub queue: TaskQueue,
}

impl Page {
	/// Registry over `definitions` that defers to this page's queue.
	pub fn registry(&self, definitions: impl IntoIterator<Item = Rc<BehaviorDefinition>>) -> Registry {
		definitions
			.into_iter()
			.fold(Registry::builder(), |builder, definition| builder.register(definition))
			.scheduler(self.queue.clone())
			.build()
	}

	/// Runs every deferred pass, including passes scheduled by those passes.
	pub fn flush(&self) -> usize {
		self.queue.run_until_idle()
	}

	/// Drains the mutation log.
	pub fn writes(&self) -> Vec<Mutation> {
		self.doc.take_mutations()
	}
}

#[fixture]
pub fn page() -> Page {
	Page {
		doc: MemoryDocument::new(),
		queue: TaskQueue::new(),
	}
}

/// The Toggle behavior: `is-on` class on the node, "On"/"Off" in the label
/// child, click flips the state.
pub fn toggle() -> Rc<BehaviorDefinition> {
	define("Toggle")
		.initial_state(|_| json!({"isOn": false}))
		.handler("toggle", |this, _| {
			let next = !this.state().bool("isOn");
			this.set_state(json!({"isOn": next}));
		})
		.render(
			RenderDescription::new()
				.attributes(Attributes::new().class("is-on", |this, _| this.state().bool("isOn")))
				.listeners(Listeners::new().on("click", |this, _| this.handler("toggle")))
				.child(
					"label",
					ChildDescription::new().attributes(Attributes::new().property("textContent", |this, _| {
						json!(if this.state().bool("isOn") { "On" } else { "Off" })
					})),
				),
		)
		.build()
}
