//! # behave
//!
//! Stateful behaviors for server-rendered pages.
//!
//! The server renders complete, usable HTML. Nodes marked with
//! `data-behavior="Name"` get a behavior instance that owns props and state
//! and keeps classes, inline styles, DOM properties and event listeners of its
//! node (and of marked descendants) in line with a declarative description.
//! Each reconciliation pass writes only the keys whose values changed.
//!
//! ## Crates
//!
//! - [`dom`]: the node seam (`DomNode`), events, listeners, and an in-memory
//!   document for hosts without a browser
//! - [`core`]: definitions, instances, reconciliation, registry, scheduler and
//!   the page manager
//!
//! ## Feature Flags
//!
//! - `debug-hooks` - enables `debug_log!` output from the engine
//!
//! ## Quick Example
//!
//! ```rust
//! use behave::prelude::*;
//! use behave::dom::{MemoryDocument, element};
//! use serde_json::json;
//!
//! let toggle = define("Toggle")
//!     .initial_state(|_| json!({"isOn": false}))
//!     .handler("toggle", |this, _| {
//!         let next = !this.state().bool("isOn");
//!         this.set_state(json!({"isOn": next}));
//!     })
//!     .render(
//!         RenderDescription::new()
//!             .listeners(Listeners::new().on("click", |this, _| this.handler("toggle")))
//!             .child(
//!                 "label",
//!                 ChildDescription::new().attributes(Attributes::new().property("textContent", |this, _| {
//!                     json!(if this.state().bool("isOn") { "On" } else { "Off" })
//!                 })),
//!             ),
//!     )
//!     .build();
//!
//! let queue = TaskQueue::new();
//! let registry = Registry::builder().register(toggle).scheduler(queue.clone()).build();
//! let doc = MemoryDocument::new();
//! let button = doc.append_to_body(
//!     element("button")
//!         .attr("data-behavior", "Toggle")
//!         .child(element("span").attr("data-toggle-label", "")),
//! );
//!
//! let mut manager = BehaviorManager::new(registry, Settings::default()).unwrap();
//! manager.create_behaviors(&doc.body());
//! assert_eq!(button.property("textContent"), json!("Off"));
//!
//! doc.dispatch(&button, "click");
//! queue.run_until_idle();
//! assert_eq!(button.property("textContent"), json!("On"));
//! ```

#![warn(missing_docs)]

pub mod dom;
pub mod prelude;

/// Behavior engine: definitions, instances and reconciliation.
pub mod core {
	pub use behave_core::*;
}

pub use behave_core::{
	Attributes, Behavior, BehaviorDefinition, BehaviorError, BehaviorManager, BehaviorResult, ChildDescription,
	Listeners, PropType, PropValue, Props, Registry, RenderDescription, Settings, State, StateUpdate, TaskQueue,
	define,
};
pub use behave_core::{debug_log, error_log, info_log, warn_log};
pub use behave_dom::{Event, Listener, Node};
