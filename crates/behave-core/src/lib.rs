//! behave core - stateful behaviors reconciled onto server-rendered DOM
//!
//! Server-rendered markup stays the source of structure. A behavior attaches
//! to an existing node, keeps props and state, and declares through a
//! [`RenderDescription`] which classes, styles, properties and listeners that
//! node and its marked descendants should carry. Each pass writes only what
//! changed since the previous one.
//!
//! ## Architecture
//!
//! - [`definition`]: [`BehaviorDefinition`] and its builder ([`define`])
//! - [`behavior`]: live instances, `set_state` / `set_props`, lifecycle
//! - [`render`]: the render description types
//! - `reconcile`: attribute, listener and child-group reconciliation
//! - [`registry`]: name lookup and the scheduler shared by instances
//! - [`scheduler`]: deferred execution of state-triggered passes
//! - [`manager`]: page scanning, creation and teardown
//! - [`settings`]: manager configuration
//!
//! ## Example
//!
//! ```
//! use behave_core::prelude::*;
//! use behave_dom::{MemoryDocument, element};
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
//!             .attributes(Attributes::new().class("is-on", |this, _| this.state().bool("isOn")))
//!             .listeners(Listeners::new().on("click", |this, _| this.handler("toggle"))),
//!     )
//!     .build();
//!
//! let queue = TaskQueue::new();
//! let registry = Registry::builder().register(toggle).scheduler(queue.clone()).build();
//! let doc = MemoryDocument::new();
//! let button = doc.append_to_body(element("button").attr("data-behavior", "Toggle"));
//!
//! let mut manager = BehaviorManager::new(registry, Settings::default()).unwrap();
//! manager.create_behaviors(&doc.body());
//!
//! doc.dispatch(&button, "click");
//! queue.run_until_idle();
//! assert!(button.has_class("is-on"));
//! ```

#![warn(missing_docs)]

pub mod behavior;
pub mod definition;
pub mod error;
pub mod logging;
pub mod manager;
pub mod props;
mod reconcile;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod state;

pub mod prelude;

pub use behavior::{Behavior, ChildRef, Phase, WeakBehavior};
pub use definition::{BehaviorBuilder, BehaviorDefinition, define};
pub use error::{BehaviorError, BehaviorResult};
#[cfg(target_arch = "wasm32")]
pub use manager::observe;
pub use manager::{BehaviorManager, ScanReport};
pub use props::{Callback, PropType, PropValue, Props, is_truthy};
pub use registry::{Registry, RegistryBuilder};
pub use render::{Attributes, Cardinality, ChildDescription, ChildGroup, ChildTemplate, Listeners, RenderDescription};
#[cfg(target_arch = "wasm32")]
pub use scheduler::TimeoutScheduler;
pub use scheduler::{Scheduler, Task, TaskQueue};
pub use settings::{Settings, SettingsError, SettingsResult};
pub use state::{State, StateUpdate};

#[doc(hidden)]
pub mod __private {
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
