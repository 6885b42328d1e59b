//! Name-to-definition lookup shared by the manager and the child reconciler.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use behave_dom::Node;

use crate::behavior::Behavior;
use crate::definition::BehaviorDefinition;
use crate::error::{BehaviorError, BehaviorResult};
use crate::props::Props;
use crate::scheduler::{Scheduler, default_scheduler};

/// The set of loaded behaviors plus the scheduler their instances use.
///
/// Immutable after [`RegistryBuilder::build`]; clones share the same data.
#[derive(Clone)]
pub struct Registry {
	inner: Rc<RegistryInner>,
}

struct RegistryInner {
	definitions: HashMap<String, Rc<BehaviorDefinition>>,
	scheduler: Rc<dyn Scheduler>,
}

impl Registry {
	/// Starts a registry.
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::default()
	}

	/// Looks a definition up by name.
	pub fn definition(&self, name: &str) -> BehaviorResult<&Rc<BehaviorDefinition>> {
		self.inner
			.definitions
			.get(name)
			.ok_or_else(|| BehaviorError::UnknownBehavior { name: name.to_string() })
	}

	/// Whether `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.inner.definitions.contains_key(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.inner.definitions.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Number of registered behaviors.
	pub fn len(&self) -> usize {
		self.inner.definitions.len()
	}

	/// Whether no behavior is registered.
	pub fn is_empty(&self) -> bool {
		self.inner.definitions.is_empty()
	}

	/// Scheduler for deferred passes.
	pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
		&self.inner.scheduler
	}

	/// Runs deferred work now when the scheduler supports it.
	pub fn flush(&self) -> usize {
		self.inner.scheduler.flush()
	}

	/// Instantiates behavior `name` on `node`.
	pub fn initialize(&self, name: &str, node: Node, props: Props) -> BehaviorResult<Behavior> {
		self.definition(name)?.initialize(node, self, props)
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry").field("behaviors", &self.names()).finish_non_exhaustive()
	}
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
	definitions: HashMap<String, Rc<BehaviorDefinition>>,
	scheduler: Option<Rc<dyn Scheduler>>,
}

impl RegistryBuilder {
	/// Adds a definition. A later definition with the same name replaces the
	/// earlier one.
	pub fn register(mut self, definition: Rc<BehaviorDefinition>) -> Self {
		let name = definition.name().to_string();
		if self.definitions.insert(name.clone(), definition).is_some() {
			crate::warn_log!("Behavior {} registered twice; keeping the last definition", name);
		}
		self
	}

	/// Uses `scheduler` for deferred passes.
	pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
		self.scheduler = Some(Rc::new(scheduler));
		self
	}

	/// Finishes the registry. Without an explicit scheduler, browser builds
	/// defer with `setTimeout` and native builds queue tasks until
	/// [`Registry::flush`].
	pub fn build(self) -> Registry {
		Registry {
			inner: Rc::new(RegistryInner {
				definitions: self.definitions,
				scheduler: self.scheduler.unwrap_or_else(default_scheduler),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::define;
	use rstest::rstest;

	#[rstest]
	fn test_unknown_name_is_an_error() {
		let registry = Registry::builder().register(define("Toggle").build()).build();

		assert!(registry.contains("Toggle"));
		let err = registry.definition("Missing").unwrap_err();
		assert!(matches!(err, BehaviorError::UnknownBehavior { ref name } if name == "Missing"));
	}

	#[rstest]
	fn test_last_registration_wins() {
		let first = define("Toggle").build();
		let second = define("Toggle").build();
		let registry = Registry::builder()
			.register(first)
			.register(Rc::clone(&second))
			.register(define("Overlay").build())
			.build();

		assert_eq!(registry.names(), vec!["Overlay", "Toggle"]);
		assert!(Rc::ptr_eq(registry.definition("Toggle").unwrap(), &second));
	}
}
