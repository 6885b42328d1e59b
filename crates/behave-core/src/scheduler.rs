//! Deferred execution for state-triggered passes.
//!
//! `set_state` never reconciles synchronously. It hands a task to the
//! registry's [`Scheduler`], which runs it after the current call stack
//! unwinds. In the browser that is a zero-delay `setTimeout`; natively the host
//! drives a [`TaskQueue`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks later, in submission order.
pub trait Scheduler {
	/// Queues `task`.
	fn defer(&self, task: Task);

	/// Runs queued work now, if the scheduler supports it. Returns the number
	/// of tasks run.
	fn flush(&self) -> usize {
		0
	}
}

/// A FIFO of tasks drained explicitly by the host.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
	tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
	/// Empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of queued tasks.
	pub fn len(&self) -> usize {
		self.tasks.borrow().len()
	}

	/// Whether nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.tasks.borrow().is_empty()
	}

	/// Runs the tasks queued at the time of the call. Tasks they queue wait
	/// for the next call.
	pub fn run_pending(&self) -> usize {
		let queued = self.len();
		let mut ran = 0;
		for _ in 0..queued {
			let Some(task) = self.pop() else {
				break;
			};
			task();
			ran += 1;
		}
		ran
	}

	/// Runs tasks until the queue is empty, including tasks queued meanwhile.
	pub fn run_until_idle(&self) -> usize {
		let mut ran = 0;
		while let Some(task) = self.pop() {
			task();
			ran += 1;
		}
		ran
	}

	fn pop(&self) -> Option<Task> {
		self.tasks.borrow_mut().pop_front()
	}
}

impl Scheduler for TaskQueue {
	fn defer(&self, task: Task) {
		self.tasks.borrow_mut().push_back(task);
	}

	fn flush(&self) -> usize {
		self.run_until_idle()
	}
}

impl fmt::Debug for TaskQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TaskQueue").field("len", &self.len()).finish()
	}
}

/// Defers tasks with `setTimeout(task, 0)`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

#[cfg(target_arch = "wasm32")]
impl Scheduler for TimeoutScheduler {
	fn defer(&self, task: Task) {
		use wasm_bindgen::JsCast;
		use wasm_bindgen::closure::Closure;

		let Some(window) = web_sys::window() else {
			crate::error_log!("No window available; deferred update dropped");
			return;
		};
		let callback = Closure::once_into_js(move || task());
		if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0) {
			crate::error_log!("setTimeout failed: {:?}", err);
		}
	}
}

/// Scheduler used when the registry is built without one.
pub(crate) fn default_scheduler() -> Rc<dyn Scheduler> {
	#[cfg(target_arch = "wasm32")]
	{
		Rc::new(TimeoutScheduler)
	}
	#[cfg(not(target_arch = "wasm32"))]
	{
		Rc::new(TaskQueue::new())
	}
}
