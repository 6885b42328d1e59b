//! Common imports for writing behaviors.
//!
//! ```
//! use behave_core::prelude::*;
//! ```

pub use crate::behavior::{Behavior, ChildRef, Phase};
pub use crate::definition::{BehaviorDefinition, define};
pub use crate::error::{BehaviorError, BehaviorResult};
pub use crate::manager::{BehaviorManager, ScanReport};
pub use crate::props::{Callback, PropType, PropValue, Props};
pub use crate::registry::Registry;
pub use crate::render::{Attributes, ChildDescription, Listeners, RenderDescription};
pub use crate::scheduler::{Scheduler, TaskQueue};
pub use crate::settings::Settings;
pub use crate::state::{State, StateUpdate};
pub use crate::{debug_log, error_log, info_log, warn_log};

pub use behave_dom::{Event, Listener, Node};
