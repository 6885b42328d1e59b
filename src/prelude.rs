//! Everything needed to define behaviors and run them on a page.
//!
//! ```
//! use behave::prelude::*;
//! ```

pub use behave_core::prelude::*;
