//! DOM seam: node handles, events, listeners and the in-memory document.
//!
//! On `wasm32` the `web` backend wraps `web_sys::Element`
//! so browser elements convert into [`Node`](behave_dom::Node) handles.

// Re-export all behave-dom functionality
pub use behave_dom::*;
