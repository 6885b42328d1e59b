//! behave DOM - the node seam the reconciliation engine writes through
//!
//! The engine never talks to a concrete DOM. It holds [`Node`] handles, which
//! wrap any [`DomNode`] implementation, and it attaches [`Listener`]s that
//! receive [`Event`]s.
//!
//! ## Backends
//!
//! - [`memory`]: an arena document that records every mutation. Used by hosts
//!   without a browser and by the test suites, where mutation counts are the
//!   observable result of a reconciliation pass.
//! - [`web`] (wasm32 only): wraps `web_sys::Element`.
//!
//! ## Attribute names
//!
//! HTML attribute names are case-insensitive. Both backends expect lookups to
//! use lowercase names; [`data_attribute`] builds the lowercase `data-*` names
//! used for discovery.

#![warn(missing_docs)]

mod event;
mod node;

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use event::{Event, Listener};
pub use memory::{ElementBuilder, MemoryDocument, MemoryNode, Mutation, NodeId, element};
pub use node::{DomNode, Node};

/// Builds a discovery attribute name such as `data-toggle-label`.
///
/// Every segment is ASCII-lowercased, matching how HTML parsers store
/// attribute names.
///
/// # Example
///
/// ```
/// assert_eq!(behave_dom::data_attribute(&["Toggle", "label"]), "data-toggle-label");
/// assert_eq!(behave_dom::data_attribute(&["behavior"]), "data-behavior");
/// ```
pub fn data_attribute(segments: &[&str]) -> String {
	let mut name = String::from("data");
	for segment in segments {
		name.push('-');
		name.push_str(&segment.to_ascii_lowercase());
	}
	name
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(&["MyBehavior", "mychild"], "data-mybehavior-mychild")]
	#[case(&["FilterContainer", "filterControl"], "data-filtercontainer-filtercontrol")]
	#[case(&["behavior"], "data-behavior")]
	fn test_data_attribute_lowercases_segments(#[case] segments: &[&str], #[case] expected: &str) {
		assert_eq!(data_attribute(segments), expected);
	}
}
