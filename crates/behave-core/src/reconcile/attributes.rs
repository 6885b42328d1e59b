use behave_dom::Node;
use serde_json::Value;

use super::AttributeCache;
use crate::behavior::Behavior;
use crate::render::Attributes;

/// Applies classList, style and property entries in that order, skipping every
/// key whose computed value equals the cached one.
pub(crate) fn reconcile_attributes(
	owner: &Behavior,
	node: &Node,
	attributes: &Attributes,
	cache: &mut AttributeCache,
	arg: Option<&Node>,
) {
	for (class, predicate) in &attributes.class_list {
		let wanted = predicate(owner, arg);
		if cache.class_list.get(class) == Some(&wanted) {
			continue;
		}
		if wanted {
			node.add_class(class);
		} else {
			node.remove_class(class);
		}
		cache.class_list.insert(class.clone(), wanted);
	}

	for (name, compute) in &attributes.style {
		let value = compute(owner, arg);
		if cache.style.get(name) == Some(&value) {
			continue;
		}
		let text = css_text(&value);
		if name.starts_with("--") {
			node.set_style_property(name, &text);
		} else {
			node.set_style(name, &text);
		}
		cache.style.insert(name.clone(), value);
	}

	for (name, compute) in &attributes.properties {
		let value = compute(owner, arg);
		if cache.properties.get(name) == Some(&value) {
			continue;
		}
		node.set_property(name, &value);
		cache.properties.insert(name.clone(), value);
	}
}

/// CSS text for a computed style value; `null` clears the declaration.
fn css_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(null), "")]
	#[case(json!("10px"), "10px")]
	#[case(json!(0.5), "0.5")]
	#[case(json!(3), "3")]
	fn test_css_text(#[case] value: Value, #[case] expected: &str) {
		assert_eq!(css_text(&value), expected);
	}
}
