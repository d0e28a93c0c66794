//! Property maps and property-diff emission.
//!
//! An options object handed to `create_*`/`edit_*` is split into one
//! single-key map per entry, in insertion order; each becomes the props of
//! one update step.

use serde_json::{Map, Value};
use tracing::warn;

/// Ordered property mapping carried by update steps.
pub type Props = Map<String, Value>;

/// Conversion into an ordered property map.
pub trait IntoProps {
    /// Convert into props, keeping key order.
    fn into_props(self) -> Props;
}

impl IntoProps for Props {
    fn into_props(self) -> Props {
        self
    }
}

impl IntoProps for Value {
    /// Objects convert entry by entry. Any other JSON value carries no
    /// properties.
    fn into_props(self) -> Props {
        match self {
            Value::Object(map) => map,
            Value::Null => Props::new(),
            other => {
                warn!(value = %other, "options value is not an object; no props emitted");
                Props::new()
            }
        }
    }
}

impl<K, V> IntoProps for Vec<(K, V)>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_props(self) -> Props {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

impl<K, V, const N: usize> IntoProps for [(K, V); N]
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_props(self) -> Props {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

/// Split an options object into single-key prop maps, preserving key order.
pub fn split_props(props: Props) -> impl Iterator<Item = Props> {
    props.into_iter().map(|(key, value)| single_prop(key, value))
}

/// Build a props map holding one key.
pub fn single_prop(key: impl Into<String>, value: Value) -> Props {
    let mut props = Props::new();
    props.insert(key.into(), value);
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(props: Props) -> Vec<String> {
        split_props(props)
            .map(|p| {
                assert_eq!(p.len(), 1);
                p.keys().next().cloned().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_split_props_preserves_key_order() {
        let props = json!({ "name": "Full Name", "type": "Symbol", "localized": false });
        assert_eq!(keys(props.into_props()), vec!["name", "type", "localized"]);

        // Not alphabetical.
        let props = json!({ "zeta": 1, "alpha": 2 });
        assert_eq!(keys(props.into_props()), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_tuple_conversions() {
        let props = [("type", json!("Symbol")), ("name", json!("Full Name"))].into_props();
        assert_eq!(keys(props), vec!["type", "name"]);

        let props = vec![("omitted", true)].into_props();
        assert_eq!(props["omitted"], json!(true));
    }

    #[test]
    fn test_non_object_values_carry_no_props() {
        assert!(Value::Null.into_props().is_empty());
        assert!(json!("scalar").into_props().is_empty());
        assert!(json!([1, 2]).into_props().is_empty());
    }

    #[test]
    fn test_single_prop() {
        let props = single_prop("displayField", json!("favorite"));
        assert_eq!(Value::Object(props), json!({ "displayField": "favorite" }));
    }
}
