//! JSON merge helper for layered settings.

use serde_json::Value;

/// Merge overlay values into the base, recursively overriding objects.
///
/// Arrays and scalars in the overlay replace the base value wholesale.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_and_lists_replace() {
        let mut base = json!({"urdb": {"timeout_secs": 5, "restricted_labels": ["a", "b"]}});
        let overlay = json!({"urdb": {"restricted_labels": ["c"]}, "siting": {}});
        merge_json_values(&mut base, &overlay);
        assert_eq!(
            base,
            json!({
                "urdb": {"timeout_secs": 5, "restricted_labels": ["c"]},
                "siting": {}
            })
        );
    }
}
