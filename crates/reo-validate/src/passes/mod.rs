//! The ordered validation passes.
//!
//! Each pass is a complete traversal; later passes rely on what earlier ones
//! established (no unknown keys, no nulls, typed values, defaults present).

mod default_filler;
mod key_filter;
mod null_strip;
mod range_checker;
mod required_resolver;
mod special_rules;
mod type_coercion;

pub use default_filler::DefaultFiller;
pub use key_filter::KeyFilter;
pub use null_strip::NullStrip;
pub use range_checker::RangeChecker;
pub use required_resolver::RequiredResolver;
pub use special_rules::SpecialCaseRules;
pub use type_coercion::TypeCoercion;

use crate::walker::Pass;
use serde_json::{Map, Value};

/// Passes in the order they must run.
pub fn pipeline() -> [&'static dyn Pass; 7] {
    [
        &KeyFilter,
        &NullStrip,
        &TypeCoercion,
        &DefaultFiller,
        &RangeChecker,
        &RequiredResolver,
        &SpecialCaseRules,
    ]
}

/// Render a value inside a message; strings appear without quotes.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// True when `key` holds a non-null value.
pub(crate) fn is_present(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pipeline_order_is_fixed() {
        let names: Vec<_> = pipeline().iter().map(|pass| pass.name()).collect();
        assert_eq!(
            names,
            vec![
                "key_filter",
                "null_strip",
                "type_coercion",
                "default_filler",
                "range_checker",
                "required_resolver",
                "special_case_rules",
            ]
        );
    }
}
