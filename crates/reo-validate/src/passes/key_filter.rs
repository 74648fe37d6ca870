//! Removal of keys the schema does not declare.

use crate::walker::{Pass, PassContext};
use log::debug;
use reo_schema::{ObjectPath, ObjectSchema};

/// Removes keys the schema does not declare at their level.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyFilter;

impl Pass for KeyFilter {
    fn name(&self) -> &'static str {
        "key_filter"
    }

    fn visit(&self, path: &ObjectPath, schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        let Some(node) = ctx.tree.object(path) else {
            return;
        };
        let unknown: Vec<String> = node
            .keys()
            .filter(|key| !schema.declares(key))
            .cloned()
            .collect();

        for key in unknown {
            debug!("dropping unknown input {key} in {path}");
            ctx.tree.remove(path, &key);
            ctx.report.invalid_input(key, path);
        }
    }
}
