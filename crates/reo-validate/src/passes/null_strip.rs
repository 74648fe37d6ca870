//! Removal of attributes explicitly set to null.

use crate::walker::{Pass, PassContext};
use reo_schema::{KeyKind, ObjectPath, ObjectSchema};

/// Deletes attributes explicitly set to null.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStrip;

impl Pass for NullStrip {
    fn name(&self) -> &'static str {
        "null_strip"
    }

    fn visit(&self, path: &ObjectPath, _schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        let Some(node) = ctx.tree.object(path) else {
            return;
        };
        let nulls: Vec<String> = node
            .iter()
            .filter(|(key, value)| KeyKind::is_attribute(key) && value.is_null())
            .map(|(key, _)| key.clone())
            .collect();

        for key in nulls {
            ctx.tree.remove(path, &key);
            ctx.report.input_as_none(key, path);
        }
    }
}
