//! Single-module renderer for a finished `Compilation`.
use crate::compile::{Compilation, TargetExpression};
use crate::naming::{NamingConfig, Role};

pub const HEADER: &str = "import { z } from \"zod\";\n";

/// One `export const` and one inferred `export type` per schema, in
/// compilation order.
pub fn render_module(compilation: &Compilation, naming: &NamingConfig) -> String {
    let mut out = String::from(HEADER);
    for target in &compilation.schemas {
        out.push('\n');
        out.push_str(&render_schema(target, naming));
    }
    out
}

fn render_schema(target: &TargetExpression, naming: &NamingConfig) -> String {
    let TargetExpression { name, identifier, expression, self_referential } = target;
    // recursive consts need an annotation or inference gives up
    let annotation = if *self_referential { ": z.ZodType<any>" } else { "" };
    let type_name = naming.identifier(name, Role::Type);
    format!(
        "export const {identifier}{annotation} = {expression};\n\
         export type {type_name} = z.infer<typeof {identifier}>;\n"
    )
}
