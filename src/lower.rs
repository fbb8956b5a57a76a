//! Lowering: `SchemaNode` → target expression.
//!
//! One `Lowerer` per named schema. It owns nothing but the warning list and
//! the current path, so independent schemas can be lowered in parallel.
pub mod primitive;
pub mod enums;
pub mod compose;
pub mod object;
pub mod reference;

use std::fmt::Display;
use crate::config::CompilerConfig;
use crate::diagnostics::{CompileError, Warning, WarningKind};
use crate::graph::DependencyGraph;
use crate::ir::{ArrayNode, SchemaNode, SchemaRegistry};

/// Universal/unknown-accepting expression.
pub const UNKNOWN: &str = "z.unknown()";

pub struct Lowerer<'a> {
    registry: &'a SchemaRegistry,
    graph: &'a DependencyGraph,
    config: &'a CompilerConfig,
    schema: &'a str,
    path: Vec<String>,
    warnings: Vec<Warning>,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        schema: &'a str,
        registry: &'a SchemaRegistry,
        graph: &'a DependencyGraph,
        config: &'a CompilerConfig,
    ) -> Self {
        Self { registry, graph, config, schema, path: Vec::new(), warnings: Vec::new() }
    }

    pub fn lower(&mut self, node: &SchemaNode) -> Result<String, CompileError> {
        match node {
            SchemaNode::Primitive(p) => Ok(primitive::lower_primitive(p)),
            SchemaNode::Array(a) => self.lower_array(a),
            SchemaNode::Object(o) => self.lower_object(o),
            SchemaNode::Enum(e) => match enums::lower_enum(e) {
                Some(expr) => Ok(expr),
                None => {
                    self.warn(WarningKind::EmptyEnum, "enum has no values; accepting any value");
                    Ok(UNKNOWN.to_string())
                }
            },
            SchemaNode::Composition(c) => self.lower_composition(c),
            SchemaNode::Reference(r) => self.lower_reference(r),
            SchemaNode::NullableMarker => Ok("z.null()".to_string()),
            SchemaNode::Any => Ok(UNKNOWN.to_string()),
            SchemaNode::Unsupported { tag } => {
                self.warn(
                    WarningKind::UnsupportedPrimitive,
                    format!("unsupported type `{tag}`; accepting any value"),
                );
                Ok(UNKNOWN.to_string())
            }
        }
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    fn lower_array(&mut self, a: &ArrayNode) -> Result<String, CompileError> {
        let item = self.lower_at("items", &a.items)?;
        let mut out = format!("z.array({item})");
        out.push_str(&primitive::length_clauses(a.min_items, a.max_items));
        Ok(out)
    }

    /// Lower a child node one path segment deeper.
    pub(crate) fn lower_at(&mut self, segment: impl Display, node: &SchemaNode) -> Result<String, CompileError> {
        self.path.push(segment.to_string());
        let out = self.lower(node);
        self.path.pop();
        out
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let path: String = self.path.iter().map(|s| format!("/{s}")).collect();
        self.warnings.push(Warning::new(self.schema, path, kind, message));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Lower `name` from `registry` with the default config.
    pub fn lower_named(registry: &SchemaRegistry, name: &str) -> (String, Vec<Warning>) {
        lower_named_with(registry, name, &CompilerConfig::default())
    }

    pub fn lower_named_with(registry: &SchemaRegistry, name: &str, config: &CompilerConfig) -> (String, Vec<Warning>) {
        let graph = DependencyGraph::build(registry).unwrap();
        let mut lowerer = Lowerer::new(name, registry, &graph, config);
        let expr = lowerer.lower(&registry[name]).unwrap();
        (expr, lowerer.into_warnings())
    }

    /// Lower a standalone node as the single schema `Root`.
    pub fn lower_one(node: SchemaNode) -> (String, Vec<Warning>) {
        let registry: SchemaRegistry = [("Root".to_string(), node)].into_iter().collect();
        lower_named(&registry, "Root")
    }
}
