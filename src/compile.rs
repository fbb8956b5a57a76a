//! Whole-document compilation: graph first, then one lowering per schema.
use std::collections::HashMap;
use rayon::prelude::*;
use crate::config::CompilerConfig;
use crate::diagnostics::{CompileError, Warning, WarningKind};
use crate::graph::DependencyGraph;
use crate::ir::SchemaRegistry;
use crate::lower::Lowerer;
use crate::naming::Role;

/// One named schema's lowered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetExpression {
    pub name: String,
    pub identifier: String,
    pub expression: String,
    pub self_referential: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub schemas: Vec<TargetExpression>,    // dependency order
    pub warnings: Vec<Warning>,
    pub circular_groups: Vec<Vec<String>>,
}

impl Compilation {
    pub fn get(&self, name: &str) -> Option<&TargetExpression> {
        self.schemas.iter().find(|t| t.name == name)
    }
}

pub fn compile(registry: &SchemaRegistry, config: &CompilerConfig) -> Result<Compilation, CompileError> {
    let graph = DependencyGraph::build(registry)?;
    let order: Vec<&str> = graph.order().collect();

    let lowered: Vec<(TargetExpression, Vec<Warning>)> = if config.parallel {
        order
            .par_iter()
            .map(|name| lower_named(name, registry, &graph, config))
            .collect::<Result<_, _>>()?
    } else {
        order
            .iter()
            .map(|name| lower_named(name, registry, &graph, config))
            .collect::<Result<_, _>>()?
    };

    let mut schemas = Vec::with_capacity(lowered.len());
    let mut warnings = Vec::new();
    for (target, w) in lowered {
        schemas.push(target);
        warnings.extend(w);
    }
    warnings.extend(identifier_collisions(&schemas));
    let circular_groups = graph
        .circular_groups()
        .into_iter()
        .map(|g| g.into_iter().map(str::to_string).collect())
        .collect();

    tracing::info!(schemas = schemas.len(), warnings = warnings.len(), "compiled schema registry");
    Ok(Compilation { schemas, warnings, circular_groups })
}

/// Lower a single named schema against a prebuilt graph.
pub fn lower_named(
    name: &str,
    registry: &SchemaRegistry,
    graph: &DependencyGraph,
    config: &CompilerConfig,
) -> Result<(TargetExpression, Vec<Warning>), CompileError> {
    let mut lowerer = Lowerer::new(name, registry, graph, config);
    let body = registry.get(name).ok_or_else(|| CompileError::UnresolvedReference {
        schema: name.to_string(),
        pointer: name.to_string(),
    })?;
    let expression = lowerer.lower(body)?;
    let target = TargetExpression {
        name: name.to_string(),
        identifier: config.naming.identifier(name, Role::Schema),
        expression,
        self_referential: graph.is_cyclic(name),
    };
    Ok((target, lowerer.into_warnings()))
}

/// Later schemas whose identifier an earlier one already took.
fn identifier_collisions(schemas: &[TargetExpression]) -> Vec<Warning> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(schemas.len());
    let mut out = Vec::new();
    for t in schemas {
        match seen.get(t.identifier.as_str()) {
            Some(first) => out.push(Warning::new(
                &t.name,
                String::new(),
                WarningKind::IdentifierCollision,
                format!("identifier `{}` is also produced by `{first}`", t.identifier),
            )),
            None => {
                seen.insert(&t.identifier, &t.name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CompositionOp, EnumNode, ObjectNode, PrimitiveKind, SchemaNode};

    fn registry(entries: Vec<(&str, SchemaNode)>) -> SchemaRegistry {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn sample() -> SchemaRegistry {
        let mut pet = ObjectNode::new();
        pet.properties.insert("owner".into(), SchemaNode::reference("Owner"));
        pet.properties.insert("kind".into(), SchemaNode::Enum(EnumNode { values: vec![], declared_array: false }));
        pet.required.insert("owner".into());

        let mut category = ObjectNode::new();
        category.properties.insert("parent".into(), SchemaNode::reference("Category"));

        registry(vec![
            ("Pet", SchemaNode::Object(pet)),
            ("Category", SchemaNode::Object(category)),
            ("Owner", SchemaNode::primitive(PrimitiveKind::String)),
            ("Broken", SchemaNode::composition(CompositionOp::OneOf, vec![])),
        ])
    }

    #[test]
    fn output_follows_dependency_order() {
        let c = compile(&sample(), &CompilerConfig::default()).unwrap();
        let names: Vec<&str> = c.schemas.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Category", "Owner", "Pet", "Broken"]);
        assert_eq!(
            c.get("Pet").unwrap().expression,
            "z.object({ owner: OwnerSchema, kind: z.unknown().optional() })"
        );
        assert_eq!(c.get("Pet").unwrap().identifier, "PetSchema");
    }

    #[test]
    fn self_referential_flag_and_groups() {
        let c = compile(&sample(), &CompilerConfig::default()).unwrap();
        let category = c.get("Category").unwrap();
        assert!(category.self_referential);
        assert_eq!(category.expression, "z.object({ parent: z.lazy(() => CategorySchema).optional() })");
        assert!(!c.get("Pet").unwrap().self_referential);
        assert_eq!(c.circular_groups, vec![vec!["Category".to_string()]]);
    }

    #[test]
    fn warnings_are_accumulated_in_emission_order() {
        let c = compile(&sample(), &CompilerConfig::default()).unwrap();
        let kinds: Vec<(&str, WarningKind)> = c.warnings.iter().map(|w| (w.schema.as_str(), w.kind)).collect();
        assert_eq!(kinds, vec![("Pet", WarningKind::EmptyEnum), ("Broken", WarningKind::EmptyComposition)]);
        assert_eq!(c.warnings[0].path, "/properties/kind");
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let parallel = compile(&sample(), &CompilerConfig::default()).unwrap();
        let sequential = compile(&sample(), &CompilerConfig { parallel: false, ..CompilerConfig::default() }).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn unresolved_reference_fails_the_document() {
        let reg = registry(vec![
            ("Fine", SchemaNode::primitive(PrimitiveKind::Boolean)),
            ("Pet", SchemaNode::array(SchemaNode::reference("Ghost"))),
        ]);
        let err = compile(&reg, &CompilerConfig::default()).unwrap_err();
        assert_eq!(err, CompileError::UnresolvedReference { schema: "Pet".into(), pointer: "Ghost".into() });
    }

    #[test]
    fn colliding_identifiers_are_reported() {
        let reg = registry(vec![
            ("pet_owner", SchemaNode::primitive(PrimitiveKind::String)),
            ("PetOwner", SchemaNode::primitive(PrimitiveKind::Boolean)),
            ("Pet", SchemaNode::primitive(PrimitiveKind::Number)),
        ]);
        let c = compile(&reg, &CompilerConfig::default()).unwrap();
        assert_eq!(c.warnings.len(), 1);
        let w = &c.warnings[0];
        assert_eq!((w.schema.as_str(), w.kind), ("PetOwner", WarningKind::IdentifierCollision));
        assert!(w.message.contains("PetOwnerSchema") && w.message.contains("pet_owner"));
    }
}
