use crate::diagnostics::{CompileError, WarningKind};
use crate::ir::{CompositionNode, CompositionOp, SchemaNode};
use super::{Lowerer, UNKNOWN};

impl Lowerer<'_> {
    pub(super) fn lower_composition(&mut self, c: &CompositionNode) -> Result<String, CompileError> {
        match c.op {
            CompositionOp::AllOf => self.lower_all_of(&c.members),
            CompositionOp::OneOf | CompositionOp::AnyOf => self.lower_union(c.op, &c.members),
            CompositionOp::Not => {
                // no negation in the target language
                tracing::debug!(schema = self.schema, "`not` lowered to the universal expression");
                Ok(UNKNOWN.to_string())
            }
        }
    }

    /// Intersection. Markers only add `.nullable()`; a singleton is not wrapped.
    fn lower_all_of(&mut self, members: &[SchemaNode]) -> Result<String, CompileError> {
        if members.is_empty() {
            self.warn(WarningKind::EmptyComposition, "allOf has no members; accepting any value");
            return Ok(UNKNOWN.to_string());
        }
        let (nullable, real) = self.lower_members("allOf", members)?;
        let core = match real.split_first() {
            None => UNKNOWN.to_string(),
            Some((first, rest)) => {
                let mut out = first.clone();
                for r in rest {
                    out.push_str(&format!(".and({r})"));
                }
                out
            }
        };
        Ok(with_nullable(core, nullable))
    }

    fn lower_union(&mut self, op: CompositionOp, members: &[SchemaNode]) -> Result<String, CompileError> {
        let key = if op == CompositionOp::OneOf { "oneOf" } else { "anyOf" };
        if members.is_empty() {
            self.warn(WarningKind::EmptyComposition, format!("{key} has no members; accepting any value"));
            return Ok(UNKNOWN.to_string());
        }
        let (nullable, mut real) = self.lower_members(key, members)?;
        let core = match real.len() {
            0 => return Ok("z.null()".to_string()),
            1 => real.remove(0),
            _ => format!("z.union([{}])", real.join(", ")),
        };
        Ok(with_nullable(core, nullable))
    }

    /// Split off nullability markers; lower the rest in order.
    fn lower_members(&mut self, key: &str, members: &[SchemaNode]) -> Result<(bool, Vec<String>), CompileError> {
        let mut nullable = false;
        let mut real = Vec::with_capacity(members.len());
        for (i, m) in members.iter().enumerate() {
            if matches!(m, SchemaNode::NullableMarker) {
                nullable = true;
                continue;
            }
            real.push(self.lower_at(format!("{key}/{i}"), m)?);
        }
        Ok((nullable, real))
    }
}

fn with_nullable(expr: String, nullable: bool) -> String {
    if nullable { format!("{expr}.nullable()") } else { expr }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::WarningKind;
    use crate::ir::{CompositionOp, ObjectNode, PrimitiveKind, SchemaNode, SchemaRegistry};
    use crate::lower::test_support::{lower_named, lower_one};
    use crate::lower::UNKNOWN;

    fn string() -> SchemaNode { SchemaNode::primitive(PrimitiveKind::String) }
    fn all_of(members: Vec<SchemaNode>) -> SchemaNode {
        SchemaNode::composition(CompositionOp::AllOf, members)
    }

    #[test]
    fn all_of_singleton_lowers_like_its_member() {
        let direct = lower_one(string()).0;
        assert_eq!(lower_one(all_of(vec![string()])).0, direct);
    }

    #[test]
    fn all_of_empty_is_universal_with_warning() {
        let (expr, warnings) = lower_one(all_of(vec![]));
        assert_eq!(expr, UNKNOWN);
        assert_eq!(warnings[0].kind, WarningKind::EmptyComposition);
    }

    #[test]
    fn all_of_markers() {
        let (expr, warnings) = lower_one(all_of(vec![SchemaNode::NullableMarker]));
        assert_eq!(expr, "z.unknown().nullable()");
        assert!(warnings.is_empty());

        let expr = lower_one(all_of(vec![string(), SchemaNode::NullableMarker])).0;
        assert_eq!(expr, "z.string().nullable()");
    }

    #[test]
    fn all_of_many_is_an_intersection_of_resolved_refs() {
        let reg: SchemaRegistry = [
            ("Base".to_string(), SchemaNode::Object(ObjectNode::new())),
            ("Extra".to_string(), SchemaNode::Object(ObjectNode::new())),
            (
                "Both".to_string(),
                all_of(vec![
                    SchemaNode::reference("Base"),
                    SchemaNode::NullableMarker,
                    SchemaNode::reference("Extra"),
                    string(),
                ]),
            ),
        ]
        .into_iter()
        .collect();
        let (expr, _) = lower_named(&reg, "Both");
        assert_eq!(expr, "BaseSchema.and(ExtraSchema).and(z.string()).nullable()");
    }

    #[test]
    fn union_of_refs_preserves_order() {
        let reg: SchemaRegistry = [
            ("A".to_string(), string()),
            ("B".to_string(), SchemaNode::primitive(PrimitiveKind::Number)),
            (
                "AOrB".to_string(),
                SchemaNode::composition(
                    CompositionOp::OneOf,
                    vec![SchemaNode::reference("B"), SchemaNode::reference("A")],
                ),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(lower_named(&reg, "AOrB").0, "z.union([BSchema, ASchema])");
    }

    #[test]
    fn union_edge_cases() {
        let (expr, warnings) = lower_one(SchemaNode::composition(CompositionOp::AnyOf, vec![]));
        assert_eq!(expr, UNKNOWN);
        assert_eq!(warnings[0].kind, WarningKind::EmptyComposition);
        assert!(warnings[0].message.contains("anyOf"));

        let single = SchemaNode::composition(CompositionOp::AnyOf, vec![string(), SchemaNode::NullableMarker]);
        assert_eq!(lower_one(single).0, "z.string().nullable()");

        let only_null = SchemaNode::composition(CompositionOp::OneOf, vec![SchemaNode::NullableMarker]);
        assert_eq!(lower_one(only_null).0, "z.null()");
    }

    #[test]
    fn not_degrades_to_universal() {
        let node = SchemaNode::composition(CompositionOp::Not, vec![string()]);
        let (expr, warnings) = lower_one(node);
        assert_eq!(expr, UNKNOWN);
        assert!(warnings.is_empty());
    }

    #[test]
    fn nested_warning_paths() {
        let node = SchemaNode::composition(
            CompositionOp::OneOf,
            vec![string(), all_of(vec![])],
        );
        let (expr, warnings) = lower_one(node);
        assert_eq!(expr, "z.union([z.string(), z.unknown()])");
        assert_eq!(warnings[0].path, "/oneOf/1");
    }
}
