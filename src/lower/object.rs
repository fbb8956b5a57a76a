use once_cell::sync::Lazy;
use regex::Regex;
use crate::diagnostics::CompileError;
use crate::ir::{Extra, ObjectNode};
use crate::path_de::escape_pointer;
use super::enums::string_literal;
use super::Lowerer;

static BARE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static regex")
});

impl Lowerer<'_> {
    pub(super) fn lower_object(&mut self, o: &ObjectNode) -> Result<String, CompileError> {
        if let Extra::Typed(value) = &o.extra {
            let value = self.lower_at("additionalProperties", value)?;
            return Ok(format!("z.record(z.string(), {value})"));
        }

        let mut fields = Vec::with_capacity(o.properties.len());
        for (name, node) in &o.properties {
            let mut expr = self.lower_at(format!("properties/{}", escape_pointer(name)), node)?;
            if !o.required.contains(name) {
                expr.push_str(".optional()");
            }
            fields.push(format!("{}: {expr}", property_key(name)));
        }

        let mut out = if fields.is_empty() {
            "z.object({})".to_string()
        } else {
            format!("z.object({{ {} }})", fields.join(", "))
        };
        match (&o.extra, self.config.strict_objects) {
            (Extra::Closed, _) | (Extra::Default, true) => out.push_str(".strict()"),
            (Extra::Open, _) => out.push_str(".passthrough()"),
            (Extra::Default, false) | (Extra::Typed(_), _) => {}
        }
        Ok(out)
    }
}

fn property_key(name: &str) -> String {
    if BARE_KEY.is_match(name) { name.to_string() } else { string_literal(name) }
}


#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::ir::{Extra, ObjectNode, PrimitiveKind, SchemaNode, SchemaRegistry};
    use crate::lower::test_support::{lower_named_with, lower_one};

    fn object(props: &[(&str, SchemaNode)], required: &[&str], extra: Extra) -> SchemaNode {
        let mut o = ObjectNode::new();
        for (k, v) in props {
            o.properties.insert(k.to_string(), v.clone());
        }
        o.required = required.iter().map(|s| s.to_string()).collect();
        o.extra = extra;
        SchemaNode::Object(o)
    }

    #[test]
    fn simple_object_required_and_optional() {
        let node = object(
            &[
                ("id", SchemaNode::primitive(PrimitiveKind::String)),
                ("active", SchemaNode::primitive(PrimitiveKind::Boolean)),
            ],
            &["id"],
            Extra::Default,
        );
        assert_eq!(
            lower_one(node).0,
            "z.object({ id: z.string(), active: z.boolean().optional() })"
        );
    }

    #[test]
    fn dangling_required_names_are_ignored() {
        let node = object(&[("a", SchemaNode::Any)], &["a", "ghost"], Extra::Default);
        assert_eq!(lower_one(node).0, "z.object({ a: z.unknown() })");
    }

    #[test]
    fn extra_policies() {
        let closed = object(&[], &[], Extra::Closed);
        assert_eq!(lower_one(closed).0, "z.object({}).strict()");

        let open = object(&[("x", SchemaNode::Any)], &[], Extra::Open);
        assert_eq!(lower_one(open).0, "z.object({ x: z.unknown().optional() }).passthrough()");

        assert_eq!(lower_one(object(&[], &[], Extra::Default)).0, "z.object({})");
    }

    #[test]
    fn typed_extra_ignores_properties() {
        let node = object(
            &[("ignored", SchemaNode::Any)],
            &["ignored"],
            Extra::Typed(Box::new(SchemaNode::primitive(PrimitiveKind::Integer))),
        );
        assert_eq!(lower_one(node).0, "z.record(z.string(), z.int())");
    }

    #[test]
    fn strict_objects_config_closes_default_policy() {
        let reg: SchemaRegistry = [
            ("A".to_string(), object(&[], &[], Extra::Default)),
            ("B".to_string(), object(&[], &[], Extra::Open)),
        ]
        .into_iter()
        .collect();
        let config = CompilerConfig { strict_objects: true, ..CompilerConfig::default() };
        assert_eq!(lower_named_with(&reg, "A", &config).0, "z.object({}).strict()");
        assert_eq!(lower_named_with(&reg, "B", &config).0, "z.object({}).passthrough()");
    }

    #[test]
    fn non_identifier_keys_are_quoted() {
        let node = object(
            &[("x-trace-id", SchemaNode::Any), ("$ok", SchemaNode::Any)],
            &["x-trace-id", "$ok"],
            Extra::Default,
        );
        assert_eq!(lower_one(node).0, r#"z.object({ "x-trace-id": z.unknown(), $ok: z.unknown() })"#);
    }

    #[test]
    fn property_paths_escape_slashes() {
        let node = object(&[("a/b", SchemaNode::Unsupported { tag: "file".into() })], &[], Extra::Default);
        let (_, warnings) = lower_one(node);
        assert_eq!(warnings[0].path, "/properties/a~1b");
    }
}
