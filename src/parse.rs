//! Minimal document loader: OpenAPI 3.x (`components.schemas`), Swagger 2
//! (`definitions`) or JSON Schema (`$defs`) → `SchemaRegistry`.
//!
//! Local pointers are reduced to bare identifiers; anything else is rejected.
//! Whether a pointer actually resolves is the compiler's concern.
use serde_json::{Map, Value};
use thiserror::Error;
use crate::path_de::escape_pointer;
use crate::ir::{
    ArrayNode, CompositionOp, EnumNode, Extra, Literal, Numeric, ObjectNode, Primitive,
    PrimitiveKind, SchemaNode, SchemaRegistry,
};

const LOCAL_PREFIXES: &[&str] = &["#/components/schemas/", "#/definitions/", "#/$defs/"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document has no schema section (expected `components.schemas`, `definitions` or `$defs`)")]
    MissingSchemas,
    #[error("{path}: reference `{pointer}` is not a local schema pointer")]
    ExternalReference { path: String, pointer: String },
    #[error("{path}: {message}")]
    Malformed { path: String, message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// `format: date | date-time` strings become the `date` primitive.
    pub dates: bool,
}

pub fn parse_document_str(src: &str, options: ParseOptions) -> Result<SchemaRegistry, ParseError> {
    let doc: Value = serde_json::from_str(src)?;
    parse_document(&doc, options)
}

pub fn parse_document(doc: &Value, options: ParseOptions) -> Result<SchemaRegistry, ParseError> {
    let (section, base) = ["/components/schemas", "/definitions", "/$defs"]
        .into_iter()
        .find_map(|ptr| doc.pointer(ptr).map(|v| (v, ptr)))
        .ok_or(ParseError::MissingSchemas)?;

    let schemas = section.as_object().ok_or_else(|| ParseError::Malformed {
        path: base.to_string(),
        message: "schema section must be an object".into(),
    })?;

    let parser = Parser { options };
    let mut registry = SchemaRegistry::with_capacity(schemas.len());
    for (name, body) in schemas {
        let path = format!("{base}/{}", escape_pointer(name));
        registry.insert(name.clone(), parser.node(body, &path)?);
    }
    tracing::debug!(schemas = registry.len(), section = base, "loaded schema registry");
    Ok(registry)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

struct Parser {
    options: ParseOptions,
}

impl Parser {
    fn node(&self, v: &Value, path: &str) -> Result<SchemaNode, ParseError> {
        match v {
            Value::Bool(true) => Ok(SchemaNode::Any),
            Value::Bool(false) => Ok(SchemaNode::composition(CompositionOp::Not, vec![SchemaNode::Any])),
            Value::Object(m) => self.object_schema(m, path),
            _ => Err(malformed(path, "expected a schema object or boolean")),
        }
    }

    fn object_schema(&self, m: &Map<String, Value>, path: &str) -> Result<SchemaNode, ParseError> {
        // siblings of `$ref` are ignored, as in OpenAPI 3.0
        if let Some(r) = m.get("$ref") {
            let r = r.as_str().ok_or_else(|| malformed(&format!("{path}/$ref"), "expected a string"))?;
            return Ok(SchemaNode::reference(local_pointer(r, path)?));
        }
        let nullable = m.get("nullable") == Some(&Value::Bool(true));
        if nullable && m.len() == 1 {
            return Ok(SchemaNode::NullableMarker);
        }

        let mut members = Vec::new();
        if let Some(base) = self.structural(m, path)? {
            members.push(base);
        }
        for (key, op) in [("allOf", CompositionOp::AllOf), ("oneOf", CompositionOp::OneOf), ("anyOf", CompositionOp::AnyOf)] {
            let Some(list) = m.get(key) else { continue };
            let list = list.as_array().ok_or_else(|| malformed(&format!("{path}/{key}"), "expected an array"))?;
            let nodes = list
                .iter()
                .enumerate()
                .map(|(i, v)| self.node(v, &format!("{path}/{key}/{i}")))
                .collect::<Result<Vec<_>, _>>()?;
            if op == CompositionOp::AllOf && !nodes.is_empty() {
                members.extend(nodes);
            } else {
                members.push(SchemaNode::composition(op, nodes));
            }
        }
        if let Some(not) = m.get("not") {
            let inner = self.node(not, &format!("{path}/not"))?;
            members.push(SchemaNode::composition(CompositionOp::Not, vec![inner]));
        }

        // a lone marker stays wrapped: nullable, not null-only
        let lone_marker = matches!(members.as_slice(), [SchemaNode::NullableMarker]);
        let mut node = match members.len() {
            0 => SchemaNode::Any,
            1 if !lone_marker => members.remove(0),
            _ => SchemaNode::composition(CompositionOp::AllOf, members),
        };
        if nullable {
            node = with_marker(node);
        }
        Ok(node)
    }

    /// The non-composition part of a schema, if it has one.
    fn structural(&self, m: &Map<String, Value>, path: &str) -> Result<Option<SchemaNode>, ParseError> {
        let declared = m.get("type");
        if let Some(values) = m.get("enum") {
            let values = values.as_array().ok_or_else(|| malformed(&format!("{path}/enum"), "expected an array"))?;
            let declared_array = declared.and_then(Value::as_str) == Some("array");
            return Ok(Some(SchemaNode::Enum(EnumNode { values: literals(values, path), declared_array })));
        }
        if let Some(value) = m.get("const") {
            return Ok(Some(SchemaNode::Enum(EnumNode {
                values: literals(std::slice::from_ref(value), path),
                declared_array: false,
            })));
        }

        match declared {
            Some(Value::String(tag)) => self.typed(m, tag, path).map(Some),
            Some(Value::Array(tags)) => {
                let mut nullable = false;
                let mut arms = Vec::new();
                for tag in tags {
                    match tag.as_str() {
                        Some("null") => nullable = true,
                        Some(tag) => arms.push(self.typed(m, tag, path)?),
                        None => return Err(malformed(&format!("{path}/type"), "expected type names")),
                    }
                }
                let node = match arms.len() {
                    0 => SchemaNode::primitive(PrimitiveKind::Null),
                    1 => arms.remove(0),
                    _ => SchemaNode::composition(CompositionOp::OneOf, arms),
                };
                Ok(Some(if nullable && !matches!(node, SchemaNode::Primitive(Primitive { kind: PrimitiveKind::Null, .. })) {
                    with_marker(node)
                } else {
                    node
                }))
            }
            Some(_) => Err(malformed(&format!("{path}/type"), "expected a string or an array")),
            None if ["properties", "additionalProperties", "required"].iter().any(|k| m.contains_key(*k)) => {
                self.object(m, path).map(Some)
            }
            None if m.contains_key("items") => self.array(m, path).map(Some),
            None => Ok(None),
        }
    }

    fn typed(&self, m: &Map<String, Value>, tag: &str, path: &str) -> Result<SchemaNode, ParseError> {
        let node = match tag {
            "string" => SchemaNode::Primitive(self.string(m)),
            "number" => SchemaNode::Primitive(numeric(m, PrimitiveKind::Number)),
            "integer" => SchemaNode::Primitive(numeric(m, PrimitiveKind::Integer)),
            "boolean" => SchemaNode::primitive(PrimitiveKind::Boolean),
            "null" => SchemaNode::primitive(PrimitiveKind::Null),
            "object" => self.object(m, path)?,
            "array" => self.array(m, path)?,
            other => SchemaNode::Unsupported { tag: other.to_string() },
        };
        Ok(node)
    }

    fn string(&self, m: &Map<String, Value>) -> Primitive {
        let format = m.get("format").and_then(Value::as_str).map(str::to_string);
        let is_date = matches!(format.as_deref(), Some("date" | "date-time"));
        if self.options.dates && is_date {
            return Primitive::new(PrimitiveKind::Date);
        }
        let mut p = Primitive::new(PrimitiveKind::String);
        p.format = format;
        p.pattern = m.get("pattern").and_then(Value::as_str).map(str::to_string);
        p.min = m.get("minLength").and_then(numeric_value);
        p.max = m.get("maxLength").and_then(numeric_value);
        p
    }

    fn array(&self, m: &Map<String, Value>, path: &str) -> Result<SchemaNode, ParseError> {
        let items = match m.get("items") {
            Some(v @ (Value::Object(_) | Value::Bool(_))) => self.node(v, &format!("{path}/items"))?,
            Some(_) => return Err(malformed(&format!("{path}/items"), "positional `items` arrays are not supported")),
            None => SchemaNode::Any,
        };
        Ok(SchemaNode::Array(ArrayNode {
            items: Box::new(items),
            min_items: m.get("minItems").and_then(Value::as_u64),
            max_items: m.get("maxItems").and_then(Value::as_u64),
        }))
    }

    fn object(&self, m: &Map<String, Value>, path: &str) -> Result<SchemaNode, ParseError> {
        let mut o = ObjectNode::new();
        if let Some(props) = m.get("properties") {
            let props = props.as_object().ok_or_else(|| malformed(&format!("{path}/properties"), "expected an object"))?;
            for (name, v) in props {
                let child = format!("{path}/properties/{}", escape_pointer(name));
                o.properties.insert(name.clone(), self.node(v, &child)?);
            }
        }
        if let Some(required) = m.get("required").and_then(Value::as_array) {
            o.required = required.iter().filter_map(Value::as_str).map(str::to_string).collect();
        }
        o.extra = match m.get("additionalProperties") {
            None => Extra::Default,
            Some(Value::Bool(false)) => Extra::Closed,
            Some(Value::Bool(true)) => Extra::Open,
            Some(Value::Object(inner)) if inner.is_empty() => Extra::Open,
            Some(v) => Extra::Typed(Box::new(self.node(v, &format!("{path}/additionalProperties"))?)),
        };
        Ok(SchemaNode::Object(o))
    }
}

fn numeric(m: &Map<String, Value>, kind: PrimitiveKind) -> Primitive {
    let mut p = Primitive::new(kind);
    p.format = m.get("format").and_then(Value::as_str).map(str::to_string);
    p.min = m.get("minimum").and_then(numeric_value);
    p.max = m.get("maximum").and_then(numeric_value);
    p.multiple_of = m.get("multipleOf").and_then(numeric_value);
    // OpenAPI 3.0 flags vs. JSON Schema 2019+ numeric bounds; the tighter bound wins
    match m.get("exclusiveMinimum") {
        Some(Value::Bool(b)) => p.exclusive_min = *b,
        Some(v) => if let Some(n) = numeric_value(v) {
            if p.min.is_none_or(|min| n.as_f64() >= min.as_f64()) {
                p.min = Some(n);
                p.exclusive_min = true;
            }
        },
        None => {}
    }
    match m.get("exclusiveMaximum") {
        Some(Value::Bool(b)) => p.exclusive_max = *b,
        Some(v) => if let Some(n) = numeric_value(v) {
            if p.max.is_none_or(|max| n.as_f64() <= max.as_f64()) {
                p.max = Some(n);
                p.exclusive_max = true;
            }
        },
        None => {}
    }
    p
}

fn numeric_value(v: &Value) -> Option<Numeric> {
    let n = v.as_number()?;
    match n.as_i64() {
        Some(i) => Some(Numeric::Int(i)),
        None => n.as_f64().map(Numeric::from),
    }
}

fn literals(values: &[Value], path: &str) -> Vec<Literal> {
    values
        .iter()
        .filter_map(|v| {
            let lit = literal(v);
            if lit.is_none() {
                tracing::warn!(path, value = %v, "skipping non-literal enum value");
            }
            lit
        })
        .collect()
}

fn literal(v: &Value) -> Option<Literal> {
    match v {
        Value::Null => Some(Literal::Null),
        Value::Bool(b) => Some(Literal::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Literal::Int(i)),
            None => n.as_f64().map(|f| Literal::Float(f.into())),
        },
        Value::String(s) => Some(Literal::String(s.clone())),
        Value::Array(xs) => xs.iter().map(literal).collect::<Option<Vec<_>>>().map(Literal::Tuple),
        Value::Object(_) => None,
    }
}

/// Fold a nullability marker into `node`.
fn with_marker(node: SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Composition(mut c) if c.op == CompositionOp::AllOf => {
            c.members.push(SchemaNode::NullableMarker);
            SchemaNode::Composition(c)
        }
        other => SchemaNode::composition(CompositionOp::AllOf, vec![other, SchemaNode::NullableMarker]),
    }
}

fn local_pointer(r: &str, path: &str) -> Result<String, ParseError> {
    LOCAL_PREFIXES
        .iter()
        .find_map(|prefix| r.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
        .map(|rest| rest.replace("~1", "/").replace("~0", "~"))
        .ok_or_else(|| ParseError::ExternalReference { path: path.to_string(), pointer: r.to_string() })
}

fn malformed(path: &str, message: &str) -> ParseError {
    ParseError::Malformed { path: path.to_string(), message: message.to_string() }
}
