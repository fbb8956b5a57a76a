// Strongly-typed schema IR. No serde_json::Value here.
//
// The loader (`crate::parse`) builds this from a document; the compiler only
// ever reads it.

use std::collections::BTreeSet;
use std::fmt;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Primitive(Primitive),
    Array(ArrayNode),
    Object(ObjectNode),
    Enum(EnumNode),
    Composition(CompositionNode),
    Reference(ReferenceNode),
    NullableMarker,           // contributes nullability, not a type
    Any,                      // `{}` / `true`
    Unsupported { tag: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub min: Option<Numeric>,     // length for strings, value otherwise
    pub max: Option<Numeric>,
    pub exclusive_min: bool,
    pub exclusive_max: bool,
    pub multiple_of: Option<Numeric>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayNode {
    pub items: Box<SchemaNode>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNode {
    pub properties: IndexMap<String, SchemaNode>,  // declaration order
    pub required: BTreeSet<String>,
    pub extra: Extra,
}

/// Extra-property policy of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Extra {
    /// Nothing declared.
    #[default]
    Default,
    Closed,
    Open,
    Typed(Box<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumNode {
    pub values: Vec<Literal>,
    pub declared_array: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(String),
    Tuple(Vec<Literal>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionOp {
    AllOf,
    OneOf,
    AnyOf,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionNode {
    pub op: CompositionOp,
    pub members: Vec<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNode {
    pub pointer: String,      // bare identifier, `#/components/schemas/` already stripped
}

/// A numeric bound or step. Integers stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    Int(i64),
    Float(OrderedFloat<f64>),
}

/// Document-wide map from identifier to schema body, in declaration order.
pub type SchemaRegistry = IndexMap<String, SchemaNode>;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    pub fn reference(pointer: impl Into<String>) -> Self {
        SchemaNode::Reference(ReferenceNode { pointer: pointer.into() })
    }
    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive(Primitive::new(kind))
    }
    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array(ArrayNode { items: Box::new(items), min_items: None, max_items: None })
    }
    pub fn composition(op: CompositionOp, members: Vec<SchemaNode>) -> Self {
        SchemaNode::Composition(CompositionNode { op, members })
    }

    /// Visit every reference pointer in this body without crossing into
    /// other named schemas.
    pub fn for_each_reference<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            SchemaNode::Reference(r) => f(&r.pointer),
            SchemaNode::Array(a) => a.items.for_each_reference(f),
            SchemaNode::Object(o) => {
                for v in o.properties.values() {
                    v.for_each_reference(f);
                }
                if let Extra::Typed(v) = &o.extra {
                    v.for_each_reference(f);
                }
            }
            SchemaNode::Composition(c) => {
                for m in &c.members {
                    m.for_each_reference(f);
                }
            }
            SchemaNode::Primitive(_)
            | SchemaNode::Enum(_)
            | SchemaNode::NullableMarker
            | SchemaNode::Any
            | SchemaNode::Unsupported { .. } => {}
        }
    }
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            format: None,
            pattern: None,
            min: None,
            max: None,
            exclusive_min: false,
            exclusive_max: false,
            multiple_of: None,
        }
    }
}

impl ObjectNode {
    pub fn new() -> Self {
        Self { properties: IndexMap::new(), required: BTreeSet::new(), extra: Extra::Default }
    }
}

impl Default for ObjectNode {
    fn default() -> Self { Self::new() }
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f.0,
        }
    }
    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
    /// Same value regardless of representation (`5` == `5.0`).
    pub fn same_value(self, other: Numeric) -> bool {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
    /// Integral value, if this bound is one.
    pub fn as_integral(self) -> Option<i64> {
        match self {
            Numeric::Int(i) => Some(i),
            Numeric::Float(f) => {
                let f = f.0;
                let in_range = f >= i64::MIN as f64 && f <= i64::MAX as f64;
                (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
            }
        }
    }
}

impl From<i64> for Numeric {
    fn from(i: i64) -> Self { Numeric::Int(i) }
}

impl From<f64> for Numeric {
    fn from(f: f64) -> Self { Numeric::Float(OrderedFloat(f)) }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integral() {
            Some(i) => write!(f, "{i}"),
            None => write!(f, "{}", self.as_f64()),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Date => "date",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_collected_shallowly() {
        let mut obj = ObjectNode::new();
        obj.properties.insert("a".into(), SchemaNode::reference("A"));
        obj.properties.insert("b".into(), SchemaNode::array(SchemaNode::reference("B")));
        obj.extra = Extra::Typed(Box::new(SchemaNode::composition(
            CompositionOp::OneOf,
            vec![SchemaNode::reference("C"), SchemaNode::primitive(PrimitiveKind::String)],
        )));
        let node = SchemaNode::Object(obj);

        let mut seen = Vec::new();
        node.for_each_reference(&mut |p| seen.push(p.to_string()));
        assert_eq!(seen, vec!["A", "B", "C"]);
    }

    #[test]
    fn numeric_display_prefers_integers() {
        assert_eq!(Numeric::from(5.0).to_string(), "5");
        assert_eq!(Numeric::from(2.5).to_string(), "2.5");
        assert_eq!(Numeric::from(-3).to_string(), "-3");
        assert!(Numeric::from(5).same_value(Numeric::from(5.0)));
        assert!(Numeric::from(0.0).is_zero());
    }
}
