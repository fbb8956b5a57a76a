use crate::ir::{EnumNode, Literal, Numeric};

/// `None` for an empty value list; the caller warns and falls back.
pub fn lower_enum(node: &EnumNode) -> Option<String> {
    let values = &node.values;
    if values.is_empty() {
        return None;
    }

    let all_tuples = values.iter().all(|v| matches!(v, Literal::Tuple(_)));
    if node.declared_array && all_tuples {
        return Some(union_of(values.iter().map(literal_expr).collect()));
    }

    let strings: Option<Vec<&str>> = values
        .iter()
        .map(|v| match v {
            Literal::String(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    match strings {
        Some(strings) if strings.len() > 1 => {
            let items: Vec<String> = strings.into_iter().map(string_literal).collect();
            Some(format!("z.enum([{}])", items.join(", ")))
        }
        _ => Some(union_of(values.iter().map(literal_expr).collect())),
    }
}

fn union_of(mut arms: Vec<String>) -> String {
    match arms.len() {
        1 => arms.remove(0),
        _ => format!("z.union([{}])", arms.join(", ")),
    }
}

/// Literal-equality expression; tuples become fixed-length tuples of literals.
fn literal_expr(lit: &Literal) -> String {
    match lit {
        Literal::Tuple(items) => {
            let items: Vec<String> = items.iter().map(literal_expr).collect();
            format!("z.tuple([{}])", items.join(", "))
        }
        Literal::Null => "z.literal(null)".to_string(),
        Literal::Bool(b) => format!("z.literal({b})"),
        Literal::Int(i) => format!("z.literal({i})"),
        Literal::Float(f) => format!("z.literal({})", Numeric::Float(*f)),
        Literal::String(s) => format!("z.literal({})", string_literal(s)),
    }
}

/// Double-quoted source literal (JSON string syntax is valid here).
pub fn string_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;

    fn node(values: Vec<Literal>) -> EnumNode {
        EnumNode { values, declared_array: false }
    }
    fn s(v: &str) -> Literal { Literal::String(v.into()) }

    #[test]
    fn strings() {
        assert_eq!(lower_enum(&node(vec![s("a"), s("b")])).unwrap(), r#"z.enum(["a", "b"])"#);
        assert_eq!(lower_enum(&node(vec![s("only")])).unwrap(), r#"z.literal("only")"#);
        assert_eq!(lower_enum(&node(vec![s("say \"hi\"")])).unwrap(), r#"z.literal("say \"hi\"")"#);
    }

    #[test]
    fn numbers_booleans_and_mixed_become_literal_unions() {
        let nums = node(vec![Literal::Int(1), Literal::Float(OrderedFloat(2.5))]);
        assert_eq!(lower_enum(&nums).unwrap(), "z.union([z.literal(1), z.literal(2.5)])");

        let bools = node(vec![Literal::Bool(true)]);
        assert_eq!(lower_enum(&bools).unwrap(), "z.literal(true)");

        let mixed = node(vec![s("a"), Literal::Null]);
        assert_eq!(lower_enum(&mixed).unwrap(), r#"z.union([z.literal("a"), z.literal(null)])"#);
    }

    #[test]
    fn declared_array_of_lists_become_tuples() {
        let one = EnumNode {
            values: vec![Literal::Tuple(vec![Literal::Int(1), s("x")])],
            declared_array: true,
        };
        assert_eq!(lower_enum(&one).unwrap(), r#"z.tuple([z.literal(1), z.literal("x")])"#);

        let two = EnumNode {
            values: vec![
                Literal::Tuple(vec![Literal::Int(0), Literal::Int(0)]),
                Literal::Tuple(vec![Literal::Int(1), Literal::Int(1)]),
            ],
            declared_array: true,
        };
        assert_eq!(
            lower_enum(&two).unwrap(),
            "z.union([z.tuple([z.literal(0), z.literal(0)]), z.tuple([z.literal(1), z.literal(1)])])"
        );
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(lower_enum(&node(vec![])), None);
    }
}
