use crate::ir::{Numeric, Primitive, PrimitiveKind};

/// Literal syntax selected by the base expression's numeric width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Plain,       // `5`
    Wide,        // `5n` (int64 / bigint)
}

pub fn lower_primitive(p: &Primitive) -> String {
    match p.kind {
        PrimitiveKind::String => lower_string(p),
        PrimitiveKind::Number | PrimitiveKind::Integer => lower_numeric(p),
        PrimitiveKind::Boolean => "z.boolean()".to_string(),
        PrimitiveKind::Null => "z.null()".to_string(),
        PrimitiveKind::Date => "z.date()".to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// STRINGS
// ————————————————————————————————————————————————————————————————————————————

fn lower_string(p: &Primitive) -> String {
    let mut out = String::from("z.string()");
    if let Some(modifier) = p.format.as_deref().and_then(string_format) {
        out.push_str(modifier);
    }
    let min = p.min.and_then(length_of);
    let max = p.max.and_then(length_of);
    out.push_str(&length_clauses(min, max));
    if let Some(pattern) = &p.pattern {
        out.push_str(&format!(".regex({})", regex_literal(pattern)));
    }
    out
}

fn string_format(format: &str) -> Option<&'static str> {
    let modifier = match format {
        "email" => ".email()",
        "uri" | "url" => ".url()",
        "uuid" => ".uuid()",
        "date-time" => ".datetime()",
        "date" => ".date()",
        "time" => ".time()",
        "ipv4" => r#".ip({ version: "v4" })"#,
        "ipv6" => r#".ip({ version: "v6" })"#,
        _ => return None,
    };
    Some(modifier)
}

fn length_of(n: Numeric) -> Option<u64> {
    n.as_integral().map(|i| i.max(0) as u64)
}

/// `.length(n)` when both bounds agree, else `.min(n)` / `.max(n)`.
pub fn length_clauses(min: Option<u64>, max: Option<u64>) -> String {
    match (min, max) {
        (Some(a), Some(b)) if a == b => format!(".length({a})"),
        (min, max) => {
            let mut out = String::new();
            if let Some(a) = min {
                out.push_str(&format!(".min({a})"));
            }
            if let Some(b) = max {
                out.push_str(&format!(".max({b})"));
            }
            out
        }
    }
}

/// `/pattern/` with unescaped slashes and line breaks escaped.
pub fn regex_literal(pattern: &str) -> String {
    if pattern.is_empty() {
        return "/(?:)/".to_string();
    }
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('/');
    let mut escaped = false;
    let mut in_class = false;
    for c in pattern.chars() {
        match c {
            '\n' => { out.push_str("\\n"); escaped = false; continue; }
            '\r' => { out.push_str("\\r"); escaped = false; continue; }
            '/' if !escaped && !in_class => out.push_str("\\/"),
            '[' if !escaped => { in_class = true; out.push(c); }
            ']' if !escaped => { in_class = false; out.push(c); }
            _ => out.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    out.push('/');
    out
}

// ————————————————————————————————————————————————————————————————————————————
// NUMBERS
// ————————————————————————————————————————————————————————————————————————————

const NUMERIC_FORMATS: &[&str] = &["int32", "int64", "bigint", "float", "double"];

fn lower_numeric(p: &Primitive) -> String {
    let (base, width) = numeric_base(p.kind, p.format.as_deref());
    if let Some(format) = p.format.as_deref().filter(|f| !NUMERIC_FORMATS.contains(f)) {
        tracing::debug!(kind = %p.kind, format, "unknown numeric format; using {base}");
    }

    if let (Some(min), Some(max)) = (p.min, p.max) {
        if !p.exclusive_min && !p.exclusive_max && min.same_value(max) {
            return format!("z.literal({})", render(min, width));
        }
    }

    let mut out = base.to_string();
    if let Some(min) = p.min {
        out.push_str(&bound_clause(min, p.exclusive_min, true, width));
    }
    if let Some(max) = p.max {
        out.push_str(&bound_clause(max, p.exclusive_max, false, width));
    }
    if let Some(step) = p.multiple_of {
        out.push_str(&format!(".multipleOf({})", render(step, width)));
    }
    out
}

/// Unknown formats fall back to the width-less base.
fn numeric_base(kind: PrimitiveKind, format: Option<&str>) -> (&'static str, Width) {
    match (kind, format) {
        (PrimitiveKind::Integer, Some("int32")) => ("z.int32()", Width::Plain),
        (PrimitiveKind::Integer, Some("int64")) => ("z.int64()", Width::Wide),
        (PrimitiveKind::Integer, Some("bigint")) => ("z.bigint()", Width::Wide),
        (PrimitiveKind::Integer, _) => ("z.int()", Width::Plain),
        _ => ("z.number()", Width::Plain),
    }
}

fn bound_clause(bound: Numeric, exclusive: bool, lower: bool, width: Width) -> String {
    if bound.is_zero() {
        let clause = match (lower, exclusive) {
            (true, true) => ".positive()",
            (true, false) => ".nonnegative()",
            (false, true) => ".negative()",
            (false, false) => ".nonpositive()",
        };
        return clause.to_string();
    }
    let method = match (lower, exclusive) {
        (true, true) => "gt",
        (true, false) => "min",
        (false, true) => "lt",
        (false, false) => "max",
    };
    format!(".{method}({})", render(bound, width))
}

fn render(n: Numeric, width: Width) -> String {
    match width {
        Width::Plain => n.to_string(),
        // bigint literals cannot carry a fraction; truncate toward zero
        Width::Wide => {
            let i = n.as_integral().unwrap_or_else(|| n.as_f64().trunc() as i64);
            format!("{i}n")
        }
    }
}
