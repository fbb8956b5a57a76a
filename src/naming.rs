//! Naming layer: schema name → output identifier.
//!
//! Pure function of `(name, role, NamingConfig)`; no ambient state.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static WORD_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}]+").expect("static regex")
});

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for",
    "function", "if", "import", "in", "instanceof", "new", "null", "return", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "yield", "let", "static", "implements", "interface", "package", "private",
    "protected", "public", "await",
];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseConvention {
    /// `PetOwner`
    #[default]
    Pascal,
    /// `petOwner`
    Camel,
}

/// What an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Schema,
    Type,
    Parameters,
    Headers,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoleSuffixes {
    pub schema: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub parameters: String,
    pub headers: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub case: CaseConvention,
    pub suffixes: RoleSuffixes,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for RoleSuffixes {
    fn default() -> Self {
        Self {
            schema: "Schema".into(),
            type_: String::new(),
            parameters: "Parameters".into(),
            headers: "Headers".into(),
        }
    }
}

impl RoleSuffixes {
    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Schema => &self.schema,
            Role::Type => &self.type_,
            Role::Parameters => &self.parameters,
            Role::Headers => &self.headers,
        }
    }
}

impl NamingConfig {
    pub fn identifier(&self, name: &str, role: Role) -> String {
        let words = split_words(name);
        let mut out = String::with_capacity(name.len() + 8);
        for (i, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            if i == 0 && self.case == CaseConvention::Camel {
                out.push_str(&lower);
            } else {
                out.push_str(&capitalize(&lower));
            }
        }
        out.push_str(self.suffixes.get(role));

        if out.is_empty() {
            return "_".to_string();
        }
        if out.starts_with(|c: char| c.is_ascii_digit()) {
            out.insert(0, '_');
        }
        if RESERVED.contains(&out.as_str()) {
            out.push('_');
        }
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Split on separators, lower→upper transitions and acronym ends
/// (`HTTPServer` → `HTTP`, `Server`).
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in WORD_SEPARATORS.split(name).filter(|s| !s.is_empty()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for i in 0..chars.len() {
            let c = chars[i];
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_numeric()
                    || (prev.is_uppercase() && next_lower);
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
