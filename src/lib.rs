pub mod ir;
pub mod diagnostics;
pub mod naming;
pub mod graph;
pub mod lower;
pub mod compile;
pub mod config;
pub mod path_de;
pub mod parse;
pub mod emit;
pub mod cli;

pub use compile::{compile, Compilation, TargetExpression};
pub use config::{CompilerConfig, ConfigError};
pub use diagnostics::{CompileError, Warning, WarningKind};
pub use ir::{SchemaNode, SchemaRegistry};
pub use parse::{parse_document, parse_document_str, ParseError, ParseOptions};
