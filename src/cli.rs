//! Minimal CLI: document → (module | order)
use std::path::{Path, PathBuf};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use crate::compile::{compile, Compilation};
use crate::config::CompilerConfig;
use crate::graph::DependencyGraph;
use crate::ir::SchemaRegistry;
use crate::naming::CaseConvention;
use crate::parse::{parse_document_str, ParseOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile OpenAPI / JSON Schema component schemas into zod validators
#[derive(Parser, Debug)]
#[command(name = "json-zod", version)]
pub struct CommandLineInterface {
    /// more logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile each input document into a single zod module
    Compile(CompileOut),
    /// print the emission order and circular groups
    Order(OrderOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more input documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON compiler config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// identifier case convention
    #[arg(long, value_enum)]
    case: Option<CaseArg>,

    /// objects without `additionalProperties` reject unknown keys
    #[arg(long, default_value_t = false)]
    strict_objects: bool,

    /// lower schemas on the current thread only
    #[arg(long, default_value_t = false)]
    no_parallel: bool,

    /// `format: date | date-time` strings become `z.date()`
    #[arg(long, default_value_t = false)]
    dates: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum CaseArg {
    Pascal,
    Camel,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .ts file for one input, or a directory for several (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// treat warnings as errors
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(clap::Parser, Debug)]
struct OrderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// also list each schema's direct dependencies
    #[arg(long)]
    deps: bool,
}

struct LoadedDocument {
    path: PathBuf,
    registry: SchemaRegistry,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl From<CaseArg> for CaseConvention {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Pascal => CaseConvention::Pascal,
            CaseArg::Camel => CaseConvention::Camel,
        }
    }
}

impl InputSettings {
    fn compiler_config(&self) -> anyhow::Result<CompilerConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => CompilerConfig::load(path)?,
            None => CompilerConfig::default(),
        };
        if let Some(case) = self.case {
            config.naming.case = case.into();
        }
        config.strict_objects |= self.strict_objects;
        config.parallel &= !self.no_parallel;
        config.dates |= self.dates;
        Ok(config)
    }

    fn load_documents(&self, config: &CompilerConfig) -> anyhow::Result<Vec<LoadedDocument>> {
        let options = ParseOptions { dates: config.dates };
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        source_paths
            .into_iter()
            .map(|path| {
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read source file {}", path.display()))?;
                let registry = parse_document_str(&source, options)
                    .with_context(|| format!("failed to load schemas from {}", path.display()))?;
                Ok(LoadedDocument { path, registry })
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Compile(target) => target.run(),
            Command::Order(target) => target.run(),
        }
    }
}

impl CompileOut {
    fn run(&self) -> anyhow::Result<()> {
        let config = self.input_settings.compiler_config()?;
        let documents = self.input_settings.load_documents(&config)?;
        let many = documents.len() > 1;
        let mut warned = false;

        for doc in &documents {
            let compilation = compile(&doc.registry, &config)
                .with_context(|| format!("failed to compile {}", doc.path.display()))?;
            warned |= report_warnings(&doc.path, &compilation);
            let module = crate::emit::render_module(&compilation, &config.naming);

            match self.out.as_ref() {
                None => println!("{module}"),
                Some(out) => {
                    let dest = if many { out.join(module_file_name(&doc.path)) } else { out.clone() };
                    write_output(&dest, &module)?;
                    tracing::info!(path = %dest.display(), "wrote module");
                }
            }
        }
        if warned && self.deny_warnings {
            bail!("compilation produced warnings");
        }
        Ok(())
    }
}

impl OrderOut {
    fn run(&self) -> anyhow::Result<()> {
        let config = self.input_settings.compiler_config()?;
        for doc in self.input_settings.load_documents(&config)? {
            let graph = DependencyGraph::build(&doc.registry)
                .with_context(|| format!("failed to order {}", doc.path.display()))?;
            println!("{}", doc.path.display().to_string().bold());
            for name in graph.order() {
                let marker = if graph.is_cyclic(name) { "↻".yellow().to_string() } else { " ".to_string() };
                if self.deps {
                    println!("  {marker} {name} → [{}]", graph.dependencies(name).join(", "));
                } else {
                    println!("  {marker} {name}");
                }
            }
            for group in graph.circular_groups() {
                println!("  {} {}", "cycle:".yellow(), group.join(" ⇄ "));
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Returns whether anything was reported.
fn report_warnings(source: &Path, compilation: &Compilation) -> bool {
    for warning in &compilation.warnings {
        eprintln!("{} {}: {warning}", "warning:".yellow().bold(), source.display());
    }
    !compilation.warnings.is_empty()
}

fn module_file_name(source: &Path) -> PathBuf {
    let stem = source.file_stem().map(|s| s.to_string_lossy().to_string());
    PathBuf::from(format!("{}.ts", stem.as_deref().unwrap_or("schemas")))
}

fn write_output(dest: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(dest, contents).with_context(|| format!("failed to write {}", dest.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> CommandLineInterface {
        CommandLineInterface::try_parse_from(std::iter::once("json-zod").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let parsed = cli(&["compile", "-i", "api.json", "--case", "camel", "--strict-objects", "--no-parallel"]);
        let Command::Compile(target) = &parsed.cmd else { panic!("expected compile") };
        let config = target.input_settings.compiler_config().unwrap();
        assert_eq!(config.naming.case, CaseConvention::Camel);
        assert!(config.strict_objects);
        assert!(!config.parallel);
        assert!(!config.dates);
    }

    #[test]
    fn verbosity_is_global() {
        assert_eq!(cli(&["order", "-i", "a.json", "-vv"]).verbose, 2);
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
        assert!(resolve_file_path_patterns(["/nonexistent-json-zod-dir/*.json"]).is_err());
    }

    #[test]
    fn module_names_follow_input_stems() {
        assert_eq!(module_file_name(Path::new("specs/petstore.json")), PathBuf::from("petstore.ts"));
    }
}
