//! Fixture snapshots: `fixtures/<name>.json` (+ optional `<name>.config.json`)
//! compiles to exactly `fixtures/<name>.ts`, modulo whitespace.
//!
//! `cargo run -p dev-test-runner -- --bless` rewrites the snapshots.
use std::path::{Path, PathBuf};
use anyhow::{bail, Context};
use colored::Colorize;
use json_zod::{compile, emit::render_module, parse_document_str, CompilerConfig, ParseOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

struct Fixture {
    name: String,
    document: PathBuf,
    config: Option<PathBuf>,
    snapshot: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let bless = std::env::args().skip(1).any(|a| a == "--bless");
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    let fixtures = discover(&root)?;

    let mut failed = Vec::new();
    for fixture in &fixtures {
        let actual = render(fixture).with_context(|| format!("fixture `{}`", fixture.name))?;
        if bless {
            std::fs::write(&fixture.snapshot, &actual)?;
            eprintln!("{} {}", "blessed".cyan(), fixture.name);
            continue;
        }
        let expected = std::fs::read_to_string(&fixture.snapshot).unwrap_or_default();
        if normalize(&expected) == normalize(&actual) {
            eprintln!("{} {}", "ok".green(), fixture.name);
        } else {
            eprintln!("{} {}", "FAILED".red().bold(), fixture.name);
            eprintln!("—— expected ——\n{expected}\n—— actual ——\n{actual}");
            failed.push(fixture.name.clone());
        }
    }

    if !failed.is_empty() {
        bail!("{} of {} fixtures failed: {}", failed.len(), fixtures.len(), failed.join(", "));
    }
    Ok(())
}

fn discover(root: &Path) -> anyhow::Result<Vec<Fixture>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(root).with_context(|| format!("reading {}", root.display()))? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else { continue };
        let Some(name) = file_name.strip_suffix(".json") else { continue };
        if name.ends_with(".config") {
            continue;
        }
        let config = root.join(format!("{name}.config.json"));
        out.push(Fixture {
            name: name.to_string(),
            document: path.clone(),
            config: config.exists().then_some(config),
            snapshot: root.join(format!("{name}.ts")),
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn render(fixture: &Fixture) -> anyhow::Result<String> {
    let config = match &fixture.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };
    let source = std::fs::read_to_string(&fixture.document)?;
    let registry = parse_document_str(&source, ParseOptions { dates: config.dates })?;
    let compilation = compile(&registry, &config)?;
    Ok(render_module(&compilation, &config.naming))
}

fn normalize(src: &str) -> String {
    WHITESPACE.replace_all(src.trim(), " ").into_owned()
}
