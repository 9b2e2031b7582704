//! Thin CLI wrapper around `marlowe_move`: reads a spec from disk, calls the
//! library, and writes the emitted artifacts to disk or stdout. Carries no
//! compiler logic of its own (§1).

use std::fs;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use marlowe_move::token_map::TokenMap;

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Compile { file, name, tokens, out_dir } => run_compile(&file, name.as_deref(), tokens.as_deref(), out_dir.as_deref()),
        cli::Command::Schema { kind } => run_schema(&kind),
        cli::Command::ListNodes => marlowe_move::list_nodes::run(),
        cli::Command::Example => marlowe_move::example::run(),
    }
}

fn run_schema(kind: &str) -> anyhow::Result<()> {
    match kind {
        "contract" => println!("{}", marlowe_move::schema::contract_schema_json()),
        "token-map" | "tokens" => println!("{}", marlowe_move::schema::token_map_schema_json()),
        other => anyhow::bail!("unknown schema kind `{other}` (expected `contract` or `token-map`)"),
    }
    Ok(())
}

fn run_compile(file: &Path, name: Option<&str>, tokens_path: Option<&Path>, out_dir: Option<&Path>) -> anyhow::Result<()> {
    let module_name = name
        .map(str::to_string)
        .or_else(|| file.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .ok_or_else(|| anyhow::anyhow!("could not determine a module name from `{}`; pass --name", file.display()))?;

    let raw = fs::read_to_string(file).map_err(|e| anyhow::anyhow!("reading `{}`: {e}", file.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("`{}` is not valid JSON: {e}", file.display()))?;

    let tokens = match tokens_path {
        Some(p) => {
            let raw = fs::read_to_string(p).map_err(|e| anyhow::anyhow!("reading `{}`: {e}", p.display()))?;
            serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("`{}` is not a valid token map: {e}", p.display()))?
        }
        None => TokenMap::default(),
    };

    let compiled = marlowe_move::compile(&module_name, &json, &tokens)?;
    tracing::debug!(module_name, stage_count = compiled.stage_count, "compiled contract");

    match out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            fs::write(dir.join(format!("{module_name}.move")), &compiled.tcl_source)?;
            fs::write(dir.join(format!("{module_name}_tests.move")), &compiled.test_source)?;
            fs::write(dir.join(format!("{module_name}_sdk.ts")), &compiled.sdk_source)?;
            println!("wrote {module_name}.move, {module_name}_tests.move, {module_name}_sdk.ts to {}", dir.display());
        }
        None => {
            println!("// ── {module_name}.move ──────────────────────────────");
            println!("{}", compiled.tcl_source);
            println!("// ── {module_name}_tests.move ────────────────────────");
            println!("{}", compiled.test_source);
            println!("// ── {module_name}_sdk.ts ─────────────────────────────");
            println!("{}", compiled.sdk_source);
        }
    }

    Ok(())
}
