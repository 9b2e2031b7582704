use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// marlowe-move — compiles timed multi-party contracts into Sui Move state machines.
#[derive(Parser)]
#[command(name = "marlowe-move", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a contract spec (JSON) into a Move module, test module, and SDK stub.
    Compile {
        /// Path to the contract JSON file.
        file: PathBuf,

        /// Module name to emit (default: the file's stem, sanitised).
        #[arg(long)]
        name: Option<String>,

        /// Path to a token-resolution map JSON document (default: the built-in fixture set).
        #[arg(long)]
        tokens: Option<PathBuf>,

        /// Directory to write `<name>.move`, `<name>_tests.move`, and `<name>_sdk.ts`
        /// into. Omit to print all three to stdout, separated by headers.
        #[arg(long, short = 'o')]
        out_dir: Option<PathBuf>,
    },

    /// Output the JSON Schema for the contract surface syntax (or the injected
    /// token map, with `--kind token-map`).
    Schema {
        #[arg(long, default_value = "contract")]
        kind: String,
    },

    /// List every AST node kind the parser accepts, with its JSON shape.
    ListNodes,

    /// Print an example contract spec to stdout.
    Example,
}
