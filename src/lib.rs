//! Compiles the source contract language's JSON surface syntax into a Sui Move
//! module: a stage-numbered finite state machine plus an embedded bytecode VM
//! for evaluating value and observation expressions against live chain state.
//!
//! The crate is a pure function from `(json, token map, module name)` to three
//! rendered text artifacts (or an error) — see [`compile::compile`]. Nothing in
//! here touches the filesystem or a chain RPC endpoint; that's the caller's job
//! (see the `marlowe-move` binary in `src/main.rs`).

pub mod ast;
pub mod bytecode;
pub mod compile;
pub mod emit;
pub mod error;
pub mod example;
pub mod list_nodes;
pub mod parser;
pub mod schema;
pub mod stage;
pub mod stage_lookup;
pub mod token_map;

pub use compile::{compile, compile_batch, CompiledContract};
pub use error::CompileError;
pub use token_map::TokenMap;
