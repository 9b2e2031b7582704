//! Crate-wide error types. Split from [`crate::parser::ParseError`] because the two
//! fail at different points in the pipeline and carry different context: a parse
//! error cites a JSON fragment, a compile error cites a stage.

use thiserror::Error;

/// Everything that can go wrong turning a parsed [`crate::ast::Contract`] into a
/// target module, once past JSON decoding.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("parsing `{spec_name}` failed: {source}")]
    Parse {
        spec_name: String,
        #[source]
        source: crate::parser::ParseError,
    },

    /// Pay to an internal Account payee: unsupported in this revision (§9).
    #[error("stage {stage}: pay to an internal account payee is not supported")]
    PayToAccountUnsupported { stage: u64 },

    /// The module name the caller supplied sanitises down to nothing usable.
    #[error("module name `{0}` has no valid identifier characters")]
    EmptyModuleName(String),
}
