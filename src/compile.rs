//! The compiler's single public entry point: a pure function from (JSON, token
//! map, module name) to rendered source artifacts, or an error (§6).

use serde_json::Value as Json;

use crate::emit;
use crate::error::CompileError;
use crate::parser;
use crate::stage;
use crate::token_map::TokenMap;

/// The three text artifacts produced for one spec.
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub tcl_source: String,
    pub test_source: String,
    pub sdk_source: String,
    pub stage_count: u64,
}

/// Parse, allocate stages, and emit all three artifacts for one spec.
pub fn compile(spec_name: &str, json: &Json, tokens: &TokenMap) -> Result<CompiledContract, CompileError> {
    let contract = parser::parse_contract(json)
        .map_err(|source| CompileError::Parse { spec_name: spec_name.to_string(), source })?;
    let model = stage::allocate(&contract, tokens);
    let module_name = emit::sanitize_module_name(spec_name)?;

    let tcl_source = emit::emit_module(&model, &module_name)?;
    let test_source = emit::test_module::render_test_module(&model, &module_name);
    let sdk_source = emit::sdk::render_sdk(&model, &module_name);

    Ok(CompiledContract { tcl_source, test_source, sdk_source, stage_count: model.stage_count })
}

/// Compile a batch of (name, json) specs against a shared token map. No spec's
/// failure short-circuits the others; results come back in input order (§5).
pub fn compile_batch<'a, I>(specs: I, tokens: &TokenMap) -> Vec<Result<CompiledContract, CompileError>>
where
    I: IntoIterator<Item = (&'a str, &'a Json)>,
{
    specs.into_iter().map(|(name, json)| compile(name, json, tokens)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_close_compiles() {
        let json = serde_json::json!("close");
        let result = compile("trivial", &json, &TokenMap::default()).unwrap();
        assert_eq!(result.stage_count, 1);
        assert!(result.tcl_source.contains("close_stage_0"));
    }

    #[test]
    fn invalid_json_is_a_parse_error_not_a_panic() {
        let json = serde_json::json!({"nonsense": true});
        let err = compile("bad", &json, &TokenMap::default()).unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn batch_keeps_input_order_and_does_not_short_circuit() {
        let specs = [
            ("ok_one".to_string(), serde_json::json!("close")),
            ("bad".to_string(), serde_json::json!({"nonsense": true})),
            ("ok_two".to_string(), serde_json::json!("close")),
        ];
        let borrowed: Vec<(&str, &serde_json::Value)> = specs.iter().map(|(n, j)| (n.as_str(), j)).collect();
        let results = compile_batch(borrowed, &TokenMap::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
