//! Target emitter: renders a [`crate::stage::StageModel`] into a TCL module, its
//! happy-path test module, and a client-SDK stub (§4.4, §6).

pub mod automation;
pub mod header;
pub mod routines;
pub mod sdk;
pub mod test_module;

use crate::error::CompileError;
use crate::stage::{StageModel, StageRecord};
use crate::stage_lookup::StageLookup;

/// Sanitise a caller-supplied spec name into a valid TCL module identifier: ASCII
/// alphanumeric plus `_`, lowercased, non-empty, not leading with a digit.
/// Grounded in the original's `sanitize_name`.
pub fn sanitize_module_name(name: &str) -> Result<String, CompileError> {
    let mut out = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            out.push('_');
        }
    }
    if out.is_empty() {
        return Err(CompileError::EmptyModuleName(name.to_string()));
    }
    if out.chars().next().unwrap().is_ascii_digit() {
        out = format!("marlowe_{out}");
    }
    Ok(out)
}

/// Render the full TCL module for `model` under `module_name`.
pub fn emit_module(model: &StageModel, module_name: &str) -> Result<String, CompileError> {
    let name = sanitize_module_name(module_name)?;
    let lookup = StageLookup::build(model);
    let has_roles = header::has_roles(model);

    let mut stage_ids: Vec<u64> = model.records.keys().copied().collect();
    stage_ids.sort_unstable();

    let mut body = String::new();
    for stage in stage_ids {
        match &model.records[&stage] {
            StageRecord::Close { stage } => body.push_str(&routines::render_close(*stage)),
            StageRecord::Pay { stage, from_account, to, target_type, value, .. } => {
                body.push_str(&routines::render_pay(*stage, from_account, to, target_type, value, &lookup)?);
            }
            StageRecord::If { stage, then, else_, obs } => {
                body.push_str(&routines::render_if(*stage, obs, *then, *else_, &lookup));
            }
            StageRecord::Let { stage, name, value, .. } => {
                body.push_str(&routines::render_let(*stage, name, value, &lookup));
            }
            StageRecord::Assert { stage, obs, .. } => {
                body.push_str(&routines::render_assert(*stage, obs, &lookup));
            }
            StageRecord::When { stage, timeout, timeout_stage, .. } => {
                body.push_str(&routines::render_timeout(*stage, *timeout, *timeout_stage, &lookup));
            }
        }
    }
    for case in &model.deposit_cases {
        body.push_str(&routines::render_deposit_case(case, &lookup));
    }
    for case in &model.choice_cases {
        body.push_str(&routines::render_choice_case(case, &lookup));
    }
    for case in &model.notify_cases {
        body.push_str(&routines::render_notify_case(case, &lookup));
    }

    Ok(header::render_header(&name, has_roles, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Contract, Party, Payee, Token, Value};
    use crate::stage::allocate;
    use crate::token_map::TokenMap;

    #[test]
    fn module_name_sanitisation() {
        assert_eq!(sanitize_module_name("My Contract!").unwrap(), "my_contract");
        assert_eq!(sanitize_module_name("123abc").unwrap(), "marlowe_123abc");
        assert!(sanitize_module_name("").unwrap_err().to_string().contains("no valid"));
    }

    #[test]
    fn trivial_close_emits_single_close_stage() {
        let model = allocate(&Contract::Close, &TokenMap::default());
        let module = emit_module(&model, "trivial").unwrap();
        assert!(module.contains("module generated::trivial"));
        assert!(module.contains("close_stage_0"));
        assert!(!module.contains("close_stage_1"));
    }

    #[test]
    fn pay_chains_into_internal_pay_routine() {
        let c = Contract::Pay {
            from_account: Party::Address("0xA".into()),
            to: Payee::Party(Party::Address("0xB".into())),
            token: Token::default(),
            value: Value::Constant(100),
            then: Box::new(Contract::Close),
        };
        let model = allocate(&c, &TokenMap::default());
        let module = emit_module(&model, "single_pay").unwrap();
        assert!(module.contains("internal_pay_stage_0"));
        assert!(module.contains("close_stage_1"));
    }

    #[test]
    fn pay_to_account_is_rejected_at_compile_time() {
        let c = Contract::Pay {
            from_account: Party::Address("0xA".into()),
            to: Payee::Account(Party::Address("0xB".into())),
            token: Token::default(),
            value: Value::Constant(100),
            then: Box::new(Contract::Close),
        };
        let model = allocate(&c, &TokenMap::default());
        let err = emit_module(&model, "bad_pay").unwrap_err();
        assert!(matches!(err, CompileError::PayToAccountUnsupported { stage: 0 }));
    }
}
