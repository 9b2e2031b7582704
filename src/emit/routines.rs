//! Renders the one entry routine per stage record (§4.4), plus the auto-chained
//! internal routines for `Pay`/`If`/`Let`/`Assert`.
//!
//! Grounded in `original_source/generator/move_generator.py`'s
//! `generate_deposit_function` / `generate_choice_function` /
//! `generate_notify_function` / `generate_pay_function` / `generate_if_function` /
//! `generate_let_function` / `generate_assert_function` / `generate_close_function` /
//! `generate_timeout_function`, each adapted from that file's per-case Python
//! f-strings into Rust `format!` templates emitting the same routine shape.

use std::fmt::Write as _;

use crate::ast::{Observation, Party, Payee, Value};
use crate::bytecode::{compile_observation, compile_value, to_vector_literal};
use crate::emit::automation::{automation_tail, when_timeout};
use crate::error::CompileError;
use crate::stage::{ChoiceCase, DepositCase, NotifyCase};
use crate::stage_lookup::StageLookup;

struct Auth {
    extra_param: Option<&'static str>,
    assertion: String,
}

/// Caller-authorisation clause for a party: a role capability check, or a plain
/// sender-address equality check.
fn auth_for(party: &Party) -> Auth {
    match party {
        Party::Role(name) => Auth {
            extra_param: Some("role_nft: &RoleNFT"),
            assertion: format!("assert_role(contract, role_nft, string::utf8(b\"{name}\"));"),
        },
        Party::Address(addr) => Auth {
            extra_param: None,
            assertion: format!("assert!(tx_context::sender(ctx) == @{addr}, E_WRONG_CALLER);"),
        },
    }
}

pub fn render_deposit_case(case: &DepositCase, lookup: &StageLookup) -> String {
    let fn_name = format!("deposit_stage_{}_case_{}", case.stage, case.case_index);
    let auth = auth_for(&case.party);

    let mut sig = vec!["contract: &mut Contract".to_string()];
    if let Some(p) = auth.extra_param {
        sig.push(p.to_string());
    }
    sig.push(format!("deposit_coin: Coin<{}>", case.target_type));
    sig.push("ctx: &mut TxContext".to_string());

    let expected = to_vector_literal(&compile_value(&case.value));
    let mut assertions = vec![
        format!("assert!(contract.stage == {}, E_WRONG_STAGE);", case.stage),
        format!("assert!(coin::value(&deposit_coin) == internal_eval(contract, {expected}, ctx), E_WRONG_AMOUNT);"),
    ];
    if let Some(timeout) = when_timeout(lookup, case.stage) {
        assertions.push(format!("assert!(tx_context::epoch_timestamp_ms(ctx) < {timeout}, E_TIMEOUT_PASSED);"));
    }
    assertions.push(auth.assertion);

    let party_key = case.party.repr();
    let tail = automation_tail(case.next, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {} / case {}: deposit by {party_key}", case.stage, case.case_index);
    let _ = writeln!(out, "    public fun {fn_name}(\n        {}\n    ) {{", sig.join(",\n        "));
    let _ = writeln!(out, "        {}", assertions.join("\n        "));
    let _ = writeln!(out, "\n        internal_deposit<{}>(contract, string::utf8(b\"{party_key}\"), deposit_coin, ctx);", case.target_type);
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_choice_case(case: &ChoiceCase, lookup: &StageLookup) -> String {
    let fn_name = format!("choice_stage_{}_case_{}", case.stage, case.case_index);
    let auth = auth_for(&case.choice_id.owner);

    let mut sig = vec!["contract: &mut Contract".to_string()];
    if let Some(p) = auth.extra_param {
        sig.push(p.to_string());
    }
    sig.push("chosen_num: u64".to_string());
    sig.push("ctx: &mut TxContext".to_string());

    let mut assertions = vec![format!("assert!(contract.stage == {}, E_WRONG_STAGE);", case.stage)];
    if let Some(timeout) = when_timeout(lookup, case.stage) {
        assertions.push(format!("assert!(tx_context::epoch_timestamp_ms(ctx) < {timeout}, E_TIMEOUT_PASSED);"));
    }
    assertions.push(auth.assertion);
    let bounds_checks: Vec<String> =
        case.bounds.iter().map(|b| format!("(chosen_num >= {} && chosen_num <= {})", b.from, b.to)).collect();
    assertions.push(format!("assert!({}, E_INVALID_CHOICE);", bounds_checks.join(" || ")));

    let key = case.choice_id.key();
    let tail = automation_tail(case.next, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {} / case {}: choice \"{}\"", case.stage, case.case_index, case.choice_id.name);
    let _ = writeln!(out, "    public fun {fn_name}(\n        {}\n    ) {{", sig.join(",\n        "));
    let _ = writeln!(out, "        {}", assertions.join("\n        "));
    let _ = writeln!(out, "\n        let choice_key = string::utf8(b\"{key}\");");
    let _ = writeln!(out, "        if (table::contains(&contract.choices, choice_key)) {{");
    let _ = writeln!(out, "            *table::borrow_mut(&mut contract.choices, choice_key) = chosen_num;");
    let _ = writeln!(out, "        }} else {{");
    let _ = writeln!(out, "            table::add(&mut contract.choices, choice_key, chosen_num);");
    let _ = writeln!(out, "        }};");
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_notify_case(case: &NotifyCase, lookup: &StageLookup) -> String {
    let fn_name = format!("notify_stage_{}_case_{}", case.stage, case.case_index);
    let bytes = to_vector_literal(&compile_observation(&case.obs));

    let mut assertions = vec![
        format!("assert!(contract.stage == {}, E_WRONG_STAGE);", case.stage),
        format!("assert!(internal_eval(contract, {bytes}, ctx) == 1, E_ASSERT_FAILED);"),
    ];
    if let Some(timeout) = when_timeout(lookup, case.stage) {
        assertions.push(format!("assert!(tx_context::epoch_timestamp_ms(ctx) < {timeout}, E_TIMEOUT_PASSED);"));
    }
    let tail = automation_tail(case.next, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {} / case {}: notify", case.stage, case.case_index);
    let _ = writeln!(out, "    public fun {fn_name}(contract: &mut Contract, ctx: &mut TxContext) {{");
    let _ = writeln!(out, "        {}", assertions.join("\n        "));
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_pay(
    stage: u64,
    from_account: &Party,
    to: &Payee,
    target_type: &str,
    value: &Value,
    lookup: &StageLookup,
) -> Result<String, CompileError> {
    let receiver_code = match to {
        Payee::Party(Party::Address(addr)) => format!("let receiver_addr = @{addr};"),
        Payee::Party(Party::Role(name)) => format!(
            "assert!(table::contains(&contract.role_registry, string::utf8(b\"{name}\")), E_ROLE_NOT_FOUND);\n        let receiver_addr = *table::borrow(&contract.role_registry, string::utf8(b\"{name}\"));"
        ),
        Payee::Account(_) => return Err(CompileError::PayToAccountUnsupported { stage }),
    };

    let amount_bytes = to_vector_literal(&compile_value(value));
    let from_key = from_account.repr();
    let next = stage + 1;
    let tail = automation_tail(next, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {stage}: automatic pay from {from_key}");
    let _ = writeln!(out, "    fun internal_pay_stage_{stage}(contract: &mut Contract, ctx: &mut TxContext) {{");
    let _ = writeln!(out, "        assert!(contract.stage == {stage}, E_WRONG_STAGE);");
    let _ = writeln!(out, "\n        let amount = internal_eval(contract, {amount_bytes}, ctx);");
    let _ = writeln!(out, "        let from_party_id = string::utf8(b\"{from_key}\");");
    let _ = writeln!(out, "        {receiver_code}");
    let _ = writeln!(out, "\n        internal_pay<{target_type}>(contract, from_party_id, receiver_addr, amount, ctx);");
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    Ok(out)
}

pub fn render_if(stage: u64, obs: &Observation, then: u64, else_: u64, lookup: &StageLookup) -> String {
    let cond_bytes = to_vector_literal(&compile_observation(obs));
    let then_tail = automation_tail(then, lookup);
    let else_tail = automation_tail(else_, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {stage}: conditional branch");
    let _ = writeln!(out, "    fun internal_if_stage_{stage}(contract: &mut Contract, ctx: &mut TxContext) {{");
    let _ = writeln!(out, "        assert!(contract.stage == {stage}, E_WRONG_STAGE);");
    let _ = writeln!(out, "        let condition = (internal_eval(contract, {cond_bytes}, ctx) == 1);");
    let _ = writeln!(out, "        if (condition) {{");
    let _ = writeln!(out, "            {then_tail}");
    let _ = writeln!(out, "        }} else {{");
    let _ = writeln!(out, "            {else_tail}");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_let(stage: u64, name: &str, value: &Value, lookup: &StageLookup) -> String {
    let bytes = to_vector_literal(&compile_value(value));
    let tail = automation_tail(stage + 1, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {stage}: let \"{name}\"");
    let _ = writeln!(out, "    fun internal_let_stage_{stage}(contract: &mut Contract, ctx: &mut TxContext) {{");
    let _ = writeln!(out, "        assert!(contract.stage == {stage}, E_WRONG_STAGE);");
    let _ = writeln!(out, "        let val = internal_eval(contract, {bytes}, ctx);");
    let _ = writeln!(out, "        let val_id = string::utf8(b\"{name}\");");
    let _ = writeln!(out, "        if (table::contains(&contract.bound_values, val_id)) {{");
    let _ = writeln!(out, "            *table::borrow_mut(&mut contract.bound_values, val_id) = val;");
    let _ = writeln!(out, "        }} else {{");
    let _ = writeln!(out, "            table::add(&mut contract.bound_values, val_id, val);");
    let _ = writeln!(out, "        }};");
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_assert(stage: u64, obs: &Observation, lookup: &StageLookup) -> String {
    let bytes = to_vector_literal(&compile_observation(obs));
    let tail = automation_tail(stage + 1, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {stage}: assert");
    let _ = writeln!(out, "    fun internal_assert_stage_{stage}(contract: &mut Contract, ctx: &mut TxContext) {{");
    let _ = writeln!(out, "        assert!(contract.stage == {stage}, E_WRONG_STAGE);");
    let _ = writeln!(out, "        assert!(internal_eval(contract, {bytes}, ctx) == 1, E_ASSERT_FAILED);");
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_close(stage: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {stage}: terminal");
    let _ = writeln!(out, "    public fun close_stage_{stage}(contract: &mut Contract) {{");
    let _ = writeln!(out, "        assert!(contract.stage == {stage}, E_WRONG_STAGE);");
    let _ = writeln!(out, "    }}");
    out
}

pub fn render_timeout(stage: u64, timeout: i64, timeout_stage: u64, lookup: &StageLookup) -> String {
    let tail = automation_tail(timeout_stage, lookup);

    let mut out = String::new();
    let _ = writeln!(out, "\n    /// Stage {stage}: timeout handler (timeout={timeout}ms)");
    let _ = writeln!(out, "    public fun timeout_stage_{stage}(contract: &mut Contract, ctx: &mut TxContext) {{");
    let _ = writeln!(out, "        assert!(contract.stage == {stage}, E_WRONG_STAGE);");
    let _ = writeln!(out, "        let current_time = tx_context::epoch_timestamp_ms(ctx);");
    let _ = writeln!(out, "        assert!(current_time >= {timeout}, E_TIMEOUT_NOT_YET);");
    let _ = writeln!(out, "        {tail}");
    let _ = writeln!(out, "    }}");
    out
}
