//! The automation chain: tail-calling from one auto-stage into the next within a
//! single transaction. Grounded in `original_source/generator/move_generator.py`'s
//! `generate_automation_tail`.

use crate::stage::StageRecord;
use crate::stage_lookup::StageLookup;

/// The code to splice at the tail of a routine whose successor is `next`.
///
/// Internal kinds (`Pay`, `If`, `Let`, `Assert`) get tail-called directly so that
/// a chain of them collapses into one transaction. External-facing successors
/// (`When`, `Close`) or `next == stage_count` (the contract has no more stages)
/// only update `contract.stage`.
pub fn automation_tail(next: u64, lookup: &StageLookup) -> String {
    match lookup.record(next) {
        Some(StageRecord::Pay { .. }) => {
            format!("contract.stage = {next};\n        internal_pay_stage_{next}(contract, ctx);")
        }
        Some(StageRecord::If { .. }) => {
            format!("contract.stage = {next};\n        internal_if_stage_{next}(contract, ctx);")
        }
        Some(StageRecord::Let { .. }) => {
            format!("contract.stage = {next};\n        internal_let_stage_{next}(contract, ctx);")
        }
        Some(StageRecord::Assert { .. }) => {
            format!("contract.stage = {next};\n        internal_assert_stage_{next}(contract, ctx);")
        }
        _ => format!("contract.stage = {next};"),
    }
}

/// The timeout a `When` at `stage` was declared with, if one applies (`> 0`).
pub fn when_timeout(lookup: &StageLookup, stage: u64) -> Option<i64> {
    match lookup.record(stage) {
        Some(StageRecord::When { timeout, .. }) if *timeout > 0 => Some(*timeout),
        _ => None,
    }
}
