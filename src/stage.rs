//! Allocates dense integer stage IDs to every node in a [`Contract`] via a single
//! depth-first traversal, and resolves token types along the way.
//!
//! This is the compiler's only traversal of the AST proper — the bytecode compiler
//! and target emitter both work off the [`StageModel`] this module produces, not off
//! the `Contract` tree directly (apart from re-descending into `Value`/`Observation`
//! subtrees, which stage allocation does not need to look inside).

use crate::ast::{Action, Bound, ChoiceId, Contract, Observation, Party, Payee, Token, Value};
use crate::token_map::TokenMap;
use std::collections::HashMap;

/// One case of a `when`'s `Deposit` action, flattened out of the AST with its
/// resolved target token type attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositCase {
    pub stage: u64,
    pub case_index: usize,
    pub next: u64,
    pub party: Party,
    pub into_account: Party,
    pub token: Token,
    pub target_type: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceCase {
    pub stage: u64,
    pub case_index: usize,
    pub next: u64,
    pub choice_id: ChoiceId,
    pub bounds: Vec<Bound>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifyCase {
    pub stage: u64,
    pub case_index: usize,
    pub next: u64,
    pub obs: Observation,
}

/// The record emitted for one stage ID. `When` carries no `next`: its successors
/// live in the per-kind case tables plus `timeout_stage`.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRecord {
    Close {
        stage: u64,
    },
    Pay {
        stage: u64,
        next: u64,
        from_account: Party,
        to: Payee,
        token: Token,
        target_type: String,
        value: Value,
    },
    If {
        stage: u64,
        then: u64,
        else_: u64,
        obs: Observation,
    },
    When {
        stage: u64,
        timeout: i64,
        cases_count: usize,
        timeout_stage: u64,
    },
    Let {
        stage: u64,
        next: u64,
        name: String,
        value: Value,
    },
    Assert {
        stage: u64,
        next: u64,
        obs: Observation,
    },
}

impl StageRecord {
    pub fn stage(&self) -> u64 {
        match self {
            StageRecord::Close { stage }
            | StageRecord::Pay { stage, .. }
            | StageRecord::If { stage, .. }
            | StageRecord::When { stage, .. }
            | StageRecord::Let { stage, .. }
            | StageRecord::Assert { stage, .. } => *stage,
        }
    }
}

/// The flattened, dense-stage-numbered form of a contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageModel {
    pub records: HashMap<u64, StageRecord>,
    pub deposit_cases: Vec<DepositCase>,
    pub choice_cases: Vec<ChoiceCase>,
    pub notify_cases: Vec<NotifyCase>,
    /// The traversal's returned counter: stage IDs span `[0, stage_count)`.
    pub stage_count: u64,
}

/// Allocate stage IDs for `contract`, resolving every `Deposit`/`Pay` token through
/// `tokens` along the way.
pub fn allocate(contract: &Contract, tokens: &TokenMap) -> StageModel {
    let mut model = StageModel::default();
    let end = alloc_contract(contract, 0, &mut model, tokens);
    model.stage_count = end;
    model
}

fn alloc_contract(contract: &Contract, stage: u64, model: &mut StageModel, tokens: &TokenMap) -> u64 {
    match contract {
        Contract::Close => {
            tracing::debug!(stage, kind = "close", "allocated stage");
            model.records.insert(stage, StageRecord::Close { stage });
            stage + 1
        }
        Contract::Pay { from_account, to, token, value, then } => {
            let next = stage + 1;
            let end = alloc_contract(then, next, model, tokens);
            let target_type = tokens.resolve(&token.currency_symbol, &token.token_name);
            tracing::debug!(stage, kind = "pay", next, target_type, "allocated stage");
            model.records.insert(
                stage,
                StageRecord::Pay {
                    stage,
                    next,
                    from_account: from_account.clone(),
                    to: to.clone(),
                    token: token.clone(),
                    target_type,
                    value: value.clone(),
                },
            );
            end
        }
        Contract::If { obs, then, else_ } => {
            let then_start = stage + 1;
            let else_start = alloc_contract(then, then_start, model, tokens);
            let end = alloc_contract(else_, else_start, model, tokens);
            tracing::debug!(stage, kind = "if", then = then_start, else_ = else_start, "allocated stage");
            model.records.insert(
                stage,
                StageRecord::If { stage, then: then_start, else_: else_start, obs: obs.clone() },
            );
            end
        }
        Contract::Let { name, value, then } => {
            let next = stage + 1;
            let end = alloc_contract(then, next, model, tokens);
            tracing::debug!(stage, kind = "let", next, name = name.as_str(), "allocated stage");
            model.records.insert(
                stage,
                StageRecord::Let { stage, next, name: name.clone(), value: value.clone() },
            );
            end
        }
        Contract::Assert { obs, then } => {
            let next = stage + 1;
            let end = alloc_contract(then, next, model, tokens);
            tracing::debug!(stage, kind = "assert", next, "allocated stage");
            model.records.insert(stage, StageRecord::Assert { stage, next, obs: obs.clone() });
            end
        }
        Contract::When { cases, timeout, timeout_continuation } => {
            let mut counter = stage + 1;
            for (i, case) in cases.iter().enumerate() {
                let case_start = counter;
                counter = alloc_contract(&case.then, case_start, model, tokens);
                match &case.action {
                    Action::Deposit { party, into_account, token, value } => {
                        let target_type = tokens.resolve(&token.currency_symbol, &token.token_name);
                        model.deposit_cases.push(DepositCase {
                            stage,
                            case_index: i,
                            next: case_start,
                            party: party.clone(),
                            into_account: into_account.clone(),
                            token: token.clone(),
                            target_type,
                            value: value.clone(),
                        });
                    }
                    Action::Choice { choice_id, bounds } => {
                        model.choice_cases.push(ChoiceCase {
                            stage,
                            case_index: i,
                            next: case_start,
                            choice_id: choice_id.clone(),
                            bounds: bounds.clone(),
                        });
                    }
                    Action::Notify(obs) => {
                        model.notify_cases.push(NotifyCase {
                            stage,
                            case_index: i,
                            next: case_start,
                            obs: obs.clone(),
                        });
                    }
                }
            }
            let timeout_stage = counter;
            let end = alloc_contract(timeout_continuation, timeout_stage, model, tokens);
            tracing::debug!(
                stage,
                kind = "when",
                cases_count = cases.len(),
                timeout_stage,
                "allocated stage"
            );
            model.records.insert(
                stage,
                StageRecord::When { stage, timeout: *timeout, cases_count: cases.len(), timeout_stage },
            );
            end
        }
    }
}
