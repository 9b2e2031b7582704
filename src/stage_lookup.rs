//! A composite, query-friendly view over a [`StageModel`], built once per compile.
//!
//! The allocator splits a `When`'s cases out by action kind (deposit / choice /
//! notify), since each kind carries different fields. The emitter, by contrast,
//! wants to walk a `When`'s cases back in their original declaration order
//! (to name routines `..._case_0`, `..._case_1`, ...) without caring which kind
//! each one is. [`StageLookup`] recomposes that order and also answers the
//! invariant checks from the testable-properties section: dense pointer closure
//! and full case-index coverage.

use std::collections::HashMap;

use crate::stage::{ChoiceCase, DepositCase, NotifyCase, StageModel, StageRecord};

/// One case of a `When`, recomposed from whichever per-kind table it lives in.
#[derive(Debug, Clone, Copy)]
pub enum CaseRecord<'a> {
    Deposit(&'a DepositCase),
    Choice(&'a ChoiceCase),
    Notify(&'a NotifyCase),
}

impl<'a> CaseRecord<'a> {
    pub fn case_index(&self) -> usize {
        match self {
            CaseRecord::Deposit(d) => d.case_index,
            CaseRecord::Choice(c) => c.case_index,
            CaseRecord::Notify(n) => n.case_index,
        }
    }

    pub fn next(&self) -> u64 {
        match self {
            CaseRecord::Deposit(d) => d.next,
            CaseRecord::Choice(c) => c.next,
            CaseRecord::Notify(n) => n.next,
        }
    }
}

pub struct StageLookup<'a> {
    model: &'a StageModel,
    by_stage: HashMap<u64, Vec<CaseRecord<'a>>>,
}

impl<'a> StageLookup<'a> {
    pub fn build(model: &'a StageModel) -> Self {
        let mut by_stage: HashMap<u64, Vec<CaseRecord<'a>>> = HashMap::new();
        for d in &model.deposit_cases {
            by_stage.entry(d.stage).or_default().push(CaseRecord::Deposit(d));
        }
        for c in &model.choice_cases {
            by_stage.entry(c.stage).or_default().push(CaseRecord::Choice(c));
        }
        for n in &model.notify_cases {
            by_stage.entry(n.stage).or_default().push(CaseRecord::Notify(n));
        }
        for cases in by_stage.values_mut() {
            cases.sort_by_key(|c| c.case_index());
        }
        StageLookup { model, by_stage }
    }

    pub fn record(&self, stage: u64) -> Option<&StageRecord> {
        self.model.records.get(&stage)
    }

    /// The cases belonging to the `When` at `stage`, in declaration order.
    pub fn cases(&self, stage: u64) -> &[CaseRecord<'a>] {
        self.by_stage.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stage_count(&self) -> u64 {
        self.model.stage_count
    }

    /// Every `next`/`then`/`else_`/`timeout_stage` pointer resolves to either the
    /// traversal's terminal stage count or a record actually present.
    pub fn pointer_closure_holds(&self) -> bool {
        let valid = |s: u64| s == self.model.stage_count || self.model.records.contains_key(&s);
        for record in self.model.records.values() {
            let ok = match record {
                StageRecord::Close { .. } => true,
                StageRecord::Pay { next, .. } | StageRecord::Let { next, .. } | StageRecord::Assert { next, .. } => {
                    valid(*next)
                }
                StageRecord::If { then, else_, .. } => valid(*then) && valid(*else_),
                StageRecord::When { timeout_stage, .. } => valid(*timeout_stage),
            };
            if !ok {
                return false;
            }
        }
        for cases in self.by_stage.values() {
            if !cases.iter().all(|c| valid(c.next())) {
                return false;
            }
        }
        true
    }

    /// For every `When(s)` with `k` cases, the recomposed case indices at `s`
    /// are exactly `[0, k)` with no gaps or duplicates.
    pub fn case_coverage_holds(&self) -> bool {
        for record in self.model.records.values() {
            if let StageRecord::When { stage, cases_count, .. } = record {
                let mut indices: Vec<usize> = self.cases(*stage).iter().map(|c| c.case_index()).collect();
                indices.sort_unstable();
                let expected: Vec<usize> = (0..*cases_count).collect();
                if indices != expected {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::stage::allocate;
    use crate::token_map::TokenMap;

    #[test]
    fn recomposes_mixed_case_kinds_in_declaration_order() {
        let c = Contract::When {
            cases: vec![
                Case {
                    action: Action::Notify(Observation::True),
                    then: Contract::Close,
                },
                Case {
                    action: Action::Deposit {
                        party: Party::Address("0xA".into()),
                        into_account: Party::Address("0xA".into()),
                        token: Token::default(),
                        value: Value::Constant(1),
                    },
                    then: Contract::Close,
                },
            ],
            timeout: 10,
            timeout_continuation: Box::new(Contract::Close),
        };
        let model = allocate(&c, &TokenMap::default());
        let lookup = StageLookup::build(&model);
        let cases = lookup.cases(0);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].case_index(), 0);
        assert_eq!(cases[1].case_index(), 1);
        assert!(matches!(cases[0], CaseRecord::Notify(_)));
        assert!(matches!(cases[1], CaseRecord::Deposit(_)));
    }

    #[test]
    fn pointer_closure_and_coverage_hold_for_nontrivial_contract() {
        let c = Contract::If {
            obs: Observation::True,
            then: Box::new(Contract::When {
                cases: vec![Case { action: Action::Notify(Observation::False), then: Contract::Close }],
                timeout: 5,
                timeout_continuation: Box::new(Contract::Close),
            }),
            else_: Box::new(Contract::Close),
        };
        let model = allocate(&c, &TokenMap::default());
        let lookup = StageLookup::build(&model);
        assert!(lookup.pointer_closure_holds());
        assert!(lookup.case_coverage_holds());
    }
}
