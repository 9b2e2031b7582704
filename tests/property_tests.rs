//! Property-based tests over the testable invariants: parser round-trip, dense
//! stage IDs, pointer closure, `when` case coverage, bytecode determinism, VM
//! soundness, and automation reachability.
//!
//! Strategies build small, depth-bounded recursive ASTs rather than flat random
//! structures, since every interesting property here depends on recursive shape
//! (nested `If`/`When`, nested arithmetic).

use proptest::prelude::*;

use marlowe_move::ast::{Action, Bound, Case, ChoiceId, Contract, Observation, Party, Payee, Token, Value};
use marlowe_move::bytecode::interp::{eval, Env};
use marlowe_move::bytecode::{compile_observation, compile_value};
use marlowe_move::parser::{contract_to_json, parse_contract};
use marlowe_move::stage::allocate;
use marlowe_move::stage_lookup::StageLookup;
use marlowe_move::token_map::TokenMap;

const NAMES: [&str; 3] = ["Alice", "Bob", "Carol"];

fn party_strategy() -> impl Strategy<Value = Party> {
    (0..NAMES.len(), any::<bool>()).prop_map(|(i, is_role)| {
        if is_role { Party::Role(NAMES[i].to_string()) } else { Party::Address(format!("0x{}", NAMES[i])) }
    })
}

fn token_strategy() -> impl Strategy<Value = Token> {
    Just(Token::default())
}

fn choice_id_strategy() -> impl Strategy<Value = ChoiceId> {
    (prop_oneof![Just("decision"), Just("vote")], party_strategy())
        .prop_map(|(name, owner)| ChoiceId { name: name.to_string(), owner })
}

fn value_strategy(depth: u32) -> BoxedStrategy<Value> {
    let leaf = prop_oneof![
        (0i64..1_000).prop_map(Value::Constant),
        Just(Value::TimeIntervalStart),
        Just(Value::TimeIntervalEnd),
        (token_strategy(), party_strategy()).prop_map(|(t, p)| Value::AvailableMoney(t, p)),
        choice_id_strategy().prop_map(Value::ChoiceValue),
        prop_oneof![Just("x"), Just("y")].prop_map(|n| Value::UseValue(n.to_string())),
    ];
    if depth == 0 {
        return leaf.boxed();
    }
    let inner = value_strategy(depth - 1);
    prop_oneof![
        leaf,
        inner.clone().prop_map(|v| Value::NegValue(Box::new(v))),
        (value_strategy(depth - 1), value_strategy(depth - 1)).prop_map(|(l, r)| Value::AddValue(Box::new(l), Box::new(r))),
        (value_strategy(depth - 1), value_strategy(depth - 1)).prop_map(|(l, r)| Value::SubValue(Box::new(l), Box::new(r))),
        (value_strategy(depth - 1), value_strategy(depth - 1)).prop_map(|(l, r)| Value::MulValue(Box::new(l), Box::new(r))),
        (value_strategy(depth - 1), value_strategy(depth - 1)).prop_map(|(l, r)| Value::DivValue(Box::new(l), Box::new(r))),
        (observation_strategy(depth - 1), value_strategy(depth - 1), value_strategy(depth - 1))
            .prop_map(|(o, t, e)| Value::Cond(Box::new(o), Box::new(t), Box::new(e))),
    ]
    .boxed()
}

fn observation_strategy(depth: u32) -> BoxedStrategy<Observation> {
    let leaf = prop_oneof![Just(Observation::True), Just(Observation::False), choice_id_strategy().prop_map(Observation::ChoseSomething),];
    if depth == 0 {
        return leaf.boxed();
    }
    prop_oneof![
        leaf,
        (observation_strategy(depth - 1), observation_strategy(depth - 1)).prop_map(|(l, r)| Observation::And(Box::new(l), Box::new(r))),
        (observation_strategy(depth - 1), observation_strategy(depth - 1)).prop_map(|(l, r)| Observation::Or(Box::new(l), Box::new(r))),
        observation_strategy(depth - 1).prop_map(|o| Observation::Not(Box::new(o))),
        (value_strategy(1), value_strategy(1)).prop_map(|(l, r)| Observation::ValueGE(l, r)),
        (value_strategy(1), value_strategy(1)).prop_map(|(l, r)| Observation::ValueGT(l, r)),
        (value_strategy(1), value_strategy(1)).prop_map(|(l, r)| Observation::ValueLT(l, r)),
        (value_strategy(1), value_strategy(1)).prop_map(|(l, r)| Observation::ValueLE(l, r)),
        (value_strategy(1), value_strategy(1)).prop_map(|(l, r)| Observation::ValueEQ(l, r)),
    ]
    .boxed()
}

fn bound_strategy() -> impl Strategy<Value = Bound> {
    (0i64..20, 20i64..40).prop_map(|(from, to)| Bound { from, to })
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (party_strategy(), party_strategy(), token_strategy(), value_strategy(1))
            .prop_map(|(party, into_account, token, value)| Action::Deposit { party, into_account, token, value }),
        (choice_id_strategy(), prop::collection::vec(bound_strategy(), 1..3))
            .prop_map(|(choice_id, bounds)| Action::Choice { choice_id, bounds }),
        observation_strategy(1).prop_map(Action::Notify),
    ]
}

fn contract_strategy(depth: u32) -> BoxedStrategy<Contract> {
    let close = Just(Contract::Close).boxed();
    if depth == 0 {
        return close;
    }
    let pay = (party_strategy(), party_strategy(), token_strategy(), value_strategy(1), contract_strategy(depth - 1))
        .prop_map(|(from_account, to, token, value, then)| Contract::Pay {
            from_account,
            to: Payee::Party(to),
            token,
            value,
            then: Box::new(then),
        });
    let if_ = (observation_strategy(1), contract_strategy(depth - 1), contract_strategy(depth - 1))
        .prop_map(|(obs, then, else_)| Contract::If { obs, then: Box::new(then), else_: Box::new(else_) });
    let let_ = (prop_oneof![Just("x"), Just("y")], value_strategy(1), contract_strategy(depth - 1))
        .prop_map(|(name, value, then)| Contract::Let { name: name.to_string(), value, then: Box::new(then) });
    let assert_ = (observation_strategy(1), contract_strategy(depth - 1))
        .prop_map(|(obs, then)| Contract::Assert { obs, then: Box::new(then) });
    let when = (
        prop::collection::vec((action_strategy(), contract_strategy(depth - 1)).prop_map(|(action, then)| Case { action, then }), 1..3),
        0i64..10_000,
        contract_strategy(depth - 1),
    )
        .prop_map(|(cases, timeout, timeout_continuation)| Contract::When {
            cases,
            timeout,
            timeout_continuation: Box::new(timeout_continuation),
        });
    prop_oneof![close, pay.boxed(), if_.boxed(), let_.boxed(), assert_.boxed(), when.boxed()].boxed()
}

/// Any party/token/choice combination the strategies above can name, pre-wired
/// into an [`Env`] with deterministic-but-arbitrary state so bytecode referring
/// to it evaluates the same way a direct AST walk would.
fn fixture_env(now_ms: u64, account_amount: u64, choice_value: u64, bound_value: u64) -> Env {
    let mut env = Env::default();
    for name in NAMES {
        env.accounts.insert((Party::Role(name.to_string()).repr(), "SUI".to_string()), account_amount);
        env.accounts.insert((Party::Address(format!("0x{name}")).repr(), "SUI".to_string()), account_amount);
    }
    for name in ["decision", "vote"] {
        for owner in NAMES {
            env.choices.insert(ChoiceId { name: name.to_string(), owner: Party::Role(owner.to_string()) }.key(), choice_value);
        }
    }
    for name in ["x", "y"] {
        env.bound_values.insert(name.to_string(), bound_value);
    }
    env.now_ms = now_ms;
    env
}

/// A direct, non-bytecode evaluation of the same semantics `eval` implements —
/// written straight off the AST so it can't share a bug with the compiler.
fn reference_value(v: &Value, env: &Env) -> u64 {
    match v {
        Value::Constant(n) => *n as u64,
        Value::NegValue(_) => 0,
        Value::AddValue(l, r) => reference_value(l, env) + reference_value(r, env),
        Value::SubValue(l, r) => reference_value(l, env).saturating_sub(reference_value(r, env)),
        Value::MulValue(l, r) => reference_value(l, env) * reference_value(r, env),
        Value::DivValue(l, r) => {
            let b = reference_value(r, env);
            if b == 0 { 0 } else { reference_value(l, env) / b }
        }
        Value::AvailableMoney(_, party) => *env.accounts.get(&(party.repr(), "SUI".to_string())).unwrap_or(&0),
        Value::ChoiceValue(cid) => *env.choices.get(&cid.key()).unwrap_or(&0),
        Value::UseValue(name) => *env.bound_values.get(name).unwrap_or(&0),
        Value::TimeIntervalStart | Value::TimeIntervalEnd => env.now_ms,
        Value::Cond(obs, then_v, else_v) => {
            if reference_observation(obs, env) == 1 { reference_value(then_v, env) } else { reference_value(else_v, env) }
        }
    }
}

fn reference_observation(o: &Observation, env: &Env) -> u64 {
    match o {
        Observation::True => 1,
        Observation::False => 0,
        Observation::And(l, r) => ((reference_observation(l, env) != 0) && (reference_observation(r, env) != 0)) as u64,
        Observation::Or(l, r) => ((reference_observation(l, env) != 0) || (reference_observation(r, env) != 0)) as u64,
        Observation::Not(inner) => (reference_observation(inner, env) == 0) as u64,
        Observation::ChoseSomething(cid) => env.choices.contains_key(&cid.key()) as u64,
        Observation::ValueGE(l, r) => (reference_value(l, env) >= reference_value(r, env)) as u64,
        Observation::ValueGT(l, r) => (reference_value(l, env) > reference_value(r, env)) as u64,
        Observation::ValueLT(l, r) => (reference_value(l, env) < reference_value(r, env)) as u64,
        Observation::ValueLE(l, r) => (reference_value(l, env) <= reference_value(r, env)) as u64,
        Observation::ValueEQ(l, r) => (reference_value(l, env) == reference_value(r, env)) as u64,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every contract round-trips through JSON without changing shape.
    #[test]
    fn prop_parser_round_trips(contract in contract_strategy(3)) {
        let json = contract_to_json(&contract);
        let reparsed = parse_contract(&json).expect("a contract built from AST constructors must reparse");
        prop_assert_eq!(reparsed, contract);
    }

    /// Stage IDs span exactly `[0, N)` with no duplicates, for any contract shape.
    #[test]
    fn prop_dense_stage_ids(contract in contract_strategy(3)) {
        let model = allocate(&contract, &TokenMap::default());
        let mut seen: Vec<u64> = model.records.keys().copied().collect();
        seen.sort_unstable();
        let expected: Vec<u64> = (0..model.stage_count).collect();
        prop_assert_eq!(seen, expected);
    }

    /// Every pointer into the stage table resolves, for any contract shape.
    #[test]
    fn prop_pointer_closure_holds(contract in contract_strategy(3)) {
        let model = allocate(&contract, &TokenMap::default());
        let lookup = StageLookup::build(&model);
        prop_assert!(lookup.pointer_closure_holds());
    }

    /// Every `When`'s case indices exactly cover `[0, k)`.
    #[test]
    fn prop_case_coverage_holds(contract in contract_strategy(3)) {
        let model = allocate(&contract, &TokenMap::default());
        let lookup = StageLookup::build(&model);
        prop_assert!(lookup.case_coverage_holds());
    }

    /// Bytecode is a pure function of the expression tree.
    #[test]
    fn prop_bytecode_is_deterministic(v in value_strategy(3)) {
        prop_assert_eq!(compile_value(&v), compile_value(&v.clone()));
    }

    /// Compiled bytecode agrees with a direct AST-level evaluation under any
    /// account/choice/bound-value/clock fixture.
    #[test]
    fn prop_vm_soundness_on_values(
        v in value_strategy(3),
        now_ms in 0u64..1_000_000,
        account_amount in 0u64..1_000,
        choice_value in 0u64..1_000,
        bound_value in 0u64..1_000,
    ) {
        let env = fixture_env(now_ms, account_amount, choice_value, bound_value);
        let bytecode = compile_value(&v);
        prop_assert_eq!(eval(&bytecode, &env), reference_value(&v, &env));
    }

    #[test]
    fn prop_vm_soundness_on_observations(
        o in observation_strategy(3),
        now_ms in 0u64..1_000_000,
        account_amount in 0u64..1_000,
        choice_value in 0u64..1_000,
        bound_value in 0u64..1_000,
    ) {
        let env = fixture_env(now_ms, account_amount, choice_value, bound_value);
        let bytecode = compile_observation(&o);
        prop_assert_eq!(eval(&bytecode, &env), reference_observation(&o, &env));
    }

    /// Starting from stage 0, following the automation relation (next/then/else_/
    /// timeout_stage) always terminates within `stage_count` hops — no cycle in
    /// the emitted chaining, since the AST it was built from is a finite tree.
    #[test]
    fn prop_automation_reachability_terminates(contract in contract_strategy(3)) {
        let model = allocate(&contract, &TokenMap::default());
        let lookup = StageLookup::build(&model);
        let mut stage = 0u64;
        let mut hops = 0u64;
        while stage != model.stage_count && hops <= model.stage_count {
            stage = match lookup.record(stage) {
                Some(marlowe_move::stage::StageRecord::Close { .. }) => model.stage_count,
                Some(marlowe_move::stage::StageRecord::Pay { next, .. })
                | Some(marlowe_move::stage::StageRecord::Let { next, .. })
                | Some(marlowe_move::stage::StageRecord::Assert { next, .. }) => *next,
                Some(marlowe_move::stage::StageRecord::If { then, .. }) => *then,
                Some(marlowe_move::stage::StageRecord::When { .. }) | None => model.stage_count,
            };
            hops += 1;
        }
        prop_assert!(hops <= model.stage_count, "automation chain did not terminate within stage_count hops");
    }
}
