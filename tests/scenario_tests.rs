//! The six concrete end-to-end scenarios, exercised through the full
//! `compile()` pipeline rather than any one module in isolation.

use serde_json::json;

use marlowe_move::ast::{Bound, ChoiceId, Party};
use marlowe_move::stage::{allocate, StageRecord};
use marlowe_move::token_map::TokenMap;
use marlowe_move::{compile, parser};

#[test]
fn scenario_1_trivial_close() {
    let json = json!("close");
    let compiled = compile("trivial", &json, &TokenMap::default()).unwrap();
    assert_eq!(compiled.stage_count, 1);
    assert!(compiled.tcl_source.contains("close_stage_0"));
    assert!(!compiled.tcl_source.contains("close_stage_1"));

    let contract = parser::parse_contract(&json).unwrap();
    let model = allocate(&contract, &TokenMap::default());
    assert!(matches!(model.records[&0], StageRecord::Close { stage: 0 }));
}

#[test]
fn scenario_2_single_pay_to_address() {
    let json = json!({
        "from_account": {"address": "0xA"},
        "to": {"party": {"address": "0xB"}},
        "token": {"currency_symbol": "", "token_name": ""},
        "pay": 100,
        "then": "close",
    });
    let contract = parser::parse_contract(&json).unwrap();
    let model = allocate(&contract, &TokenMap::default());
    assert_eq!(model.stage_count, 2);
    match &model.records[&0] {
        StageRecord::Pay { next, target_type, .. } => {
            assert_eq!(*next, 1);
            assert_eq!(target_type, "sui::sui::SUI");
        }
        other => panic!("expected Pay, got {other:?}"),
    }
    assert!(matches!(model.records[&1], StageRecord::Close { stage: 1 }));

    let compiled = compile("single_pay", &json, &TokenMap::default()).unwrap();
    assert!(compiled.tcl_source.contains("internal_pay_stage_0"));
    assert!(compiled.tcl_source.contains("stage == 0"));
}

#[test]
fn scenario_3_when_with_one_deposit_and_timeout() {
    let json = json!({
        "when": [{
            "case": {
                "party": {"address": "0xA"},
                "into_account": {"address": "0xA"},
                "of_token": {"currency_symbol": "", "token_name": ""},
                "deposits": 50,
            },
            "then": "close",
        }],
        "timeout": 1000,
        "timeout_continuation": "close",
    });
    let contract = parser::parse_contract(&json).unwrap();
    let model = allocate(&contract, &TokenMap::default());
    assert_eq!(model.stage_count, 3);
    assert_eq!(model.deposit_cases.len(), 1);
    let case = &model.deposit_cases[0];
    assert_eq!((case.stage, case.case_index, case.next), (0, 0, 1));
    assert!(matches!(model.records[&1], StageRecord::Close { stage: 1 }));
    assert!(matches!(model.records[&2], StageRecord::Close { stage: 2 }));

    let compiled = compile("deposit_timeout", &json, &TokenMap::default()).unwrap();
    assert!(compiled.tcl_source.contains("deposit_stage_0_case_0"));
    assert!(compiled.tcl_source.contains("timeout_stage_0"));
    assert!(compiled.tcl_source.contains("close_stage_1"));
    assert!(compiled.tcl_source.contains("close_stage_2"));
}

#[test]
fn scenario_4_choice_by_role_with_bounds() {
    let bounds = vec![Bound { from: 1, to: 5 }, Bound { from: 10, to: 20 }];
    assert!(!bounds.iter().any(|b| b.contains(6)));
    assert!(bounds.iter().any(|b| b.contains(3)));
    assert!(bounds.iter().any(|b| b.contains(15)));

    let json = json!({
        "when": [{
            "case": {
                "for_choice": {"choice_name": "decision", "choice_owner": {"role": "Alice"}},
                "choose_between": [{"from": 1, "to": 5}, {"from": 10, "to": 20}],
            },
            "then": "close",
        }],
        "timeout": 0,
        "timeout_continuation": "close",
    });
    let compiled = compile("choice_contract", &json, &TokenMap::default()).unwrap();
    assert!(compiled.tcl_source.contains("choice_stage_0_case_0"));
    assert!(compiled.tcl_source.contains("role_nft: &RoleNFT"));
    assert!(compiled.tcl_source.contains("assert_role(contract, role_nft, string::utf8(b\"Alice\"))"));
    assert!(compiled.tcl_source.contains("E_INVALID_CHOICE"));
    assert!(compiled.tcl_source.contains("(chosen_num >= 1 && chosen_num <= 5) || (chosen_num >= 10 && chosen_num <= 20)"));

    let cid = ChoiceId { name: "decision".to_string(), owner: Party::Role("Alice".to_string()) };
    assert_eq!(cid.key(), "decision:Role(Alice)");
}

#[test]
fn scenario_5_expression_compile() {
    use marlowe_move::ast::{Observation, Token, Value};
    use marlowe_move::bytecode::{compile_observation, Op};

    let expr = Observation::ValueGE(
        Value::AddValue(
            Box::new(Value::AvailableMoney(Token::default(), Party::Role("Alice".to_string()))),
            Box::new(Value::Constant(3)),
        ),
        Value::UseValue("x".to_string()),
    );
    let bytes = compile_observation(&expr);
    let mut expected = Vec::new();
    expected.push(Op::GetAcc as u8);
    expected.push(12);
    expected.extend_from_slice(b"Role(Alice)");
    expected.push(3);
    expected.extend_from_slice(b"SUI");
    expected.push(Op::Const as u8);
    expected.extend_from_slice(&3u64.to_be_bytes());
    expected.push(Op::Add as u8);
    expected.push(Op::UseVal as u8);
    expected.push(1);
    expected.extend_from_slice(b"x");
    expected.push(Op::Ge as u8);
    assert_eq!(bytes, expected);
}

#[test]
fn scenario_6_saturating_subtraction_on_chain() {
    use marlowe_move::ast::Value;
    use marlowe_move::bytecode::compile_value;
    use marlowe_move::bytecode::interp::{eval, Env};

    let expr = Value::SubValue(Box::new(Value::Constant(5)), Box::new(Value::Constant(10)));
    assert_eq!(eval(&compile_value(&expr), &Env::default()), 0);
}
