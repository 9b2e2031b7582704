//! Prints an example contract as JSON (§4.1 surface syntax) to stdout — a
//! buyer/seller escrow, built directly out of [`crate::ast`] constructors and
//! rendered with [`crate::parser::contract_to_json`] so it's guaranteed to be
//! exactly what [`crate::parser::parse_contract`] accepts.

use crate::ast::{Action, Bound, Case, ChoiceId, Contract, Observation, Party, Payee, Token, Value};
use crate::parser::contract_to_json;

/// A buyer deposits 1000 of the native token; a seller then chooses to
/// `release` (1) the funds to itself or `refund` (0) the buyer, within one
/// hour of the deposit; if neither choice is made in time, the timeout path
/// refunds the buyer automatically.
pub fn example_contract() -> Contract {
    let buyer = Party::Role("Buyer".to_string());
    let seller = Party::Role("Seller".to_string());
    let native = Token::default();

    let decision = ChoiceId { name: "release_or_refund".to_string(), owner: seller.clone() };

    let payout = Contract::If {
        obs: Observation::ValueEQ(Value::ChoiceValue(decision.clone()), Value::Constant(1)),
        then: Box::new(Contract::Pay {
            from_account: buyer.clone(),
            to: Payee::Party(seller.clone()),
            token: native.clone(),
            value: Value::AvailableMoney(native.clone(), buyer.clone()),
            then: Box::new(Contract::Close),
        }),
        else_: Box::new(Contract::Pay {
            from_account: buyer.clone(),
            to: Payee::Party(buyer.clone()),
            token: native.clone(),
            value: Value::AvailableMoney(native.clone(), buyer.clone()),
            then: Box::new(Contract::Close),
        }),
    };

    let decision_stage = Contract::When {
        cases: vec![Case {
            action: Action::Choice { choice_id: decision, bounds: vec![Bound { from: 0, to: 1 }] },
            then: payout,
        }],
        timeout: 3_600_000,
        timeout_continuation: Box::new(Contract::Pay {
            from_account: buyer.clone(),
            to: Payee::Party(buyer.clone()),
            token: native.clone(),
            value: Value::AvailableMoney(native.clone(), buyer.clone()),
            then: Box::new(Contract::Close),
        }),
    };

    Contract::When {
        cases: vec![Case {
            action: Action::Deposit {
                party: buyer.clone(),
                into_account: buyer,
                token: native,
                value: Value::Constant(1_000),
            },
            then: decision_stage,
        }],
        timeout: 0,
        timeout_continuation: Box::new(Contract::Close),
    }
}

/// Print the example contract's JSON surface syntax to stdout.
pub fn run() -> anyhow::Result<()> {
    let json = contract_to_json(&example_contract());
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
