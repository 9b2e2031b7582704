//! Renders the happy-path TCL test module (§6, output artifact 2).
//!
//! Grounded in `original_source/generator/move_generator.py`'s
//! `generate_test_module`: initialise the contract, mint any role the stage-0
//! action needs, invoke that action with in-bounds inputs, and advance one
//! transaction boundary.

use std::fmt::Write as _;

use crate::ast::Party;
use crate::stage::StageModel;

/// The stage-0 action to exercise, if any — a deposit, a choice, or a notify.
enum FirstAction<'a> {
    None,
    Deposit { fn_name: String, party: &'a Party, target_type: &'a str },
    Choice { fn_name: String, owner: &'a Party, lower_bound: i64 },
    Notify { fn_name: String },
}

fn find_first_action(model: &StageModel) -> FirstAction<'_> {
    if let Some(d) = model.deposit_cases.iter().find(|d| d.stage == 0) {
        return FirstAction::Deposit {
            fn_name: format!("deposit_stage_0_case_{}", d.case_index),
            party: &d.party,
            target_type: &d.target_type,
        };
    }
    if let Some(c) = model.choice_cases.iter().find(|c| c.stage == 0) {
        let lower_bound = c.bounds.first().map(|b| b.from).unwrap_or(1);
        return FirstAction::Choice {
            fn_name: format!("choice_stage_0_case_{}", c.case_index),
            owner: &c.choice_id.owner,
            lower_bound,
        };
    }
    if model.notify_cases.iter().any(|n| n.stage == 0) {
        return FirstAction::Notify { fn_name: "notify_stage_0_case_0".to_string() };
    }
    FirstAction::None
}

pub fn render_test_module(model: &StageModel, module_name: &str) -> String {
    let mut setup = String::new();
    let mut interaction = String::new();
    let mut needs_role_nft = false;

    match find_first_action(model) {
        FirstAction::None => {}
        FirstAction::Deposit { fn_name, party, target_type } => {
            if let Party::Role(name) = party {
                needs_role_nft = true;
                let _ = writeln!(
                    setup,
                    "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            {module_name}::mint_role_for_testing(&mut contract, std::string::utf8(b\"{name}\"), user, test_scenario::ctx(scenario));\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
                );
                let _ = writeln!(
                    interaction,
                    "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            let role_nft = test_scenario::take_from_sender<RoleNFT>(scenario);\n            let deposit_coin = coin::mint_for_testing<{target_type}>(1, test_scenario::ctx(scenario));\n            {module_name}::{fn_name}(&mut contract, &role_nft, deposit_coin, test_scenario::ctx(scenario));\n            test_scenario::return_to_sender(scenario, role_nft);\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
                );
            } else {
                let _ = writeln!(
                    interaction,
                    "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            let deposit_coin = coin::mint_for_testing<{target_type}>(1, test_scenario::ctx(scenario));\n            {module_name}::{fn_name}(&mut contract, deposit_coin, test_scenario::ctx(scenario));\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
                );
            }
        }
        FirstAction::Choice { fn_name, owner, lower_bound } => {
            if let Party::Role(name) = owner {
                needs_role_nft = true;
                let _ = writeln!(
                    setup,
                    "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            {module_name}::mint_role_for_testing(&mut contract, std::string::utf8(b\"{name}\"), user, test_scenario::ctx(scenario));\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
                );
                let _ = writeln!(
                    interaction,
                    "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            let role_nft = test_scenario::take_from_sender<RoleNFT>(scenario);\n            {module_name}::{fn_name}(&mut contract, &role_nft, {lower_bound}, test_scenario::ctx(scenario));\n            test_scenario::return_to_sender(scenario, role_nft);\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
                );
            } else {
                let _ = writeln!(
                    interaction,
                    "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            {module_name}::{fn_name}(&mut contract, {lower_bound}, test_scenario::ctx(scenario));\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
                );
            }
        }
        FirstAction::Notify { fn_name } => {
            let _ = writeln!(
                interaction,
                "        {{\n            let contract = test_scenario::take_shared<Contract>(scenario);\n            {module_name}::{fn_name}(&mut contract, test_scenario::ctx(scenario));\n            test_scenario::return_shared(contract);\n        }};\n        test_scenario::next_tx(scenario, user);"
            );
        }
    }

    let contract_use = if needs_role_nft {
        format!("use generated::{module_name}::{{Self, Contract, RoleNFT}};")
    } else {
        format!("use generated::{module_name}::{{Self, Contract}};")
    };

    format!(
        r#"#[test_only]
module test::{module_name}_tests {{
    use sui::test_scenario;
    use sui::coin;
    {contract_use}

    #[test]
    fun test_happy_path() {{
        let admin = @0xA;
        let user = @0xB;

        let scenario_val = test_scenario::begin(admin);
        let scenario = &mut scenario_val;

        {{
            {module_name}::init_for_testing(test_scenario::ctx(scenario));
        }};
        test_scenario::next_tx(scenario, admin);

        {{
            let contract = test_scenario::take_shared<Contract>(scenario);
            test_scenario::return_shared(contract);
        }};
        test_scenario::next_tx(scenario, admin);

{setup}

{interaction}

        test_scenario::end(scenario_val);
    }}
}}
"#
    )
}
