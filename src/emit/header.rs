//! Renders the module preamble: imports, error/opcode constants, the shared
//! `Contract` object, optional role-capability machinery, state-access helpers,
//! and the embedded stack VM (`internal_eval`).
//!
//! Grounded in `original_source/generator/move_generator.py`'s
//! `generate_module_header`, with two corrections folded in directly rather than
//! left as `// TODO`s: `OP_NEG` pops exactly one operand (the reference's
//! comparison fallback branch popped two for a unary op), and a new `OP_HAS_CHOICE`
//! opcode backs `chose_something` instead of always pushing false.

use crate::ast::{Party, Payee};
use crate::stage::{StageModel, StageRecord};

/// Whether any party anywhere in the contract is borne as a transferable role,
/// rather than a plain chain address. Gates emission of `RoleNFT`/`AdminCap`.
pub fn has_roles(model: &StageModel) -> bool {
    let is_role = |p: &Party| matches!(p, Party::Role(_));

    let pay_has_roles = model.records.values().any(|r| match r {
        StageRecord::Pay { from_account, to, .. } => {
            is_role(from_account)
                || match to {
                    Payee::Party(p) | Payee::Account(p) => is_role(p),
                }
        }
        _ => false,
    });
    let deposit_has_roles = model.deposit_cases.iter().any(|d| is_role(&d.party) || is_role(&d.into_account));
    let choice_has_roles = model.choice_cases.iter().any(|c| is_role(&c.choice_id.owner));

    pay_has_roles || deposit_has_roles || choice_has_roles
}

const ERROR_CONSTS: &str = "\
    const E_WRONG_STAGE: u64 = 1;
    const E_WRONG_AMOUNT: u64 = 2;
    const E_WRONG_CALLER: u64 = 3;
    const E_INVALID_ROLE_NFT: u64 = 4;
    const E_WRONG_ROLE: u64 = 5;
    const E_INSUFFICIENT_FUNDS: u64 = 6;
    const E_INVALID_CHOICE: u64 = 7;
    const E_ASSERT_FAILED: u64 = 8;
    const E_ROLE_NOT_FOUND: u64 = 9;
    const E_TIMEOUT_NOT_YET: u64 = 10;
    const E_STACK_UNDERFLOW: u64 = 11;
    const E_TIMEOUT_PASSED: u64 = 12;";

const OPCODE_CONSTS: &str = "\
    const OP_ZERO: u8 = 0;
    const OP_TRUE: u8 = 1;
    const OP_CONST: u8 = 2;
    const OP_ADD: u8 = 3;
    const OP_SUB: u8 = 4;
    const OP_MUL: u8 = 5;
    const OP_DIV: u8 = 6;
    const OP_NEG: u8 = 7;
    const OP_GET_ACC: u8 = 10;
    const OP_GET_CHOICE: u8 = 11;
    const OP_USE_VAL: u8 = 12;
    const OP_TIME_START: u8 = 20;
    const OP_TIME_END: u8 = 21;
    const OP_GT: u8 = 30;
    const OP_GE: u8 = 31;
    const OP_AND: u8 = 40;
    const OP_OR: u8 = 41;
    const OP_NOT: u8 = 42;
    const OP_CJUMP: u8 = 50;
    const OP_HAS_CHOICE: u8 = 51;";

fn role_struct(has_roles: bool) -> &'static str {
    if has_roles {
        "
    struct RoleNFT has key, store {
        id: UID,
        contract_id: ID,
        name: String,
    }

    struct AdminCap has key, store {
        id: UID,
    }
"
    } else {
        ""
    }
}

fn role_helpers(has_roles: bool) -> &'static str {
    if has_roles {
        "
    fun assert_role(contract: &Contract, role_nft: &RoleNFT, expected_name: String) {
        assert!(role_nft.contract_id == object::id(contract), E_INVALID_ROLE_NFT);
        assert!(role_nft.name == expected_name, E_WRONG_ROLE);
    }

    public fun mint_role(
        _: &AdminCap,
        contract: &Contract,
        name: String,
        recipient: address,
        ctx: &mut TxContext,
    ) {
        let role_nft = RoleNFT { id: object::new(ctx), contract_id: object::id(contract), name };
        transfer::public_transfer(role_nft, recipient);
    }

    #[test_only]
    public fun mint_role_for_testing(contract: &mut Contract, name: String, recipient: address, ctx: &mut TxContext) {
        let role_nft = RoleNFT { id: object::new(ctx), contract_id: object::id(contract), name };
        transfer::public_transfer(role_nft, recipient);
    }
"
    } else {
        ""
    }
}

/// Render the full module: preamble, VM, and `body` (the concatenated per-stage
/// routines from [`crate::emit::routines`]).
pub fn render_header(module_name: &str, has_roles_flag: bool, body: &str) -> String {
    let admin_mint = if has_roles_flag {
        "transfer::public_transfer(AdminCap { id: object::new(ctx) }, tx_context::sender(ctx));"
    } else {
        ""
    };

    format!(
        r#"module generated::{module_name} {{
    use sui::coin::{{Self, Coin}};
    use sui::table::{{Self, Table}};
    use sui::bag::{{Self, Bag}};
    use sui::balance::{{Self, Balance}};
    use sui::object::{{Self, ID, UID}};
    use sui::transfer;
    use sui::tx_context::{{Self, TxContext}};
    use std::string::{{Self, String}};
    use std::vector;
    use std::type_name;

{error_consts}

{opcode_consts}
{role_struct}
    struct Contract has key {{
        id: UID,
        stage: u64,
        accounts: Table<String, Table<String, u64>>,
        vaults: Bag,
        role_registry: Table<String, address>,
        choices: Table<String, u64>,
        bound_values: Table<String, u64>,
    }}

    fun init(ctx: &mut TxContext) {{
        let contract = Contract {{
            id: object::new(ctx),
            stage: 0,
            accounts: table::new(ctx),
            vaults: bag::new(ctx),
            role_registry: table::new(ctx),
            choices: table::new(ctx),
            bound_values: table::new(ctx),
        }};
        transfer::share_object(contract);
        {admin_mint}
    }}

    #[test_only]
    public fun init_for_testing(ctx: &mut TxContext) {{
        init(ctx)
    }}
{role_helpers}
    fun internal_get_balance(contract: &Contract, party: String, token: String): u64 {{
        if (table::contains(&contract.accounts, party)) {{
            let book = table::borrow(&contract.accounts, party);
            if (table::contains(book, token)) {{ *table::borrow(book, token) }} else {{ 0 }}
        }} else {{ 0 }}
    }}

    fun internal_get_choice(contract: &Contract, key: String): u64 {{
        if (table::contains(&contract.choices, key)) {{ *table::borrow(&contract.choices, key) }} else {{ 0 }}
    }}

    fun internal_has_choice(contract: &Contract, key: String): bool {{
        table::contains(&contract.choices, key)
    }}

    fun internal_get_bound_value(contract: &Contract, key: String): u64 {{
        if (table::contains(&contract.bound_values, key)) {{ *table::borrow(&contract.bound_values, key) }} else {{ 0 }}
    }}

    fun internal_deposit<T>(contract: &mut Contract, party: String, coin: Coin<T>, ctx: &mut TxContext) {{
        let token = string::from_ascii(type_name::into_string(type_name::get<T>()));
        let amount = coin::value(&coin);

        if (!bag::contains(&contract.vaults, token)) {{
            bag::add(&mut contract.vaults, token, coin::into_balance(coin));
        }} else {{
            let vault = bag::borrow_mut<String, Balance<T>>(&mut contract.vaults, token);
            balance::join(vault, coin::into_balance(coin));
        }};

        if (!table::contains(&contract.accounts, party)) {{
            table::add(&mut contract.accounts, party, table::new(ctx));
        }};
        let accs = table::borrow_mut(&mut contract.accounts, party);
        if (!table::contains(accs, token)) {{
            table::add(accs, token, amount);
        }} else {{
            let b = table::borrow_mut(accs, token);
            *b = *b + amount;
        }};
    }}

    /// Partial payment: pays `min(requested, available)`, never aborts on shortfall.
    fun internal_pay<T>(contract: &mut Contract, src: String, recipient: address, amt: u64, ctx: &mut TxContext) {{
        if (!table::contains(&contract.accounts, src)) {{ return }};
        let accs = table::borrow_mut(&mut contract.accounts, src);
        let token = string::from_ascii(type_name::into_string(type_name::get<T>()));
        if (!table::contains(accs, token)) {{ return }};

        let b = table::borrow_mut(accs, token);
        let available = *b;
        let pay_amt = if (available >= amt) {{ amt }} else {{ available }};

        if (pay_amt > 0) {{
            *b = available - pay_amt;
            let vault = bag::borrow_mut<String, Balance<T>>(&mut contract.vaults, token);
            assert!(balance::value(vault) >= pay_amt, E_INSUFFICIENT_FUNDS);
            transfer::public_transfer(coin::from_balance(balance::split(vault, pay_amt), ctx), recipient);
        }};
    }}

    /// Evaluates one bytecode stream against `contract`'s state.
    fun internal_eval(contract: &Contract, bytecode: vector<u8>, ctx: &TxContext): u64 {{
        let stack = vector::empty<u64>();
        let i: u64 = 0;
        let len = vector::length(&bytecode);

        while (i < len) {{
            let op = *vector::borrow(&bytecode, i);
            i = i + 1;

            if (op == OP_ZERO) {{
                vector::push_back(&mut stack, 0);
            }} else if (op == OP_TRUE) {{
                vector::push_back(&mut stack, 1);
            }} else if (op == OP_CONST) {{
                let val: u64 = 0;
                let k = 0;
                while (k < 8) {{ val = (val << 8) | (*vector::borrow(&bytecode, i + k) as u64); k = k + 1; }};
                i = i + 8;
                vector::push_back(&mut stack, val);
            }} else if (op == OP_ADD) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, lhs + rhs);
            }} else if (op == OP_SUB) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                if (rhs > lhs) {{ vector::push_back(&mut stack, 0); }} else {{ vector::push_back(&mut stack, lhs - rhs); }};
            }} else if (op == OP_MUL) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, lhs * rhs);
            }} else if (op == OP_DIV) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                if (rhs == 0) {{ vector::push_back(&mut stack, 0); }} else {{ vector::push_back(&mut stack, lhs / rhs); }};
            }} else if (op == OP_NEG) {{
                assert!(vector::length(&stack) >= 1, E_STACK_UNDERFLOW);
                vector::pop_back(&mut stack);
                vector::push_back(&mut stack, 0);
            }} else if (op == OP_GET_ACC) {{
                let p_len = (*vector::borrow(&bytecode, i) as u64);
                i = i + 1;
                let party_bytes = vector::empty<u8>();
                let k = 0;
                while (k < p_len) {{ vector::push_back(&mut party_bytes, *vector::borrow(&bytecode, i + k)); k = k + 1; }};
                i = i + p_len;

                let t_len = (*vector::borrow(&bytecode, i) as u64);
                i = i + 1;
                let token_bytes = vector::empty<u8>();
                k = 0;
                while (k < t_len) {{ vector::push_back(&mut token_bytes, *vector::borrow(&bytecode, i + k)); k = k + 1; }};
                i = i + t_len;

                vector::push_back(&mut stack, internal_get_balance(contract, string::utf8(party_bytes), string::utf8(token_bytes)));
            }} else if (op == OP_GET_CHOICE) {{
                let c_len = (*vector::borrow(&bytecode, i) as u64);
                i = i + 1;
                let key_bytes = vector::empty<u8>();
                let k = 0;
                while (k < c_len) {{ vector::push_back(&mut key_bytes, *vector::borrow(&bytecode, i + k)); k = k + 1; }};
                i = i + c_len;
                vector::push_back(&mut stack, internal_get_choice(contract, string::utf8(key_bytes)));
            }} else if (op == OP_USE_VAL) {{
                let v_len = (*vector::borrow(&bytecode, i) as u64);
                i = i + 1;
                let name_bytes = vector::empty<u8>();
                let k = 0;
                while (k < v_len) {{ vector::push_back(&mut name_bytes, *vector::borrow(&bytecode, i + k)); k = k + 1; }};
                i = i + v_len;
                vector::push_back(&mut stack, internal_get_bound_value(contract, string::utf8(name_bytes)));
            }} else if (op == OP_TIME_START) {{
                vector::push_back(&mut stack, tx_context::epoch_timestamp_ms(ctx));
            }} else if (op == OP_TIME_END) {{
                vector::push_back(&mut stack, tx_context::epoch_timestamp_ms(ctx));
            }} else if (op == OP_CJUMP) {{
                assert!(vector::length(&stack) >= 1, E_STACK_UNDERFLOW);
                let cond = vector::pop_back(&mut stack);
                let jmp_len: u64 = 0;
                jmp_len = (jmp_len << 8) | (*vector::borrow(&bytecode, i) as u64);
                jmp_len = (jmp_len << 8) | (*vector::borrow(&bytecode, i + 1) as u64);
                i = i + 2;
                if (cond == 0) {{ i = i + jmp_len; }};
            }} else if (op == OP_HAS_CHOICE) {{
                let k_len = (*vector::borrow(&bytecode, i) as u64);
                i = i + 1;
                let key_bytes = vector::empty<u8>();
                let k = 0;
                while (k < k_len) {{ vector::push_back(&mut key_bytes, *vector::borrow(&bytecode, i + k)); k = k + 1; }};
                i = i + k_len;
                vector::push_back(&mut stack, if (internal_has_choice(contract, string::utf8(key_bytes))) {{ 1 }} else {{ 0 }});
            }} else if (op == OP_GT) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, if (lhs > rhs) {{ 1 }} else {{ 0 }});
            }} else if (op == OP_GE) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, if (lhs >= rhs) {{ 1 }} else {{ 0 }});
            }} else if (op == OP_AND) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, if (lhs != 0 && rhs != 0) {{ 1 }} else {{ 0 }});
            }} else if (op == OP_OR) {{
                assert!(vector::length(&stack) >= 2, E_STACK_UNDERFLOW);
                let rhs = vector::pop_back(&mut stack);
                let lhs = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, if (lhs != 0 || rhs != 0) {{ 1 }} else {{ 0 }});
            }} else if (op == OP_NOT) {{
                assert!(vector::length(&stack) >= 1, E_STACK_UNDERFLOW);
                let v = vector::pop_back(&mut stack);
                vector::push_back(&mut stack, if (v == 0) {{ 1 }} else {{ 0 }});
            }};
        }};

        if (vector::length(&stack) == 0) {{ 0 }} else {{ vector::pop_back(&mut stack) }}
    }}
{body}
}}
"#,
        module_name = module_name,
        error_consts = ERROR_CONSTS,
        opcode_consts = OPCODE_CONSTS,
        role_struct = role_struct(has_roles_flag),
        admin_mint = admin_mint,
        role_helpers = role_helpers(has_roles_flag),
        body = body,
    )
}
