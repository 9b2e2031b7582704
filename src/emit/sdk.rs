//! Renders the client-SDK stub (§6, output artifact 3): one callable per
//! externally-triggerable stage, plus a `getTimeouts()` map from `When`-stage id
//! to timeout in milliseconds.
//!
//! Grounded in `original_source/generator/ts_generator.py`'s `generate_ts_sdk`,
//! trimmed to what this revision's Non-goals leave in scope: no deployment-file
//! loading, no withdraw-by-role helper (the original's ad hoc addition with no
//! counterpart in this revision's emitted module).

use std::fmt::Write as _;

use crate::ast::Party;
use crate::stage::{StageModel, StageRecord};

pub fn render_sdk(model: &StageModel, module_name: &str) -> String {
    let mut methods = String::new();

    for d in &model.deposit_cases {
        let fn_name = format!("deposit_stage_{}_case_{}", d.stage, d.case_index);
        match &d.party {
            Party::Role(name) => {
                let _ = writeln!(
                    methods,
                    "\n    /** Stage {}: deposit by role '{name}' */\n    {fn_name}(tx: Transaction, roleNftId: string, depositCoinId: string) {{\n        this.moveCall(tx, '{fn_name}', [tx.object(this.contractId), tx.object(roleNftId), tx.object(depositCoinId)], ['{}']);\n    }}",
                    d.stage, d.target_type
                );
            }
            Party::Address(addr) => {
                let _ = writeln!(
                    methods,
                    "\n    /** Stage {}: deposit by address {addr} */\n    {fn_name}(tx: Transaction, depositCoinId: string) {{\n        this.moveCall(tx, '{fn_name}', [tx.object(this.contractId), tx.object(depositCoinId)], ['{}']);\n    }}",
                    d.stage, d.target_type
                );
            }
        }
    }

    for c in &model.choice_cases {
        let fn_name = format!("choice_stage_{}_case_{}", c.stage, c.case_index);
        match &c.choice_id.owner {
            Party::Role(name) => {
                let _ = writeln!(
                    methods,
                    "\n    /** Stage {}: choice '{}' by role '{name}' */\n    {fn_name}(tx: Transaction, roleNftId: string, chosenNum: bigint) {{\n        this.moveCall(tx, '{fn_name}', [tx.object(this.contractId), tx.object(roleNftId), tx.pure(bcs.u64().serialize(chosenNum))]);\n    }}",
                    c.stage, c.choice_id.name
                );
            }
            Party::Address(addr) => {
                let _ = writeln!(
                    methods,
                    "\n    /** Stage {}: choice '{}' by address {addr} */\n    {fn_name}(tx: Transaction, chosenNum: bigint) {{\n        this.moveCall(tx, '{fn_name}', [tx.object(this.contractId), tx.pure(bcs.u64().serialize(chosenNum))]);\n    }}",
                    c.stage, c.choice_id.name
                );
            }
        }
    }

    for n in &model.notify_cases {
        let fn_name = format!("notify_stage_{}_case_{}", n.stage, n.case_index);
        let _ = writeln!(
            methods,
            "\n    /** Stage {}: notify */\n    {fn_name}(tx: Transaction) {{\n        this.moveCall(tx, '{fn_name}', [tx.object(this.contractId)]);\n    }}",
            n.stage
        );
    }

    let mut timeouts = String::new();
    for record in model.records.values() {
        if let StageRecord::When { stage, timeout, .. } = record {
            if *timeout > 0 {
                let _ = writeln!(timeouts, "            [{stage}, {timeout}],");
            }
            let fn_name = format!("timeout_stage_{stage}");
            let _ = writeln!(
                methods,
                "\n    /** Stage {stage}: timeout escape hatch */\n    {fn_name}(tx: Transaction) {{\n        this.moveCall(tx, '{fn_name}', [tx.object(this.contractId)]);\n    }}"
            );
        }
    }

    format!(
        r#"import {{ Transaction }} from '@mysten/sui/transactions';
import {{ bcs }} from '@mysten/sui/bcs';

export class {module_name}Contract {{
    packageId: string;
    contractId: string;
    moduleId: string = "{module_name}";

    constructor(packageId: string, contractId: string) {{
        this.packageId = packageId;
        this.contractId = contractId;
    }}

    private moveCall(tx: Transaction, func: string, args: any[], typeArgs: string[] = []) {{
        tx.moveCall({{
            target: `${{this.packageId}}::${{this.moduleId}}::${{func}}`,
            arguments: args,
            typeArguments: typeArgs,
        }});
    }}

    getTimeouts(): Map<number, number> {{
        return new Map([
{timeouts}
        ]);
    }}
{methods}
}}
"#
    )
}
