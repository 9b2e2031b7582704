//! Emits a JSON Schema document describing the surface syntax §4.1 accepts.
//!
//! The parser in [`crate::parser`] dispatches on which keys a JSON object
//! carries rather than on a `serde`-derived tag, so there's no single Rust type
//! whose derived schema matches the accepted shapes (the asymmetric value keys
//! in particular — `{add, and}`, `{value, minus}` — have no natural `#[derive]`
//! representation). This schema is hand-authored from the same table the parser
//! is written against, for LLM- or editor-side authoring assistance; the parser
//! itself remains the sole source of truth for what's actually accepted.

use serde_json::{json, Value as Json};

/// Build the JSON Schema document for the contract surface syntax.
pub fn contract_schema() -> Json {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Contract",
        "description": "A timed, multi-party, finite choreography of deposits, payouts, observations, and conditional control flow.",
        "$ref": "#/$defs/Contract",
        "$defs": {
            "Contract": {
                "oneOf": [
                    { "const": "close" },
                    {
                        "type": "object",
                        "required": ["from_account", "to", "token", "pay", "then"],
                        "properties": {
                            "from_account": { "$ref": "#/$defs/Party" },
                            "to": { "$ref": "#/$defs/Payee" },
                            "token": { "$ref": "#/$defs/Token" },
                            "pay": { "$ref": "#/$defs/Value" },
                            "then": { "$ref": "#/$defs/Contract" }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["if", "then", "else"],
                        "properties": {
                            "if": { "$ref": "#/$defs/Observation" },
                            "then": { "$ref": "#/$defs/Contract" },
                            "else": { "$ref": "#/$defs/Contract" }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["when", "timeout", "timeout_continuation"],
                        "properties": {
                            "when": { "type": "array", "items": { "$ref": "#/$defs/Case" } },
                            "timeout": { "type": "integer", "description": "milliseconds since epoch; 0 disables the deadline" },
                            "timeout_continuation": { "$ref": "#/$defs/Contract" }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["let", "be", "then"],
                        "properties": {
                            "let": { "type": "string" },
                            "be": { "$ref": "#/$defs/Value" },
                            "then": { "$ref": "#/$defs/Contract" }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["assert", "then"],
                        "properties": {
                            "assert": { "$ref": "#/$defs/Observation" },
                            "then": { "$ref": "#/$defs/Contract" }
                        }
                    }
                ]
            },
            "Case": {
                "type": "object",
                "required": ["case", "then"],
                "properties": {
                    "case": { "$ref": "#/$defs/Action" },
                    "then": { "$ref": "#/$defs/Contract" }
                }
            },
            "Action": {
                "oneOf": [
                    {
                        "type": "object",
                        "required": ["party", "into_account", "of_token", "deposits"],
                        "properties": {
                            "party": { "$ref": "#/$defs/Party" },
                            "into_account": { "$ref": "#/$defs/Party" },
                            "of_token": { "$ref": "#/$defs/Token" },
                            "deposits": { "$ref": "#/$defs/Value" }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["for_choice", "choose_between"],
                        "properties": {
                            "for_choice": { "$ref": "#/$defs/ChoiceId" },
                            "choose_between": { "type": "array", "items": { "$ref": "#/$defs/Bound" } }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["notify_if"],
                        "properties": { "notify_if": { "$ref": "#/$defs/Observation" } }
                    }
                ]
            },
            "Party": {
                "oneOf": [
                    { "type": "object", "required": ["address"], "properties": { "address": { "type": "string" } } },
                    { "type": "object", "required": ["role"], "properties": { "role": { "type": "string" } } }
                ]
            },
            "Payee": {
                "oneOf": [
                    { "type": "object", "required": ["party"], "properties": { "party": { "$ref": "#/$defs/Party" } } },
                    {
                        "type": "object",
                        "required": ["account"],
                        "properties": { "account": { "$ref": "#/$defs/Party" } },
                        "description": "internal account-to-account transfer: rejected at compile time, not yet supported on-chain"
                    }
                ]
            },
            "Token": {
                "type": "object",
                "properties": {
                    "currency_symbol": { "type": "string", "default": "" },
                    "token_name": { "type": "string", "default": "" }
                },
                "description": "empty currency_symbol and token_name together denote the chain-native token"
            },
            "ChoiceId": {
                "type": "object",
                "required": ["choice_name", "choice_owner"],
                "properties": {
                    "choice_name": { "type": "string" },
                    "choice_owner": { "$ref": "#/$defs/Party" }
                }
            },
            "Bound": {
                "type": "object",
                "required": ["from", "to"],
                "properties": {
                    "from": { "type": "integer" },
                    "to": { "type": "integer" }
                }
            },
            "Value": {
                "oneOf": [
                    { "type": "integer" },
                    { "const": "time_interval_start" },
                    { "const": "time_interval_end" },
                    { "type": "object", "required": ["negate"], "properties": { "negate": { "$ref": "#/$defs/Value" } } },
                    {
                        "type": "object",
                        "required": ["add", "and"],
                        "properties": { "add": { "$ref": "#/$defs/Value" }, "and": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["value", "minus"],
                        "properties": { "value": { "$ref": "#/$defs/Value" }, "minus": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["multiply", "times"],
                        "properties": { "multiply": { "$ref": "#/$defs/Value" }, "times": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["divide", "by"],
                        "properties": { "divide": { "$ref": "#/$defs/Value" }, "by": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["amount_of_token", "in_account"],
                        "properties": {
                            "amount_of_token": { "$ref": "#/$defs/Token" },
                            "in_account": { "$ref": "#/$defs/Party" }
                        }
                    },
                    {
                        "type": "object",
                        "required": ["value_of_choice"],
                        "properties": { "value_of_choice": { "$ref": "#/$defs/ChoiceId" } }
                    },
                    {
                        "type": "object",
                        "required": ["use_value"],
                        "properties": { "use_value": { "type": "string" } }
                    },
                    {
                        "type": "object",
                        "required": ["if", "then", "else"],
                        "properties": {
                            "if": { "$ref": "#/$defs/Observation" },
                            "then": { "$ref": "#/$defs/Value" },
                            "else": { "$ref": "#/$defs/Value" }
                        },
                        "description": "reuses the {if, then, else} shape; the Contract parser and the Value parser each dispatch on it independently"
                    }
                ]
            },
            "Observation": {
                "oneOf": [
                    { "type": "boolean" },
                    {
                        "type": "object",
                        "required": ["both", "and"],
                        "properties": { "both": { "$ref": "#/$defs/Observation" }, "and": { "$ref": "#/$defs/Observation" } }
                    },
                    {
                        "type": "object",
                        "required": ["either", "or"],
                        "properties": { "either": { "$ref": "#/$defs/Observation" }, "or": { "$ref": "#/$defs/Observation" } }
                    },
                    {
                        "type": "object",
                        "required": ["not"],
                        "properties": { "not": { "$ref": "#/$defs/Observation" } }
                    },
                    {
                        "type": "object",
                        "required": ["chose_something_for"],
                        "properties": { "chose_something_for": { "$ref": "#/$defs/ChoiceId" } }
                    },
                    {
                        "type": "object",
                        "required": ["value", "ge_than"],
                        "properties": { "value": { "$ref": "#/$defs/Value" }, "ge_than": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["value", "gt"],
                        "properties": { "value": { "$ref": "#/$defs/Value" }, "gt": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["value", "lt"],
                        "properties": { "value": { "$ref": "#/$defs/Value" }, "lt": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["value", "le_than"],
                        "properties": { "value": { "$ref": "#/$defs/Value" }, "le_than": { "$ref": "#/$defs/Value" } }
                    },
                    {
                        "type": "object",
                        "required": ["value", "equal_to"],
                        "properties": { "value": { "$ref": "#/$defs/Value" }, "equal_to": { "$ref": "#/$defs/Value" } }
                    }
                ]
            }
        }
    })
}

/// Render the contract schema as pretty-printed JSON.
pub fn contract_schema_json() -> String {
    serde_json::to_string_pretty(&contract_schema()).expect("schema is always representable as JSON")
}

/// The JSON Schema for the injected [`crate::token_map::TokenMap`] document,
/// derived straight off the config type via `schemars` the way the rest of the
/// pack derives schemas for `serde`-shaped configuration.
pub fn token_map_schema_json() -> String {
    let schema = schemars::schema_for!(crate::token_map::TokenMap);
    serde_json::to_string_pretty(&schema).expect("schema is always representable as JSON")
}
