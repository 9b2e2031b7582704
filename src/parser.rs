//! Decode the JSON surface syntax into a [`Contract`] AST.
//!
//! Parsing is purely structural: shapes are dispatched on by which keys an object
//! carries, exactly as §4.1 of the design document specifies, including its
//! asymmetries (`{add, and}` vs `{value, minus}` vs `{multiply, times}` vs
//! `{divide, by}`). No semantic validation happens here — a contract that pays
//! more money than anyone will ever deposit parses just fine.

use serde_json::Value as Json;

use crate::ast::{Action, Bound, Case, ChoiceId, Contract, Observation, Party, Payee, Token, Value};

/// A surface-syntax decoding failure, reported against the fragment that didn't match
/// any recognised shape.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognised contract shape: {fragment}")]
    UnrecognisedContract { fragment: String },
    #[error("unrecognised value shape: {fragment}")]
    UnrecognisedValue { fragment: String },
    #[error("unrecognised observation shape: {fragment}")]
    UnrecognisedObservation { fragment: String },
    #[error("unrecognised action shape: {fragment}")]
    UnrecognisedAction { fragment: String },
    #[error("unrecognised party shape: {fragment}")]
    UnrecognisedParty { fragment: String },
    #[error("unrecognised payee shape: {fragment}")]
    UnrecognisedPayee { fragment: String },
    #[error("missing required key `{key}` in: {fragment}")]
    MissingKey { key: &'static str, fragment: String },
    #[error("expected an integer, got: {fragment}")]
    NotAnInteger { fragment: String },
}

/// Cap the amount of offending JSON we echo back in an error message so a
/// pathologically large document can't produce an unbounded error string.
const FRAGMENT_CAP: usize = 200;

fn fragment(v: &Json) -> String {
    let s = v.to_string();
    if s.len() > FRAGMENT_CAP {
        format!("{}…", &s[..FRAGMENT_CAP])
    } else {
        s
    }
}

fn obj(v: &Json) -> Option<&serde_json::Map<String, Json>> {
    v.as_object()
}

fn get<'a>(m: &'a serde_json::Map<String, Json>, key: &'static str, whole: &Json) -> Result<&'a Json, ParseError> {
    m.get(key).ok_or_else(|| ParseError::MissingKey {
        key,
        fragment: fragment(whole),
    })
}

fn as_i64(v: &Json) -> Result<i64, ParseError> {
    v.as_i64().ok_or_else(|| ParseError::NotAnInteger { fragment: fragment(v) })
}

fn as_str<'a>(v: &'a Json, key: &'static str, whole: &Json) -> Result<&'a str, ParseError> {
    v.as_str().ok_or_else(|| ParseError::MissingKey {
        key,
        fragment: fragment(whole),
    })
}

// ── Party / Payee / Token ───────────────────────────────────────────

/// `{"address": "..."}` or `{"role": "..."}`.
pub fn parse_party(v: &Json) -> Result<Party, ParseError> {
    if let Some(m) = obj(v) {
        if let Some(addr) = m.get("address") {
            return Ok(Party::Address(as_str(addr, "address", v)?.to_string()));
        }
        if let Some(role) = m.get("role") {
            return Ok(Party::Role(as_str(role, "role", v)?.to_string()));
        }
    }
    Err(ParseError::UnrecognisedParty { fragment: fragment(v) })
}

/// `{"party": Party}` (external send) or `{"account": Party}` (internal move).
pub fn parse_payee(v: &Json) -> Result<Payee, ParseError> {
    if let Some(m) = obj(v) {
        if let Some(p) = m.get("party") {
            return Ok(Payee::Party(parse_party(p)?));
        }
        if let Some(a) = m.get("account") {
            return Ok(Payee::Account(parse_party(a)?));
        }
    }
    Err(ParseError::UnrecognisedPayee { fragment: fragment(v) })
}

/// `{"currency_symbol": "...", "token_name": "..."}`. Both default to empty, which
/// together denote the chain-native token.
pub fn parse_token(v: &Json) -> Result<Token, ParseError> {
    let m = obj(v).ok_or_else(|| ParseError::MissingKey {
        key: "currency_symbol",
        fragment: fragment(v),
    })?;
    let currency_symbol = m
        .get("currency_symbol")
        .and_then(|s| s.as_str())
        .unwrap_or("")
        .to_string();
    let token_name = m.get("token_name").and_then(|s| s.as_str()).unwrap_or("").to_string();
    Ok(Token { currency_symbol, token_name })
}

/// `{"choice_name": "...", "choice_owner": Party}`.
pub fn parse_choice_id(v: &Json) -> Result<ChoiceId, ParseError> {
    let m = obj(v).ok_or_else(|| ParseError::MissingKey {
        key: "choice_name",
        fragment: fragment(v),
    })?;
    let name = as_str(get(m, "choice_name", v)?, "choice_name", v)?.to_string();
    let owner = parse_party(get(m, "choice_owner", v)?)?;
    Ok(ChoiceId { name, owner })
}

/// `{"from": int, "to": int}`, inclusive.
pub fn parse_bound(v: &Json) -> Result<Bound, ParseError> {
    let m = obj(v).ok_or_else(|| ParseError::MissingKey {
        key: "from",
        fragment: fragment(v),
    })?;
    let from = as_i64(get(m, "from", v)?)?;
    let to = as_i64(get(m, "to", v)?)?;
    Ok(Bound { from, to })
}

// ── Value ────────────────────────────────────────────────────────────

/// Decode a value expression. Key asymmetries are deliberate (§4.1) and must be
/// reproduced verbatim: `{add, and}`, `{value, minus}`, `{multiply, times}`,
/// `{divide, by}`.
pub fn parse_value(v: &Json) -> Result<Value, ParseError> {
    if let Some(n) = v.as_i64() {
        return Ok(Value::Constant(n));
    }
    if let Some(s) = v.as_str() {
        return match s {
            "time_interval_start" => Ok(Value::TimeIntervalStart),
            "time_interval_end" => Ok(Value::TimeIntervalEnd),
            _ => Err(ParseError::UnrecognisedValue { fragment: fragment(v) }),
        };
    }
    let m = obj(v).ok_or_else(|| ParseError::UnrecognisedValue { fragment: fragment(v) })?;

    if let Some(inner) = m.get("negate") {
        return Ok(Value::NegValue(Box::new(parse_value(inner)?)));
    }
    if m.contains_key("add") && m.contains_key("and") {
        let lhs = parse_value(get(m, "add", v)?)?;
        let rhs = parse_value(get(m, "and", v)?)?;
        return Ok(Value::AddValue(Box::new(lhs), Box::new(rhs)));
    }
    if m.contains_key("value") && m.contains_key("minus") {
        let lhs = parse_value(get(m, "value", v)?)?;
        let rhs = parse_value(get(m, "minus", v)?)?;
        return Ok(Value::SubValue(Box::new(lhs), Box::new(rhs)));
    }
    if m.contains_key("multiply") && m.contains_key("times") {
        let lhs = parse_value(get(m, "multiply", v)?)?;
        let rhs = parse_value(get(m, "times", v)?)?;
        return Ok(Value::MulValue(Box::new(lhs), Box::new(rhs)));
    }
    if m.contains_key("divide") && m.contains_key("by") {
        let lhs = parse_value(get(m, "divide", v)?)?;
        let rhs = parse_value(get(m, "by", v)?)?;
        return Ok(Value::DivValue(Box::new(lhs), Box::new(rhs)));
    }
    if let Some(am) = m.get("amount_of_token") {
        let token = parse_token(am)?;
        let party = parse_party(get(m, "in_account", v)?)?;
        return Ok(Value::AvailableMoney(token, party));
    }
    if let Some(cv) = m.get("value_of_choice") {
        return Ok(Value::ChoiceValue(parse_choice_id(cv)?));
    }
    if let Some(name) = m.get("use_value") {
        return Ok(Value::UseValue(as_str(name, "use_value", v)?.to_string()));
    }
    // Reused as both a value and a contract shape; here it decodes to Cond.
    if m.contains_key("if") && m.contains_key("then") && m.contains_key("else") {
        let obs = parse_observation(get(m, "if", v)?)?;
        let then_v = parse_value(get(m, "then", v)?)?;
        let else_v = parse_value(get(m, "else", v)?)?;
        return Ok(Value::Cond(Box::new(obs), Box::new(then_v), Box::new(else_v)));
    }

    Err(ParseError::UnrecognisedValue { fragment: fragment(v) })
}

// ── Observation ──────────────────────────────────────────────────────

pub fn parse_observation(v: &Json) -> Result<Observation, ParseError> {
    if let Some(b) = v.as_bool() {
        return Ok(if b { Observation::True } else { Observation::False });
    }
    let m = obj(v).ok_or_else(|| ParseError::UnrecognisedObservation { fragment: fragment(v) })?;

    if m.contains_key("both") && m.contains_key("and") {
        let lhs = parse_observation(get(m, "both", v)?)?;
        let rhs = parse_observation(get(m, "and", v)?)?;
        return Ok(Observation::And(Box::new(lhs), Box::new(rhs)));
    }
    if m.contains_key("either") && m.contains_key("or") {
        let lhs = parse_observation(get(m, "either", v)?)?;
        let rhs = parse_observation(get(m, "or", v)?)?;
        return Ok(Observation::Or(Box::new(lhs), Box::new(rhs)));
    }
    if let Some(inner) = m.get("not") {
        return Ok(Observation::Not(Box::new(parse_observation(inner)?)));
    }
    if let Some(cid) = m.get("chose_something_for") {
        return Ok(Observation::ChoseSomething(parse_choice_id(cid)?));
    }
    if let Some(lhs_j) = m.get("value") {
        let lhs = parse_value(lhs_j)?;
        if let Some(rhs_j) = m.get("ge_than") {
            return Ok(Observation::ValueGE(lhs, parse_value(rhs_j)?));
        }
        if let Some(rhs_j) = m.get("gt") {
            return Ok(Observation::ValueGT(lhs, parse_value(rhs_j)?));
        }
        if let Some(rhs_j) = m.get("lt") {
            return Ok(Observation::ValueLT(lhs, parse_value(rhs_j)?));
        }
        if let Some(rhs_j) = m.get("le_than") {
            return Ok(Observation::ValueLE(lhs, parse_value(rhs_j)?));
        }
        if let Some(rhs_j) = m.get("equal_to") {
            return Ok(Observation::ValueEQ(lhs, parse_value(rhs_j)?));
        }
    }

    Err(ParseError::UnrecognisedObservation { fragment: fragment(v) })
}

// ── Action / Case ────────────────────────────────────────────────────

fn parse_action(v: &Json) -> Result<Action, ParseError> {
    let m = obj(v).ok_or_else(|| ParseError::UnrecognisedAction { fragment: fragment(v) })?;

    if m.contains_key("deposits") {
        let party = parse_party(get(m, "party", v)?)?;
        let into_account = parse_party(get(m, "into_account", v)?)?;
        let token = parse_token(get(m, "of_token", v)?)?;
        let value = parse_value(get(m, "deposits", v)?)?;
        return Ok(Action::Deposit { party, into_account, token, value });
    }
    if m.contains_key("for_choice") && m.contains_key("choose_between") {
        let choice_id = parse_choice_id(get(m, "for_choice", v)?)?;
        let bounds_json = get(m, "choose_between", v)?
            .as_array()
            .ok_or_else(|| ParseError::MissingKey { key: "choose_between", fragment: fragment(v) })?;
        let bounds = bounds_json.iter().map(parse_bound).collect::<Result<Vec<_>, _>>()?;
        return Ok(Action::Choice { choice_id, bounds });
    }
    if let Some(obs_j) = m.get("notify_if") {
        return Ok(Action::Notify(parse_observation(obs_j)?));
    }

    Err(ParseError::UnrecognisedAction { fragment: fragment(v) })
}

fn parse_case(v: &Json) -> Result<Case, ParseError> {
    let m = obj(v).ok_or_else(|| ParseError::UnrecognisedAction { fragment: fragment(v) })?;
    let action = parse_action(get(m, "case", v)?)?;
    let then = parse_contract(get(m, "then", v)?)?;
    Ok(Case { action, then })
}

// ── Contract ─────────────────────────────────────────────────────────

/// Decode a [`Contract`] from a JSON document of the shape described in §4.1.
pub fn parse_contract(v: &Json) -> Result<Contract, ParseError> {
    if let Some(s) = v.as_str() {
        return if s == "close" {
            Ok(Contract::Close)
        } else {
            Err(ParseError::UnrecognisedContract { fragment: fragment(v) })
        };
    }

    let m = obj(v).ok_or_else(|| ParseError::UnrecognisedContract { fragment: fragment(v) })?;

    if m.contains_key("pay") {
        let from_account = parse_party(get(m, "from_account", v)?)?;
        let to = parse_payee(get(m, "to", v)?)?;
        let token = parse_token(get(m, "token", v)?)?;
        let value = parse_value(get(m, "pay", v)?)?;
        let then = Box::new(parse_contract(get(m, "then", v)?)?);
        return Ok(Contract::Pay { from_account, to, token, value, then });
    }
    if m.contains_key("when") {
        let cases_json = get(m, "when", v)?
            .as_array()
            .ok_or_else(|| ParseError::MissingKey { key: "when", fragment: fragment(v) })?;
        let cases = cases_json.iter().map(parse_case).collect::<Result<Vec<_>, _>>()?;
        let timeout = as_i64(get(m, "timeout", v)?)?;
        let timeout_continuation = Box::new(parse_contract(get(m, "timeout_continuation", v)?)?);
        return Ok(Contract::When { cases, timeout, timeout_continuation });
    }
    if m.contains_key("let") {
        let name = as_str(get(m, "let", v)?, "let", v)?.to_string();
        let value = parse_value(get(m, "be", v)?)?;
        let then = Box::new(parse_contract(get(m, "then", v)?)?);
        return Ok(Contract::Let { name, value, then });
    }
    if m.contains_key("assert") {
        let obs = parse_observation(get(m, "assert", v)?)?;
        let then = Box::new(parse_contract(get(m, "then", v)?)?);
        return Ok(Contract::Assert { obs, then });
    }
    // Must come after pay/when/let/assert: Value's Cond reuses this same shape,
    // and so would an `If` contract, but only one of the two parsers ever sees it.
    if m.contains_key("if") && m.contains_key("then") && m.contains_key("else") {
        let obs = parse_observation(get(m, "if", v)?)?;
        let then = Box::new(parse_contract(get(m, "then", v)?)?);
        let else_ = Box::new(parse_contract(get(m, "else", v)?)?);
        return Ok(Contract::If { obs, then, else_ });
    }

    Err(ParseError::UnrecognisedContract { fragment: fragment(v) })
}

// ── Round-trip serialisation (AST → JSON) ───────────────────────────
//
// Used by the property tests in §8 ("parser round-trip") and by nothing else —
// the compiler never needs to re-render a contract as JSON in production.

fn party_to_json(p: &Party) -> Json {
    match p {
        Party::Address(a) => serde_json::json!({ "address": a }),
        Party::Role(r) => serde_json::json!({ "role": r }),
    }
}

fn payee_to_json(p: &Payee) -> Json {
    match p {
        Payee::Party(p) => serde_json::json!({ "party": party_to_json(p) }),
        Payee::Account(p) => serde_json::json!({ "account": party_to_json(p) }),
    }
}

fn token_to_json(t: &Token) -> Json {
    serde_json::json!({ "currency_symbol": t.currency_symbol, "token_name": t.token_name })
}

fn choice_id_to_json(c: &ChoiceId) -> Json {
    serde_json::json!({ "choice_name": c.name, "choice_owner": party_to_json(&c.owner) })
}

fn bound_to_json(b: &Bound) -> Json {
    serde_json::json!({ "from": b.from, "to": b.to })
}

pub fn value_to_json(v: &Value) -> Json {
    match v {
        Value::Constant(n) => serde_json::json!(n),
        Value::NegValue(x) => serde_json::json!({ "negate": value_to_json(x) }),
        Value::AddValue(l, r) => serde_json::json!({ "add": value_to_json(l), "and": value_to_json(r) }),
        Value::SubValue(l, r) => serde_json::json!({ "value": value_to_json(l), "minus": value_to_json(r) }),
        Value::MulValue(l, r) => serde_json::json!({ "multiply": value_to_json(l), "times": value_to_json(r) }),
        Value::DivValue(l, r) => serde_json::json!({ "divide": value_to_json(l), "by": value_to_json(r) }),
        Value::AvailableMoney(tok, party) => {
            serde_json::json!({ "amount_of_token": token_to_json(tok), "in_account": party_to_json(party) })
        }
        Value::ChoiceValue(cid) => serde_json::json!({ "value_of_choice": choice_id_to_json(cid) }),
        Value::UseValue(name) => serde_json::json!({ "use_value": name }),
        Value::TimeIntervalStart => serde_json::json!("time_interval_start"),
        Value::TimeIntervalEnd => serde_json::json!("time_interval_end"),
        Value::Cond(obs, then_v, else_v) => {
            serde_json::json!({ "if": observation_to_json(obs), "then": value_to_json(then_v), "else": value_to_json(else_v) })
        }
    }
}

pub fn observation_to_json(o: &Observation) -> Json {
    match o {
        Observation::True => serde_json::json!(true),
        Observation::False => serde_json::json!(false),
        Observation::And(l, r) => serde_json::json!({ "both": observation_to_json(l), "and": observation_to_json(r) }),
        Observation::Or(l, r) => serde_json::json!({ "either": observation_to_json(l), "or": observation_to_json(r) }),
        Observation::Not(x) => serde_json::json!({ "not": observation_to_json(x) }),
        Observation::ChoseSomething(cid) => serde_json::json!({ "chose_something_for": choice_id_to_json(cid) }),
        Observation::ValueGE(l, r) => serde_json::json!({ "value": value_to_json(l), "ge_than": value_to_json(r) }),
        Observation::ValueGT(l, r) => serde_json::json!({ "value": value_to_json(l), "gt": value_to_json(r) }),
        Observation::ValueLT(l, r) => serde_json::json!({ "value": value_to_json(l), "lt": value_to_json(r) }),
        Observation::ValueLE(l, r) => serde_json::json!({ "value": value_to_json(l), "le_than": value_to_json(r) }),
        Observation::ValueEQ(l, r) => serde_json::json!({ "value": value_to_json(l), "equal_to": value_to_json(r) }),
    }
}

fn action_to_json(a: &Action) -> Json {
    match a {
        Action::Deposit { party, into_account, token, value } => serde_json::json!({
            "party": party_to_json(party),
            "into_account": party_to_json(into_account),
            "of_token": token_to_json(token),
            "deposits": value_to_json(value),
        }),
        Action::Choice { choice_id, bounds } => serde_json::json!({
            "for_choice": choice_id_to_json(choice_id),
            "choose_between": bounds.iter().map(bound_to_json).collect::<Vec<_>>(),
        }),
        Action::Notify(obs) => serde_json::json!({ "notify_if": observation_to_json(obs) }),
    }
}

fn case_to_json(c: &Case) -> Json {
    serde_json::json!({ "case": action_to_json(&c.action), "then": contract_to_json(&c.then) })
}

/// Render a [`Contract`] back to the JSON surface syntax. Round-trips with
/// [`parse_contract`] up to JSON key ordering.
pub fn contract_to_json(c: &Contract) -> Json {
    match c {
        Contract::Close => serde_json::json!("close"),
        Contract::Pay { from_account, to, token, value, then } => serde_json::json!({
            "from_account": party_to_json(from_account),
            "to": payee_to_json(to),
            "token": token_to_json(token),
            "pay": value_to_json(value),
            "then": contract_to_json(then),
        }),
        Contract::If { obs, then, else_ } => serde_json::json!({
            "if": observation_to_json(obs),
            "then": contract_to_json(then),
            "else": contract_to_json(else_),
        }),
        Contract::When { cases, timeout, timeout_continuation } => serde_json::json!({
            "when": cases.iter().map(case_to_json).collect::<Vec<_>>(),
            "timeout": timeout,
            "timeout_continuation": contract_to_json(timeout_continuation),
        }),
        Contract::Let { name, value, then } => serde_json::json!({
            "let": name,
            "be": value_to_json(value),
            "then": contract_to_json(then),
        }),
        Contract::Assert { obs, then } => serde_json::json!({
            "assert": observation_to_json(obs),
            "then": contract_to_json(then),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_parses_from_bare_string() {
        let j = serde_json::json!("close");
        assert_eq!(parse_contract(&j).unwrap(), Contract::Close);
    }

    #[test]
    fn unknown_string_is_rejected() {
        let j = serde_json::json!("not_a_keyword");
        assert!(parse_contract(&j).is_err());
    }

    #[test]
    fn pay_round_trips() {
        let j = serde_json::json!({
            "from_account": {"address": "0xA"},
            "to": {"party": {"address": "0xB"}},
            "token": {"currency_symbol": "", "token_name": ""},
            "pay": 100,
            "then": "close",
        });
        let c = parse_contract(&j).unwrap();
        assert_eq!(contract_to_json(&c), j);
    }

    #[test]
    fn value_asymmetric_keys_round_trip() {
        let add = serde_json::json!({"add": 1, "and": 2});
        let sub = serde_json::json!({"value": 1, "minus": 2});
        let mul = serde_json::json!({"multiply": 1, "times": 2});
        let div = serde_json::json!({"divide": 1, "by": 2});
        for j in [add, sub, mul, div] {
            let v = parse_value(&j).unwrap();
            assert_eq!(value_to_json(&v), j);
        }
    }

    #[test]
    fn when_with_deposit_and_timeout_round_trips() {
        let j = serde_json::json!({
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
        let c = parse_contract(&j).unwrap();
        assert_eq!(contract_to_json(&c), j);
    }

    #[test]
    fn comparisons_lower_correctly() {
        let ge = serde_json::json!({"value": 1, "ge_than": 2});
        let c = parse_observation(&ge).unwrap();
        assert_eq!(c, Observation::ValueGE(Value::Constant(1), Value::Constant(2)));
    }

    #[test]
    fn every_value_constructor_is_reachable() {
        let cases = [
            serde_json::json!(5),
            serde_json::json!({"negate": 5}),
            serde_json::json!({"add": 1, "and": 2}),
            serde_json::json!({"value": 1, "minus": 2}),
            serde_json::json!({"multiply": 1, "times": 2}),
            serde_json::json!({"divide": 1, "by": 2}),
            serde_json::json!({"amount_of_token": {"currency_symbol": "", "token_name": ""}, "in_account": {"role": "Alice"}}),
            serde_json::json!({"value_of_choice": {"choice_name": "c", "choice_owner": {"role": "Alice"}}}),
            serde_json::json!({"use_value": "x"}),
            serde_json::json!("time_interval_start"),
            serde_json::json!("time_interval_end"),
            serde_json::json!({"if": true, "then": 1, "else": 2}),
        ];
        for j in cases {
            assert!(parse_value(&j).is_ok(), "failed to parse {j}");
        }
    }
}
