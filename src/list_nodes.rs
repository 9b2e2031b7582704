//! Prints a human-readable listing of every AST node kind the parser accepts,
//! grounded in the shape table of §4.1. Same spirit as the teacher's node
//! listing (a quick reference for whoever — human or LLM — is authoring specs),
//! retargeted at the six `Contract` variants, the three `Action` kinds, and the
//! `Value`/`Observation` expression grammars instead of a DeFi workflow's node
//! types.

/// Print the node-type listing to stdout.
pub fn run() -> anyhow::Result<()> {
    println!("{}", listing());
    Ok(())
}

pub fn listing() -> &'static str {
    r#"Contract nodes
==============

1. close
   Terminal. Shape: the bare string "close".

2. pay
   Transfer from an internal account to a payee (a party, externally, or —
   rejected at compile time in this revision — another account internally).
   Shape: {from_account, to, token, pay, then}
     - from_account: Party
     - to:           Payee  ({"party": Party} or {"account": Party})
     - token:        Token
     - pay:          Value  (amount to transfer)
     - then:         Contract

3. if
   Branch on an observation.
   Shape: {if, then, else}
     - if:   Observation
     - then: Contract
     - else: Contract

4. when
   Wait for one of several cases, or a timeout.
   Shape: {when, timeout, timeout_continuation}
     - when:                 Case[]  ({case: Action, then: Contract})
     - timeout:               integer (ms; 0 disables the deadline)
     - timeout_continuation: Contract

5. let
   Bind a name to a value, available by name in the continuation.
   Shape: {let, be, then}
     - let:  String (binding name)
     - be:   Value
     - then: Contract

6. assert
   Require an observation to hold; abort the routine otherwise.
   Shape: {assert, then}
     - assert: Observation
     - then:   Contract

Action kinds (inside a `when` case)
====================================

1. deposit
   Shape: {party, into_account, of_token, deposits}
     - party:        Party  (who must deposit)
     - into_account: Party  (logical account credited)
     - of_token:     Token
     - deposits:     Value  (expected amount)

2. choice
   Shape: {for_choice, choose_between}
     - for_choice:     ChoiceId
     - choose_between: Bound[]  ({from: int, to: int}, inclusive, union of ranges)

3. notify
   Shape: {notify_if}
     - notify_if: Observation

Value expressions
==================
  integer literal       — a JSON number
  "time_interval_start" / "time_interval_end" — nullary, read block time
  {negate: Value}
  {add: Value, and: Value}
  {value: Value, minus: Value}
  {multiply: Value, times: Value}
  {divide: Value, by: Value}
  {amount_of_token: Token, in_account: Party}   — available_money
  {value_of_choice: ChoiceId}
  {use_value: String}
  {if: Observation, then: Value, else: Value}   — cond; reuses the Contract `if` shape

Observation expressions
=========================
  true / false           — JSON booleans
  {both: Observation, and: Observation}
  {either: Observation, or: Observation}
  {not: Observation}
  {chose_something_for: ChoiceId}
  {value: Value, ge_than: Value}
  {value: Value, gt: Value}
  {value: Value, lt: Value}
  {value: Value, le_than: Value}
  {value: Value, equal_to: Value}

Supporting shapes
===================
  Party:    {"address": String} | {"role": String}
  Token:    {currency_symbol: String, token_name: String}  (both "" => chain-native)
  ChoiceId: {choice_name: String, choice_owner: Party}
  Bound:    {from: integer, to: integer}
"#
}
