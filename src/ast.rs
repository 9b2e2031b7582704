//! Algebraic type for contracts, values, observations, parties, and tokens.
//!
//! The AST is produced once by [`crate::parser::parse_contract`] and is read-only
//! thereafter — nothing in this crate mutates a `Contract` in place.

/// A chain-native or role-borne participant in a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Party {
    /// An opaque chain address.
    Address(String),
    /// A string tag borne by a transferable role capability.
    Role(String),
}

impl Party {
    /// The stable string representation used as a bytecode operand and as a
    /// chain-state table key. Must stay byte-identical between the two uses.
    pub fn repr(&self) -> String {
        match self {
            Party::Address(addr) => format!("Address({addr})"),
            Party::Role(role) => format!("Role({role})"),
        }
    }
}

/// The destination of a [`Contract::Pay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payee {
    /// Send to a party outside the contract.
    Party(Party),
    /// Move between internal accounts (see `Non-goals`: unsupported by the emitter).
    Account(Party),
}

impl Payee {
    pub fn repr(&self) -> String {
        match self {
            Payee::Party(p) => format!("Party({})", p.repr()),
            Payee::Account(p) => format!("Account({})", p.repr()),
        }
    }
}

/// A source-language token identifier: a currency symbol plus a token name.
/// An empty pair denotes the chain-native token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub currency_symbol: String,
    pub token_name: String,
}

/// `(name, owner)` — identifies one party's choice within a `when`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChoiceId {
    pub name: String,
    pub owner: Party,
}

impl ChoiceId {
    /// The key used both as a bytecode operand and as a chain-state table key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.name, self.owner.repr())
    }
}

/// An inclusive integer interval a `Choice` action's submitted number must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub from: i64,
    pub to: i64,
}

impl Bound {
    pub fn contains(&self, n: i64) -> bool {
        n >= self.from && n <= self.to
    }
}

/// Side-effect-free (except for time reads) arithmetic over contract state.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Constant(i64),
    NegValue(Box<Value>),
    AddValue(Box<Value>, Box<Value>),
    SubValue(Box<Value>, Box<Value>),
    MulValue(Box<Value>, Box<Value>),
    DivValue(Box<Value>, Box<Value>),
    AvailableMoney(Token, Party),
    ChoiceValue(ChoiceId),
    UseValue(String),
    TimeIntervalStart,
    TimeIntervalEnd,
    Cond(Box<Observation>, Box<Value>, Box<Value>),
}

/// A boolean-valued predicate over contract state.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    True,
    False,
    And(Box<Observation>, Box<Observation>),
    Or(Box<Observation>, Box<Observation>),
    Not(Box<Observation>),
    ChoseSomething(ChoiceId),
    ValueGE(Value, Value),
    ValueGT(Value, Value),
    ValueLT(Value, Value),
    ValueLE(Value, Value),
    ValueEQ(Value, Value),
}

/// One of the three things a `when` case can wait for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Deposit {
        party: Party,
        into_account: Party,
        token: Token,
        value: Value,
    },
    Choice {
        choice_id: ChoiceId,
        bounds: Vec<Bound>,
    },
    Notify(Observation),
}

/// An action paired with the continuation it unlocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub action: Action,
    pub then: Contract,
}

/// The contract AST: a timed, multi-party, finite choreography.
#[derive(Debug, Clone, PartialEq)]
pub enum Contract {
    Close,
    Pay {
        from_account: Party,
        to: Payee,
        token: Token,
        value: Value,
        then: Box<Contract>,
    },
    If {
        obs: Observation,
        then: Box<Contract>,
        else_: Box<Contract>,
    },
    When {
        cases: Vec<Case>,
        timeout: i64,
        timeout_continuation: Box<Contract>,
    },
    Let {
        name: String,
        value: Value,
        then: Box<Contract>,
    },
    Assert {
        obs: Observation,
        then: Box<Contract>,
    },
}
