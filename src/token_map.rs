//! Resolves source-language token identifiers to target-chain type names.
//!
//! Grounded in `original_source/generator/fsm_model.py`'s `TOKEN_MAP` /
//! `marlowe_token_to_move_type`: a small injected lookup table plus a handful of
//! fallback rules, rather than any attempt at on-chain type introspection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel emitted for a token with no mapping and no qualified-path fallback.
/// The generated module will fail to build at the chain toolchain, which is the point:
/// the alternative (silently dropping the deposit/pay) is worse.
pub const UNKNOWN_TYPE: &str = "UNKNOWN_TOKEN_TYPE";

/// The chain-native token's resolved type name.
pub const NATIVE_TYPE: &str = "sui::sui::SUI";

/// An injected `(currency_symbol, token_name) -> target type name` table.
///
/// Constructed once per compilation (or per batch, via [`TokenMap::default`] plus
/// [`TokenMap::insert`]) and consulted by the stage allocator for every `Deposit`
/// and `Pay` node.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TokenMap {
    /// Keyed by `"{currency_symbol}:{token_name}"`.
    entries: HashMap<String, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        TokenMap { entries: HashMap::new() }
    }

    pub fn insert(&mut self, currency_symbol: impl Into<String>, token_name: impl Into<String>, target_type: impl Into<String>) {
        let key = format!("{}:{}", currency_symbol.into(), token_name.into());
        self.entries.insert(key, target_type.into());
    }

    /// Resolve `(currency_symbol, token_name)` to a target type name.
    ///
    /// Priority: exact map lookup, then an empty pair defaults to the native token,
    /// then a `currency_symbol` that already looks like a qualified path (contains
    /// `"::"`) passes through verbatim, then a `tracing::warn!` and the
    /// [`UNKNOWN_TYPE`] sentinel.
    pub fn resolve(&self, currency_symbol: &str, token_name: &str) -> String {
        let key = format!("{currency_symbol}:{token_name}");
        if let Some(target) = self.entries.get(&key) {
            return target.clone();
        }
        if currency_symbol.is_empty() && token_name.is_empty() {
            return NATIVE_TYPE.to_string();
        }
        if currency_symbol.contains("::") {
            return currency_symbol.to_string();
        }
        tracing::warn!(
            currency_symbol,
            token_name,
            "no target type mapped for token; emitting sentinel type"
        );
        UNKNOWN_TYPE.to_string()
    }
}

impl Default for TokenMap {
    /// A small fixture set covering the native token and common test tokens, matching
    /// the reference implementation's `TOKEN_MAP` defaults.
    fn default() -> Self {
        let mut map = TokenMap::new();
        map.insert("", "", NATIVE_TYPE);
        map.insert("usdc", "USDC", "usdc::usdc::USDC");
        map.insert("usdt", "USDT", "usdt::usdt::USDT");
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pair_resolves_to_native() {
        let map = TokenMap::new();
        assert_eq!(map.resolve("", ""), NATIVE_TYPE);
    }

    #[test]
    fn exact_entry_takes_priority_over_native_default() {
        let mut map = TokenMap::new();
        map.insert("", "", "overridden::native::TYPE");
        assert_eq!(map.resolve("", ""), "overridden::native::TYPE");
    }

    #[test]
    fn qualified_passthrough_for_unmapped_symbol() {
        let map = TokenMap::new();
        assert_eq!(map.resolve("0xabc::coin::COIN", "COIN"), "0xabc::coin::COIN");
    }

    #[test]
    fn unmapped_unqualified_symbol_is_sentinel() {
        let map = TokenMap::new();
        assert_eq!(map.resolve("foo", "BAR"), UNKNOWN_TYPE);
    }

    #[test]
    fn default_map_has_fixture_entries() {
        let map = TokenMap::default();
        assert_eq!(map.resolve("usdc", "USDC"), "usdc::usdc::USDC");
    }
}
