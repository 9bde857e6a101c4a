//! Values carried across wake cycles.

use serde::{Deserialize, Serialize};

/// Placeholder shown for any value that has never been fetched.
pub const UNAVAILABLE: &str = "N/A";

/// Longest price quote kept, in characters.
pub const MAX_QUOTE_LEN: usize = 15;

/// Last-known values shown when a cycle cannot fetch fresh ones.
///
/// Loaded once when the process starts and overwritten at most once per
/// cycle. It is passed explicitly into each cycle rather than living in a
/// global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedState {
    pub net_worth: i32,
    /// Whether `net_worth` holds a real value, fetched or loaded from the store.
    pub initialized: bool,
    pub percent_change: f64,
    pub gold_price: String,
    pub bitcoin_price: String,
}

impl Default for CachedState {
    fn default() -> Self {
        Self {
            net_worth: 0,
            initialized: false,
            percent_change: 0.0,
            gold_price: UNAVAILABLE.to_string(),
            bitcoin_price: UNAVAILABLE.to_string(),
        }
    }
}

impl CachedState {
    /// Keeps a freshly fetched gold quote unless the fetch reported it unavailable.
    pub fn accept_gold_price(&mut self, quote: &str) -> bool {
        accept_quote(&mut self.gold_price, quote)
    }

    pub fn accept_bitcoin_price(&mut self, quote: &str) -> bool {
        accept_quote(&mut self.bitcoin_price, quote)
    }
}

fn accept_quote(slot: &mut String, quote: &str) -> bool {
    let quote = quote.trim();
    if quote.is_empty() || quote == UNAVAILABLE {
        return false;
    }
    *slot = quote.chars().take(MAX_QUOTE_LEN).collect();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = CachedState::default();
        assert!(!state.initialized);
        assert_eq!(state.gold_price, "N/A");
        assert_eq!(state.bitcoin_price, "N/A");
    }

    #[test]
    fn test_unavailable_quote_keeps_cached_value() {
        let mut state = CachedState::default();
        assert!(state.accept_gold_price("$2,345"));
        assert!(!state.accept_gold_price("N/A"));
        assert!(!state.accept_gold_price("  "));
        assert_eq!(state.gold_price, "$2,345");
    }

    #[test]
    fn test_long_quote_is_truncated() {
        let mut state = CachedState::default();
        state.accept_bitcoin_price("$123,456,789,012,345");
        assert_eq!(state.bitcoin_price.chars().count(), MAX_QUOTE_LEN);
        assert_eq!(state.bitcoin_price, "$123,456,789,01");
    }
}
