//! Trading pair symbol decomposition
//!
//! Every supported symbol trades against a single fixed quote currency
//! (e.g. "USDT"); the base currency is whatever precedes it.

/// A trading pair split into base and quote currencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPair {
    symbol: String,
    base: String,
    quote: String,
}

impl TradingPair {
    /// Parse a symbol against the configured quote currency.
    ///
    /// Returns `None` unless the upper-cased symbol ends with the quote
    /// currency and leaves a non-empty base that differs from it.
    pub fn parse(symbol: &str, quote_currency: &str) -> Option<Self> {
        let symbol = symbol.trim().to_uppercase();
        let quote = quote_currency.trim().to_uppercase();
        let base = symbol.strip_suffix(quote.as_str())?.to_string();
        if base.is_empty() || base == quote {
            return None;
        }
        Some(Self {
            symbol,
            base,
            quote,
        })
    }

    /// Canonical upper-cased symbol, e.g. "ETHUSDT"
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Base currency, e.g. "ETH"
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency, e.g. "USDT"
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eth_pair() {
        let pair = TradingPair::parse("ETHUSDT", "USDT").unwrap();
        assert_eq!(pair.symbol(), "ETHUSDT");
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "USDT");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let pair = TradingPair::parse("btcusdt", "usdt").unwrap();
        assert_eq!(pair.symbol(), "BTCUSDT");
        assert_eq!(pair.base(), "BTC");
    }

    #[test]
    fn test_parse_rejects_wrong_quote() {
        assert!(TradingPair::parse("ETHBTC", "USDT").is_none());
    }

    #[test]
    fn test_parse_rejects_empty_base() {
        assert!(TradingPair::parse("USDT", "USDT").is_none());
    }

    #[test]
    fn test_parse_rejects_quote_against_itself() {
        assert!(TradingPair::parse("USDTUSDT", "USDT").is_none());
    }
}
