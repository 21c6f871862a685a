use crate::record::PRICE_SENTINEL;
use regex::Regex;

/// Pulls a numeric amount out of free-form price text
#[derive(Debug, Clone)]
pub struct PriceParser {
    pattern: Regex,
}

impl PriceParser {
    /// Creates a parser for amounts prefixed with `currency_symbol`
    pub fn new(currency_symbol: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"{}\s?([\d,.]+(?:\.\d{{2}})?)",
            regex::escape(currency_symbol)
        ))?;
        Ok(Self { pattern })
    }

    /// Parses the first currency-prefixed amount in `text`
    ///
    /// Thousands separators are dropped. Text without an amount, or with a
    /// token that is not a number, yields the price sentinel.
    pub fn parse_price(&self, text: &str) -> f64 {
        let Some(captures) = self.pattern.captures(text) else {
            return PRICE_SENTINEL;
        };

        let token = captures[1].replace(',', "");
        token
            .trim_end_matches('.')
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .unwrap_or(PRICE_SENTINEL)
    }
}
