//! The product record harvested from each grid entry

use serde::{Serialize, Serializer};

/// Placeholder for text fields that could not be resolved
pub const TEXT_SENTINEL: &str = "N/A";

/// Placeholder for a price that could not be resolved
pub const PRICE_SENTINEL: f64 = 0.0;

/// Column names, in output order
pub const CSV_HEADER: [&str; 4] = ["Name", "Price", "MPN", "URL"];

/// One product as found on a results page
///
/// Every field is always populated; unresolved fields carry the sentinels
/// above instead of being left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Price", serialize_with = "serialize_price")]
    pub price: f64,

    #[serde(rename = "MPN")]
    pub mpn: String,

    #[serde(rename = "URL")]
    pub url: String,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        mpn: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            mpn: mpn.into(),
            url: url.into(),
        }
    }

    /// Returns true if no field fell back to its sentinel
    pub fn is_complete(&self) -> bool {
        self.name != TEXT_SENTINEL
            && self.mpn != TEXT_SENTINEL
            && self.url != TEXT_SENTINEL
            && self.price != PRICE_SENTINEL
    }
}

/// Formats a price as a plain decimal that always carries a fractional part
///
/// `1299.0` stays `1299.0` rather than collapsing to `1299`.
pub fn format_price(price: f64) -> String {
    if price.is_finite() && price.fract() == 0.0 {
        format!("{:.1}", price)
    } else {
        price.to_string()
    }
}

fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_price(*price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1299.0), "1299.0");
        assert_eq!(format_price(49.0), "49.0");
        assert_eq!(format_price(0.0), "0.0");
        assert_eq!(format_price(12.99), "12.99");
        assert_eq!(format_price(349.5), "349.5");
    }

    #[test]
    fn test_is_complete() {
        let full = ProductRecord::new("WH-1000XM5", 379.0, "WH1000XM5", "https://x/y");
        assert!(full.is_complete());

        let no_price = ProductRecord::new("WH-1000XM5", PRICE_SENTINEL, "WH1000XM5", "https://x/y");
        assert!(!no_price.is_complete());

        let no_mpn = ProductRecord::new("WH-1000XM5", 379.0, TEXT_SENTINEL, TEXT_SENTINEL);
        assert!(!no_mpn.is_complete());
    }
}
