//! Product extraction from rendered results pages
//!
//! Each product entry is read field by field. A field whose selector finds
//! nothing falls back to its sentinel; the entry still becomes a record, so
//! the record count of a page always equals its entry count.

mod price;

pub use price::PriceParser;

use crate::config::{compile_selector, SelectorConfig, TargetConfig};
use crate::record::{ProductRecord, PRICE_SENTINEL, TEXT_SENTINEL};
use crate::source::RenderedPage;
use crate::url::{product_url, resolve_href};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Where a record's URL comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Built from the product name and MPN
    Synthesized,
    /// Read from the product anchor on the page
    Anchor,
}

/// What a page turned out to contain
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The page carries the explicit "no results" message
    NoResults,
    /// Product records in document order (possibly none)
    Products(Vec<ProductRecord>),
}

impl Extraction {
    pub fn into_records(self) -> Vec<ProductRecord> {
        match self {
            Extraction::NoResults => Vec::new(),
            Extraction::Products(records) => records,
        }
    }
}

/// Maps product entries on a page to [`ProductRecord`]s
#[derive(Debug, Clone)]
pub struct Extractor {
    item: Selector,
    name: Selector,
    price: Selector,
    mpn: Selector,
    link: Selector,
    marker_tag: Selector,
    marker_text: String,
    prices: PriceParser,
    base_url: String,
    product_path: String,
    link_mode: LinkMode,
}

impl Extractor {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - Ready to extract
    /// * `Err(ConfigError)` - A selector or the currency pattern is invalid
    pub fn new(
        target: &TargetConfig,
        selectors: &SelectorConfig,
        link_mode: LinkMode,
    ) -> Result<Self, ConfigError> {
        let prices = PriceParser::new(&target.currency_symbol).map_err(|e| {
            ConfigError::Validation(format!(
                "Unusable currency-symbol '{}': {}",
                target.currency_symbol, e
            ))
        })?;

        Ok(Self {
            item: compile_selector(&selectors.product_item)?,
            name: compile_selector(&selectors.name)?,
            price: compile_selector(&selectors.price)?,
            mpn: compile_selector(&selectors.mpn)?,
            link: compile_selector(&selectors.product_link)?,
            marker_tag: compile_selector(&selectors.no_results_tag)?,
            marker_text: normalize_whitespace(&selectors.no_results_text),
            prices,
            base_url: target.base_url.clone(),
            product_path: target.product_path.clone(),
            link_mode,
        })
    }

    /// Extracts the records on a page; empty when the page says "no results"
    pub fn extract(&self, page: &RenderedPage) -> Vec<ProductRecord> {
        self.scan(page).into_records()
    }

    /// Extracts the records on a page, telling the "no results" message apart
    /// from a page that simply has no entries
    pub fn scan(&self, page: &RenderedPage) -> Extraction {
        let document = Html::parse_document(&page.html);

        if self.shows_no_results(&document) {
            return Extraction::NoResults;
        }

        let records = document
            .select(&self.item)
            .enumerate()
            .map(|(index, item)| self.read_record(index, item, &page.url))
            .collect();

        Extraction::Products(records)
    }

    fn shows_no_results(&self, document: &Html) -> bool {
        document
            .select(&self.marker_tag)
            .any(|element| element_text(element).contains(&self.marker_text))
    }

    /// Reads one product entry; every field is resolved independently
    fn read_record(&self, index: usize, item: ElementRef<'_>, page_url: &Url) -> ProductRecord {
        let name = first_text(item, &self.name).unwrap_or_else(|| {
            tracing::debug!("Name missing on item {}", index);
            TEXT_SENTINEL.to_string()
        });

        let price = match first_text(item, &self.price) {
            Some(text) => self.prices.parse_price(&text),
            None => {
                tracing::debug!("Price missing on item {}", index);
                PRICE_SENTINEL
            }
        };

        let mpn = first_text(item, &self.mpn).unwrap_or_else(|| {
            tracing::debug!("MPN missing on item {}", index);
            TEXT_SENTINEL.to_string()
        });

        let url = match self.link_mode {
            LinkMode::Synthesized => product_url(&self.base_url, &self.product_path, &name, &mpn),
            LinkMode::Anchor => item
                .select(&self.link)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .and_then(|href| resolve_href(href, page_url))
                .unwrap_or_else(|| {
                    tracing::debug!("URL missing on item {}", index);
                    TEXT_SENTINEL.to_string()
                }),
        };

        ProductRecord::new(name, price, mpn, url)
    }
}

/// Text of the first match of `selector` under `item`, if non-empty
fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Visible text of an element; inline markup does not split words
fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
