//! URL handling module for Catalog-Sweep
//!
//! This module builds the result-page URLs walked by the paginator and the
//! product URLs stored in each record.

mod resolve;
mod slug;

pub use resolve::resolve_href;
pub use slug::{product_url, slugify};

/// Builds the URL of a zero-based results page
///
/// Page 0 is the search URL itself. Later pages append `param=page`, joined
/// with `&` when the search URL already carries a query and `?` otherwise.
///
/// # Examples
///
/// ```
/// use catalog_sweep::url::page_url;
///
/// let base = "https://shop.example.com/search?query=audio";
/// assert_eq!(page_url(base, "currentPage", 0), base);
/// assert_eq!(
///     page_url(base, "currentPage", 3),
///     "https://shop.example.com/search?query=audio&currentPage=3"
/// );
/// ```
pub fn page_url(search_url: &str, param: &str, page: u32) -> String {
    if page == 0 {
        return search_url.to_string();
    }

    let separator = if search_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", search_url, separator, param, page)
}
