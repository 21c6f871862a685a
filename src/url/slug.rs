use crate::record::TEXT_SENTINEL;

/// Turns a product name into the slug used in product URLs
///
/// Characters other than alphanumerics, `_`, whitespace and `-` are dropped,
/// each space becomes `-`, and the result is lower-cased. Runs of spaces are
/// kept as runs of hyphens, matching the store's own URLs.
///
/// # Examples
///
/// ```
/// use catalog_sweep::url::slugify;
///
/// assert_eq!(slugify("WH-1000XM5 Wireless Headphones"), "wh-1000xm5-wireless-headphones");
/// assert_eq!(slugify("LinkBuds S (Black)"), "linkbuds-s-black");
/// ```
pub fn slugify(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .map(|c| if c == ' ' { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Synthesizes a product URL from its name and MPN
///
/// Returns the text sentinel when either input is the sentinel itself.
///
/// # Arguments
///
/// * `base_url` - Site root, e.g. `https://www.sony.co.uk`
/// * `product_path` - Path prefix for product pages, e.g. `/store/product`
/// * `name` - Product display name
/// * `mpn` - Manufacturer part number
///
/// # Examples
///
/// ```
/// use catalog_sweep::url::product_url;
///
/// let url = product_url(
///     "https://www.sony.co.uk",
///     "/store/product",
///     "WH-1000XM5 Wireless Headphones",
///     "WH1000XM5",
/// );
/// assert_eq!(
///     url,
///     "https://www.sony.co.uk/store/product/wh1000xm5/wh-1000xm5-wireless-headphones"
/// );
/// ```
pub fn product_url(base_url: &str, product_path: &str, name: &str, mpn: &str) -> String {
    if name == TEXT_SENTINEL || mpn == TEXT_SENTINEL {
        return TEXT_SENTINEL.to_string();
    }

    format!(
        "{}{}/{}/{}",
        base_url.trim_end_matches('/'),
        product_path.trim_end_matches('/'),
        mpn.to_lowercase(),
        slugify(name)
    )
}
