use url::Url;

/// Resolves an anchor `href` against the page it was found on
///
/// Returns None if the link is unusable:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use catalog_sweep::url::resolve_href;
/// use url::Url;
///
/// let page = Url::parse("https://shop.example.com/search?q=x").unwrap();
/// assert_eq!(
///     resolve_href("/store/product/a1/buds", &page).as_deref(),
///     Some("https://shop.example.com/store/product/a1/buds")
/// );
/// ```
pub fn resolve_href(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = page_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}
