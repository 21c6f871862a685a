//! Integration tests for the harvest
//!
//! These tests use wiremock to serve a paginated search feed (and, for the
//! browser strategy, a minimal WebDriver endpoint) and run the full fetch,
//! extract, paginate and write cycle end-to-end.

use catalog_sweep::config::{parse_config, SweepConfig};
use catalog_sweep::harvest::{run_harvest, StopReason, Strategy};
use catalog_sweep::output::write_csv;
use tempfile::TempDir;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const SEARCH_PATH: &str = "/store/search";

/// Matches on the `currentPage` query parameter; `None` means "absent"
struct PageParam(Option<u32>);

impl Match for PageParam {
    fn matches(&self, request: &Request) -> bool {
        let page = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "currentPage")
            .map(|(_, value)| value.into_owned());

        match (self.0, page) {
            (None, None) => true,
            (Some(expected), Some(actual)) => actual == expected.to_string(),
            _ => false,
        }
    }
}

/// Creates a test configuration pointed at the mock server
fn create_test_config(server_uri: &str) -> SweepConfig {
    let mut config = SweepConfig::default();
    config.target.search_url = format!("{}{}?query=headphones", server_uri, SEARCH_PATH);
    config.http.retry_delay_ms = 10; // Very short for testing
    config.http.timeout_secs = 5;
    config.pagination.page_delay_ms = 0;
    config
}

fn product(name: &str, price: &str, mpn: &str) -> String {
    format!(
        r#"<sn-product-grid-item>
            <div class="sn-product-grid__image-container"><a href="/p/{mpn}"><img src="x.png"></a></div>
            <h3 class="sn-product-grid__name"><a href="/p/{mpn}">{name}</a></h3>
            <div class="cx-product-price">{price}</div>
            <span class="cx-sku">{mpn}</span>
        </sn-product-grid-item>"#
    )
}

fn results_page(products: &[String]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>Search</title></head><body><div class=\"grid\">{}</div></body></html>",
            products.concat()
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: Option<u32>, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(PageParam(page))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_harvest_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        None,
        results_page(&[
            product("WH-1000XM5 Wireless Headphones", "£379.00", "WH1000XM5"),
            product("WF-C700N", "£1,099.99", "WFC700N"),
        ]),
    )
    .await;
    mount_page(&mock_server, Some(1), results_page(&[])).await;
    mount_page(
        &mock_server,
        Some(2),
        results_page(&[product("MDR-7506", "Currently unavailable", "MDR7506")]),
    )
    .await;
    mount_page(&mock_server, Some(3), results_page(&[])).await;
    mount_page(&mock_server, Some(4), results_page(&[])).await;

    let config = create_test_config(&mock_server.uri());
    let harvest = run_harvest(&config, Strategy::Http).await.unwrap();

    assert_eq!(harvest.records.len(), 3);
    assert_eq!(harvest.stats.pages_processed, 5);
    assert_eq!(
        harvest.stats.stop_reason,
        Some(StopReason::EmptyPages { count: 2 })
    );
    assert_eq!(harvest.stats.incomplete_records, 1);

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join(Strategy::Http.default_output());
    write_csv(&harvest.records, &csv_path).unwrap();

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        content,
        "Name,Price,MPN,URL\n\
         WH-1000XM5 Wireless Headphones,379.0,WH1000XM5,https://www.sony.co.uk/store/product/wh1000xm5/wh-1000xm5-wireless-headphones\n\
         WF-C700N,1099.99,WFC700N,https://www.sony.co.uk/store/product/wfc700n/wf-c700n\n\
         MDR-7506,0.0,MDR7506,https://www.sony.co.uk/store/product/mdr7506/mdr-7506\n"
    );
}

#[tokio::test]
async fn test_failing_page_is_retried_then_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(PageParam(None))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.pagination.max_pages = Some(1);

    let harvest = run_harvest(&config, Strategy::Http).await.unwrap();

    assert!(harvest.records.is_empty());
    assert_eq!(harvest.stats.failed_pages, 1);
    assert_eq!(
        harvest.stats.stop_reason,
        Some(StopReason::PageLimit { pages: 1 })
    );
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let mock_server = MockServer::start().await;

    // Mounted first, so it answers the first two requests
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(PageParam(None))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        None,
        results_page(&[product("ULT WEAR", "£199.00", "WHULT900N")]),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri());
    config.pagination.max_pages = Some(1);

    let harvest = run_harvest(&config, Strategy::Http).await.unwrap();

    assert_eq!(harvest.records.len(), 1);
    assert_eq!(harvest.records[0].price, 199.0);
    assert_eq!(harvest.stats.failed_pages, 0);
}

#[tokio::test]
async fn test_no_results_page_counts_toward_empty_threshold() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        None,
        results_page(&[product("WH-CH520", "£49", "WHCH520")]),
    )
    .await;
    mount_page(
        &mock_server,
        Some(1),
        ResponseTemplate::new(200).set_body_string(
            "<html><body><span>We could not find anything matching for 'headphones'</span></body></html>",
        ),
    )
    .await;
    mount_page(&mock_server, Some(2), results_page(&[])).await;

    let config = create_test_config(&mock_server.uri());
    let harvest = run_harvest(&config, Strategy::Http).await.unwrap();

    assert_eq!(harvest.records.len(), 1);
    assert_eq!(harvest.records[0].price, 49.0);
    assert_eq!(harvest.stats.no_results_pages, 1);
    assert_eq!(harvest.stats.pages_processed, 3);
}

#[tokio::test]
async fn test_harvest_from_toml_config() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        None,
        results_page(&[product("Walkman NW-A306", "$349.00", "NWA306")]),
    )
    .await;

    let toml = format!(
        r#"
[target]
search-url = "{uri}{path}?query=walkman"
base-url = "https://electronics.example.com"
product-path = "/shop/item"
currency-symbol = "$"

[http]
retry-delay-ms = 10

[pagination]
page-delay-ms = 0
max-pages = 1
"#,
        uri = mock_server.uri(),
        path = SEARCH_PATH
    );
    let config = parse_config(&toml).unwrap();

    let harvest = run_harvest(&config, Strategy::Http).await.unwrap();

    assert_eq!(harvest.records.len(), 1);
    assert_eq!(harvest.records[0].price, 349.0);
    assert_eq!(
        harvest.records[0].url,
        "https://electronics.example.com/shop/item/nwa306/walkman-nw-a306"
    );
}

// Browser strategy against a fake WebDriver

const SESSION_PATH: &str = "/session/s1";
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const STORE_SEARCH_URL: &str = "https://shop.example.com/store/search?query=headphones";

fn webdriver_value(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

fn found_elements(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({ ELEMENT_KEY: format!("e{}", i) }))
            .collect(),
    )
}

/// Starts a WebDriver that opens session `s1` and expects it to be closed once
async fn start_webdriver() -> MockServer {
    let driver = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(webdriver_value(json!({
            "sessionId": "s1",
            "capabilities": { "browserName": "chrome" }
        })))
        .expect(1)
        .mount(&driver)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/url", SESSION_PATH)))
        .respond_with(webdriver_value(json!(STORE_SEARCH_URL)))
        .mount(&driver)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/execute/sync", SESSION_PATH)))
        .respond_with(webdriver_value(Value::Null))
        .mount(&driver)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SESSION_PATH))
        .respond_with(webdriver_value(Value::Null))
        .expect(1)
        .mount(&driver)
        .await;

    driver
}

/// Answers element lookups made with the given locator strategy
async fn mount_find(driver: &MockServer, using: &str, count: usize) {
    Mock::given(method("POST"))
        .and(path(format!("{}/elements", SESSION_PATH)))
        .and(body_partial_json(json!({ "using": using })))
        .respond_with(webdriver_value(found_elements(count)))
        .mount(driver)
        .await;
}

async fn mount_navigation(driver: &MockServer, url: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("{}/url", SESSION_PATH)))
        .and(body_partial_json(json!({ "url": url })))
        .respond_with(webdriver_value(Value::Null))
        .expect(times)
        .mount(driver)
        .await;
}

async fn mount_source(driver: &MockServer, html: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{}/source", SESSION_PATH)))
        .respond_with(webdriver_value(json!(html)))
        .expect(times)
        .mount(driver)
        .await;
}

fn create_browser_config(driver_uri: &str) -> SweepConfig {
    let mut config = SweepConfig::default();
    config.target.search_url = STORE_SEARCH_URL.to_string();
    config.browser.webdriver_url = driver_uri.to_string();
    config.browser.render_timeout_secs = 1;
    config.browser.poll_interval_ms = 20;
    config.browser.scroll_pause_ms = 0;
    config.pagination.page_delay_ms = 0;
    config
}

#[tokio::test]
async fn test_browser_harvest_reads_anchor_urls() {
    let driver = start_webdriver().await;
    mount_find(&driver, "xpath", 0).await;
    mount_find(&driver, "css selector", 2).await;
    mount_navigation(&driver, STORE_SEARCH_URL, 1).await;
    mount_navigation(&driver, &format!("{}&currentPage=1", STORE_SEARCH_URL), 1).await;

    let html = format!(
        "<html><body>{}{}</body></html>",
        product("WH-1000XM5 Wireless Headphones", "£379.00", "WH1000XM5"),
        product("WF-C700N", "£99.00", "WFC700N")
    );
    mount_source(&driver, &html, 2).await;

    let mut config = create_browser_config(&driver.uri());
    config.pagination.max_pages = Some(2);

    let harvest = run_harvest(&config, Strategy::Browser).await.unwrap();

    assert_eq!(harvest.records.len(), 4);
    assert_eq!(harvest.records[0].name, "WH-1000XM5 Wireless Headphones");
    assert_eq!(harvest.records[0].price, 379.0);
    assert_eq!(harvest.records[0].url, "https://shop.example.com/p/WH1000XM5");
    assert_eq!(harvest.records[1].url, "https://shop.example.com/p/WFC700N");
    assert_eq!(harvest.stats.source, "browser");
    assert_eq!(
        harvest.stats.stop_reason,
        Some(StopReason::PageLimit { pages: 2 })
    );
}

#[tokio::test]
async fn test_browser_harvest_stops_on_no_results_marker() {
    let driver = start_webdriver().await;
    mount_find(&driver, "xpath", 1).await;
    mount_find(&driver, "css selector", 3).await;
    mount_navigation(&driver, STORE_SEARCH_URL, 1).await;
    mount_source(&driver, "<html></html>", 0).await;

    let config = create_browser_config(&driver.uri());
    let harvest = run_harvest(&config, Strategy::Browser).await.unwrap();

    assert!(harvest.records.is_empty());
    assert_eq!(harvest.stats.pages_processed, 1);
    assert_eq!(harvest.stats.no_results_pages, 1);
    assert_eq!(harvest.stats.stop_reason, Some(StopReason::FirstEmptyPage));
}

#[tokio::test]
async fn test_browser_render_timeout_fails_page() {
    let driver = start_webdriver().await;
    mount_find(&driver, "xpath", 0).await;
    mount_find(&driver, "css selector", 0).await;
    mount_navigation(&driver, STORE_SEARCH_URL, 1).await;
    mount_source(&driver, "<html></html>", 0).await;

    let config = create_browser_config(&driver.uri());
    let harvest = run_harvest(&config, Strategy::Browser).await.unwrap();

    assert!(harvest.records.is_empty());
    assert_eq!(harvest.stats.pages_processed, 1);
    assert_eq!(harvest.stats.failed_pages, 1);
    assert_eq!(harvest.stats.stop_reason, Some(StopReason::FirstEmptyPage));
}
