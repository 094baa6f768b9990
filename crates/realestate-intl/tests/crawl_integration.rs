//! End-to-end crawl against a local mock of the listings site.

use realestate_intl::acquisition::HttpClient;
use realestate_intl::config::CrawlConfig;
use realestate_intl::crawler::Crawler;
use realestate_intl::sink::JsonDirSink;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn results_page(hrefs: &[&str], titles: &[&str]) -> String {
    let cards: String = hrefs
        .iter()
        .map(|h| {
            format!(
                r#"<a href="{h}"><div data-testid="standard-listing-card"><h2>Listing</h2></div></a>"#
            )
        })
        .collect();
    let items: String = titles
        .iter()
        .map(|t| format!(r#"<li title="{t}"><a>{t}</a></li>"#))
        .collect();
    format!(
        r#"<html><body>
        <a href="/international/id/help">Help</a>
        {cards}
        <ul class="ant-pagination"><li title="Previous Page"></li>{items}<li title="Next Page"></li></ul>
        </body></html>"#
    )
}

fn detail_page(id: &str, agent: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/json">{{"apolloState": {{
            "ListingDetail:{id}": {{
                "id": "{id}",
                "price": {{"display": "IDR {id}"}},
                "buildingFeature": {{"indoorFeature": ["pool"]}},
                "agency": {{"id": "Agency:7"}},
                "landSize({{\"language\":\"en\",\"unit\":\"SQUARE_METERS\"}})": {{"value": 250}}
            }},
            "Agency:7": {{"id": "Agency:7", "name": "Bali Homes"}}
        }}}}</script>
        <script id="__NEXT_DATA__" type="application/json">{{"props": {{"pageProps": {{"apolloState": {{
            "Agent:{id}": {{"name": "{agent}"}}
        }}}}}}}}</script>
        </head><body>
        <div class="display-address">Canggu, Bali</div>
        <div class="property-description"><p>Sawah views.</p></div>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn read_record(dir: &Path, listing_id: &str) -> Value {
    let text = std::fs::read_to_string(dir.join(format!("{listing_id}.json"))).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_crawl_discovers_pages_and_writes_records() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/international/id",
        results_page(
            &["/international/id/bali/101", "/international/id/bali/102"],
            &["1", "2"],
        ),
    )
    .await;
    mount_html(
        &server,
        "/international/id/p2",
        results_page(
            &["/international/id/bali/103", "/international/id/bali/gone"],
            &["1", "2"],
        ),
    )
    .await;
    mount_html(&server, "/international/id/bali/101", detail_page("101", "Wayan")).await;
    mount_html(&server, "/international/id/bali/102", detail_page("102", "Ketut")).await;
    mount_html(&server, "/international/id/bali/103", detail_page("103", "Nyoman Śri")).await;

    let tmp = TempDir::new().unwrap();
    let config = CrawlConfig {
        origin: Url::parse(&server.uri()).unwrap(),
        concurrency: 3,
        timeout_ms: 5_000,
        data_dir: tmp.path().join("data"),
        ..CrawlConfig::default()
    };
    config.validate().unwrap();

    let crawler = Crawler::new(HttpClient::new(config.timeout_ms).unwrap(), config.concurrency);
    let mut sink = JsonDirSink::new(&config.data_dir);
    let summary = crawler.run(&config.discoverer(), &mut sink).await.unwrap();

    assert_eq!(summary.listing_pages, 2);
    assert_eq!(summary.listing_pages_failed, 0);
    assert_eq!(summary.detail_pages, 4);
    assert_eq!(summary.detail_pages_failed, 1);
    assert_eq!(summary.records_written, 3);

    let record = read_record(&config.data_dir, "101");
    assert_eq!(record["listing_id"], "101");
    assert_eq!(
        record["url"],
        format!("{}/international/id/bali/101", server.uri())
    );
    assert_eq!(record["price"]["display"], "IDR 101");
    assert_eq!(record["location"], "Canggu, Bali");
    assert_eq!(record["description"], "Sawah views.");
    assert_eq!(record["agency"]["name"], "Bali Homes");
    assert_eq!(record["agent"]["name"], "Wayan");
    assert_eq!(record["landSize"]["value"], 250);
    assert!(record["buildingSize"].is_null());
    assert_eq!(record["buildingFeature"]["indoorFeature"][0], "pool");
    assert!(record["buildingFeature"]["outdoorFeature"].is_null());

    let unicode = std::fs::read_to_string(config.data_dir.join("103.json")).unwrap();
    assert!(unicode.contains("Nyoman Śri"));
    assert!(!config.data_dir.join("gone.json").exists());
}

#[tokio::test]
async fn test_explicit_page_count_skips_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/international/my"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[], &["1", "9"])))
        .expect(0)
        .mount(&server)
        .await;

    let config = CrawlConfig {
        origin: Url::parse(&server.uri()).unwrap(),
        country_code: "my".into(),
        max_pages: Some(2),
        ..CrawlConfig::default()
    };
    let client = HttpClient::new(config.timeout_ms).unwrap();
    let urls = config.discoverer().discover(&client).await.unwrap();

    assert_eq!(
        urls,
        [
            format!("{}/international/my", server.uri()),
            format!("{}/international/my/p2", server.uri()),
        ]
    );
}
