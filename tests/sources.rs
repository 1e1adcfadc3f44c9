use httpmock::prelude::*;
use offer_scout::config::AppConfig;
use offer_scout::scraper::{SourceKind, SourceRegistry};
use offer_scout::service::Aggregator;

const ELEVENST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ProductSearchResponse>
  <Products>
    <Product>
      <ProductName><![CDATA[농심 신라면 120g 5개입]]></ProductName>
      <DetailPageUrl>https://www.11st.co.kr/products/1</DetailPageUrl>
      <SalePrice>4,650</SalePrice>
      <Rating>92</Rating>
      <ReviewCount>310</ReviewCount>
    </Product>
  </Products>
</ProductSearchResponse>"#;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn keyed_config(server: &MockServer) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.sources.elevenst_api_url = server.url("/openapi");
    cfg.sources.elevenst_api_key = Some("eleven-key".into());
    cfg.sources.serpapi_url = server.url("/search");
    cfg.sources.serpapi_api_key = Some("serp-key".into());
    cfg.sources.max_results = 5;
    cfg.sources.timeout_seconds = 5;
    cfg
}

#[tokio::test]
async fn api_sources_are_merged_and_ranked() {
    let server = MockServer::start_async().await;

    let elevenst = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/openapi")
                .query_param("key", "eleven-key")
                .query_param("apiCode", "ProductSearch")
                .query_param("keyword", "농심 신라면")
                .query_param("pageSize", "5");
            then.status(200)
                .header("Content-Type", "text/xml; charset=utf-8")
                .body(ELEVENST_XML);
        })
        .await;

    let serpapi = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("engine", "naver_shopping")
                .query_param("api_key", "serp-key");
            then.status(200).json_body(serde_json::json!({
                "shopping_results": [
                    {
                        "title": "농심 신라면 멀티팩 세트",
                        "link": "https://smartstore.naver.com/1",
                        "price": "19,800원",
                        "rating": 4.9,
                        "reviews": 5000,
                        "thumbnail": "https://shop-phinf.naver.net/1.jpg"
                    },
                    { "title": "삼양 불닭볶음면", "link": "https://smartstore.naver.com/2", "price": 1200 }
                ]
            }));
        })
        .await;

    let cfg = keyed_config(&server);
    let (summary, warnings) = Aggregator::from_config(&cfg)
        .unwrap()
        .aggregate("신라면", "농심", &names(&["11st", "naver_serpapi"]))
        .await;

    elevenst.assert_async().await;
    serpapi.assert_async().await;

    assert_eq!(summary.offers.len(), 3);
    let best = summary.best_offer.unwrap();
    assert_eq!(best.source, "11st");
    assert_eq!(best.price, Some(4650));
    assert_eq!(best.rating, Some(4.6));
    assert_eq!(summary.offers.last().unwrap().title, "삼양 불닭볶음면");
    assert!(warnings.is_empty(), "{:?}", warnings);
}

#[tokio::test]
async fn missing_api_keys_are_reported_not_fatal() {
    let server = MockServer::start_async().await;
    let untouched = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200);
        })
        .await;

    let mut cfg = keyed_config(&server);
    cfg.sources.elevenst_api_key = None;
    cfg.sources.serpapi_api_key = None;

    let (summary, warnings) = Aggregator::from_config(&cfg)
        .unwrap()
        .aggregate("신라면", "농심", &names(&["11st", "naver_serpapi"]))
        .await;

    untouched.assert_hits_async(0).await;
    assert!(summary.best_offer.is_none());
    assert_eq!(
        warnings,
        vec![
            "11st fetch failed: 11st API key is not configured",
            "naver_serpapi fetch failed: SerpApi API key is not configured",
            "No offers available",
        ]
    );
}

#[tokio::test]
async fn malformed_payload_is_a_source_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).body("<html>captcha</html>");
        })
        .await;

    let cfg = keyed_config(&server);
    let (_, warnings) = Aggregator::from_config(&cfg)
        .unwrap()
        .aggregate("신라면", "농심", &names(&["naver_serpapi"]))
        .await;

    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("naver_serpapi fetch failed: JSON parse error"));
}

#[test]
fn every_source_kind_has_a_fetcher() {
    let registry = SourceRegistry::from_config(&AppConfig::default().sources).unwrap();
    assert!(SourceKind::ALL.iter().all(|k| registry.get(*k).is_some()));
}
