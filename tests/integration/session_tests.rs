//! Whole-session behavior: batching, early stop, page cap and time limit

use crate::common::{card, catalog_page, fast_config, page_path, site_for, titles};
use catalog_harvest::config::UserAgentConfig;
use catalog_harvest::{ExtractionSession, HarvestError};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page_number: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path(page_number)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Two-page catalog: two products, then one product and no next link
async fn two_page_site(server: &MockServer) {
    mount_page(
        server,
        1,
        catalog_page(&[card("Alpha", "$10.00"), card("Beta", "$20.00")], true),
    )
    .await;
    mount_page(server, 2, catalog_page(&[card("Gamma", "$30.00")], false)).await;
}

#[tokio::test]
async fn test_two_page_site_end_to_end() {
    let mock_server = MockServer::start().await;
    two_page_site(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = ExtractionSession::new(fast_config(3), UserAgentConfig::default());
    let harvest = session
        .run(&site_for(&mock_server), 10, 2)
        .await
        .expect("harvest should succeed");

    assert_eq!(titles(&harvest.products), vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(harvest.products[0].price, "$10.00");
    assert_eq!(harvest.report.batches, 1);
    assert_eq!(harvest.report.pages_attempted, 2);
    assert!(harvest.report.reached_end);
}

#[tokio::test]
async fn test_batch_past_end_adds_no_products() {
    let mock_server = MockServer::start().await;
    two_page_site(&mock_server).await;

    // Page 3 is inside the batch but the site has no such page
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut config = fast_config(3);
    config.max_retries = 0;
    let session = ExtractionSession::new(config, UserAgentConfig::default());
    let harvest = session.run(&site_for(&mock_server), 3, 10).await.unwrap();

    assert_eq!(harvest.products.len(), 3);
    assert_eq!(harvest.report.pages_attempted, 3);
    assert_eq!(harvest.report.pages_failed, 1);
}

#[tokio::test]
async fn test_no_batch_after_end_of_pagination() {
    let mock_server = MockServer::start().await;

    for n in 1..=3u32 {
        let body = catalog_page(&[card(&format!("Item {}", n), "$1.00")], n < 3);
        mount_page(&mock_server, n, body).await;
    }
    Mock::given(method("GET"))
        .and(path("/page4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = ExtractionSession::new(fast_config(2), UserAgentConfig::default());
    let harvest = session.run(&site_for(&mock_server), 50, 1).await.unwrap();

    assert_eq!(titles(&harvest.products), vec!["Item 1", "Item 2", "Item 3"]);
    assert_eq!(harvest.report.batches, 3);
}

#[tokio::test]
async fn test_stops_at_page_cap() {
    let mock_server = MockServer::start().await;

    for n in 1..=2u32 {
        let body = catalog_page(&[card(&format!("Item {}", n), "$1.00")], true);
        mount_page(&mock_server, n, body).await;
    }
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = ExtractionSession::new(fast_config(3), UserAgentConfig::default());
    let harvest = session.run(&site_for(&mock_server), 2, 5).await.unwrap();

    assert_eq!(harvest.products.len(), 2);
    assert!(!harvest.report.reached_end);
}

#[tokio::test]
async fn test_session_respects_concurrency_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page(&[card("Item", "$1.00")], true))
                .set_delay(Duration::from_millis(80)),
        )
        .mount(&mock_server)
        .await;

    let session = ExtractionSession::new(fast_config(2), UserAgentConfig::default());
    let harvest = session.run(&site_for(&mock_server), 6, 6).await.unwrap();

    assert_eq!(harvest.products.len(), 6);
    assert_eq!(harvest.report.peak_in_flight, 2);
}

#[tokio::test]
async fn test_session_timeout_with_stalled_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page(&[card("Late", "$1.00")], true))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let mut config = fast_config(3);
    config.session_timeout_secs = 1;
    config.request_timeout_secs = 60;
    let session = ExtractionSession::new(config, UserAgentConfig::default());

    let started = Instant::now();
    let result = session.run(&site_for(&mock_server), 5, 5).await;

    let err = result.unwrap_err();
    assert!(err.is_timeout());
    assert!(matches!(
        err,
        HarvestError::SessionTimeout { limit } if limit == Duration::from_secs(1)
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_empty_catalog_is_ok_with_no_products() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, catalog_page(&[], false)).await;

    let session = ExtractionSession::new(fast_config(1), UserAgentConfig::default());
    let harvest = session.run(&site_for(&mock_server), 5, 5).await;

    // page 2..5 return wiremock's default 404 and count as failures
    let harvest = harvest.unwrap();
    assert!(harvest.products.is_empty());
    assert!(harvest.report.reached_end);
}
