//! Batch fetching through the pagination driver

use crate::common::{card, catalog_page, fast_config, fetcher, page_path, site_for, titles};
use catalog_harvest::crawler::{CatalogParser, PaginationDriver};
use catalog_harvest::state::PageState;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page_number: u32, body: String, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(page_path(page_number)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_results_in_page_order_under_shuffled_latency() {
    let mock_server = MockServer::start().await;

    // Later pages answer first
    let delays = [300, 40, 200, 0, 120];
    for (i, delay) in delays.iter().enumerate() {
        let n = i as u32 + 1;
        let body = catalog_page(&[card(&format!("Item {}", n), "$10.00")], true);
        mount_page(&mock_server, n, body, *delay).await;
    }

    let config = fast_config(5);
    let fetcher = fetcher(&config);
    let site = site_for(&mock_server);
    let parser = CatalogParser;
    let driver = PaginationDriver::new(&fetcher, &parser, &site);

    let batch = driver.fetch_range(1, 5).await;

    assert_eq!(
        titles(&batch.products),
        vec!["Item 1", "Item 2", "Item 3", "Item 4", "Item 5"]
    );
    let numbers: Vec<u32> = batch.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert!(!batch.reached_end);
}

#[tokio::test]
async fn test_end_of_pagination_does_not_cancel_siblings() {
    let mock_server = MockServer::start().await;

    for n in 1..=5u32 {
        let body = if n == 3 {
            catalog_page(&[], false)
        } else {
            catalog_page(&[card(&format!("Item {}", n), "$10.00")], true)
        };
        mount_page(&mock_server, n, body, 0).await;
    }

    let config = fast_config(5);
    let fetcher = fetcher(&config);
    let site = site_for(&mock_server);
    let parser = CatalogParser;
    let driver = PaginationDriver::new(&fetcher, &parser, &site);

    let batch = driver.fetch_range(1, 5).await;

    assert!(batch.reached_end);
    assert_eq!(
        titles(&batch.products),
        vec!["Item 1", "Item 2", "Item 4", "Item 5"]
    );
    assert!(!batch.pages[2].has_next);
    assert_eq!(batch.pages[2].products, 0);
}

#[tokio::test]
async fn test_failed_page_contributes_nothing() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        catalog_page(&[card("First", "$5.00")], true),
        0,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        3,
        catalog_page(&[card("Third", "$5.00")], true),
        0,
    )
    .await;

    let mut config = fast_config(3);
    config.max_retries = 1;
    let fetcher = fetcher(&config);
    let site = site_for(&mock_server);
    let parser = CatalogParser;
    let driver = PaginationDriver::new(&fetcher, &parser, &site);

    let batch = driver.fetch_range(1, 3).await;

    assert_eq!(titles(&batch.products), vec!["First", "Third"]);
    assert_eq!(batch.pages[1].state, PageState::Failed);
    assert!(!batch.pages[1].has_next);
    assert_eq!(batch.failed_pages(), 1);
    assert!(batch.reached_end);
}

#[tokio::test]
async fn test_page_without_grid_counts_as_failed() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        "<html><body><p>Maintenance</p></body></html>".to_string(),
        0,
    )
    .await;

    let config = fast_config(1);
    let fetcher = fetcher(&config);
    let site = site_for(&mock_server);
    let parser = CatalogParser;
    let driver = PaginationDriver::new(&fetcher, &parser, &site);

    let batch = driver.fetch_range(1, 1).await;

    assert!(batch.products.is_empty());
    assert_eq!(batch.pages[0].state, PageState::Unreachable);
    assert_eq!(batch.failed_pages(), 1);
    assert!(batch.reached_end);
}
