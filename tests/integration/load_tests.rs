//! Harvest, clean and load into CSV and SQLite

use crate::common::{card, catalog_page, fast_config, page_path};
use catalog_harvest::config::{Config, SiteConfig};
use catalog_harvest::crawler::harvest;
use catalog_harvest::output::{write_all, CsvSink, ProductSink, SqliteSink};
use catalog_harvest::storage::{RunStatus, SqliteStorage, Storage};
use catalog_harvest::transform::transform_products;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_catalog() -> MockServer {
    let mock_server = MockServer::start().await;

    let pages = [
        catalog_page(
            &[
                card("Hoodie 3", "$102.15"),
                card("Unknown Product", "$100.00"),
                card("Hoodie 3", "$102.15"),
            ],
            true,
        ),
        catalog_page(
            &[card("T-shirt 8", "$50.00"), card("Pants 2", "Price Unavailable")],
            false,
        ),
    ];
    for (i, body) in pages.into_iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(page_path(i as u32 + 1)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
    }

    mock_server
}

fn config_for(server: &MockServer) -> Config {
    let mut harvester = fast_config(2);
    harvester.max_pages = 2;
    harvester.batch_size = 2;

    Config {
        harvester,
        site: SiteConfig {
            root_url: format!("{}/", server.uri()),
            page_template: format!("{}/page{{}}", server.uri()),
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_harvest_and_clean() {
    let mock_server = mock_catalog().await;
    let config = config_for(&mock_server);

    let harvested = harvest(&config).await.unwrap();
    assert_eq!(harvested.products.len(), 5);

    let products = transform_products(&harvested.products, config.output.exchange_rate);
    let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Hoodie 3", "T-shirt 8"]);

    let hoodie = &products[0];
    assert!((hoodie.price - 1_634_400.0).abs() < 1e-6);
    assert_eq!(hoodie.rating, 4.5);
    assert_eq!(hoodie.colors, Some(3));
    assert_eq!(hoodie.size, "M");
    assert_eq!(hoodie.gender, "Unisex");
}

#[tokio::test]
async fn test_load_into_csv_and_sqlite() {
    let mock_server = mock_catalog().await;
    let config = config_for(&mock_server);
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("out").join("products.csv");
    let db_path = dir.path().join("products.db");

    let harvested = harvest(&config).await.unwrap();
    let products = transform_products(&harvested.products, config.output.exchange_rate);

    let mut sinks: Vec<Box<dyn ProductSink>> = vec![
        Box::new(CsvSink::new(&csv_path)),
        Box::new(SqliteSink::new(
            SqliteStorage::new(&db_path).unwrap(),
            "test-hash",
        )),
    ];
    let written = write_all(&mut sinks, &products).unwrap();
    assert_eq!(written, 2);
    drop(sinks);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(String::from)
        .collect();
    assert_eq!(
        headers,
        vec!["Title", "Price", "Rating", "Colors", "Size", "Gender", "Timestamp"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "Hoodie 3");
    assert_eq!(&rows[1][0], "T-shirt 8");

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(storage.load_products(run.id).unwrap(), products);
}
