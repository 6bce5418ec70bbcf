//! Retry, backoff and concurrency behavior of the page fetcher

use crate::common::{fast_config, fetcher};
use catalog_harvest::crawler::FetchOutcome;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use wiremock::http::HeaderName;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_rate_limited_until_last_retry_then_success() {
    let mock_server = MockServer::start().await;

    // Mounted first, so it answers until exhausted
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = fast_config(1);
    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let outcome = fetcher(&config).fetch(&url).await;

    assert_eq!(
        outcome,
        FetchOutcome::Success {
            body: "<html>ok</html>".to_string()
        }
    );
}

#[tokio::test]
async fn test_rate_limited_on_every_attempt_gives_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&mock_server)
        .await;

    let config = fast_config(1);
    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let outcome = fetcher(&config).fetch(&url).await;

    assert_eq!(outcome, FetchOutcome::RateLimited);
    assert!(outcome.into_body().is_none());
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("second"))
        .mount(&mock_server)
        .await;

    let config = fast_config(1);
    let url = Url::parse(&format!("{}/page2", mock_server.uri())).unwrap();
    let outcome = fetcher(&config).fetch(&url).await;

    assert_eq!(outcome.into_body().as_deref(), Some("second"));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_zero_retries_makes_single_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = fast_config(1);
    config.max_retries = 0;
    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let outcome = fetcher(&config).fetch(&url).await;

    assert_eq!(outcome, FetchOutcome::ServerError { status: 500 });
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let mut config = fast_config(1);
    config.max_retries = 1;

    // Nothing listens on the discard port
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let outcome = fetcher(&config).fetch(&url).await;

    assert!(matches!(outcome, FetchOutcome::TransportError { .. }));
}

#[tokio::test]
async fn test_user_agent_header_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let config = fast_config(1);
    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    fetcher(&config).fetch(&url).await;

    let requests = mock_server.received_requests().await.unwrap();
    let user_agent = HeaderName::from_str("user-agent").unwrap();
    let values = requests[0].headers.get(&user_agent).unwrap();

    // The header store splits values on commas
    let agent: Vec<&str> = values.iter().map(|v| v.as_str()).collect();
    assert!(agent.join(",").contains("Chrome/96"));
}

#[tokio::test]
async fn test_in_flight_never_exceeds_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    let config = fast_config(3);
    let fetcher = fetcher(&config);
    let urls: Vec<Url> = (1..=9)
        .map(|n| Url::parse(&format!("{}/page{}", mock_server.uri(), n)).unwrap())
        .collect();

    let outcomes = futures::future::join_all(urls.iter().map(|url| fetcher.fetch(url))).await;

    assert!(outcomes.iter().all(FetchOutcome::is_success));
    assert_eq!(fetcher.limiter().peak(), 3);
    assert_eq!(fetcher.limiter().in_flight(), 0);
}
