//! Integration tests for the search client and batch pipeline.
//!
//! These run against a `wiremock` server, so no API key or network access is needed.
//! The clients are blocking, so every call into them runs on `spawn_blocking`.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sheetquery::{
    BatchSearch, Config, Query, QueryTemplate, SearchClientBuilder, SearchClientTrait, SearchError,
    queries_for, sink, source,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn email_query(name: &str) -> String {
    format!("Get me the email of {}", name)
}

/// Mounts a search endpoint answering differently per entity.
async fn search_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", email_query("Acme")))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_metadata": { "status": "Success" },
            "organic_results": [
                { "position": 1, "title": "Acme Corp", "link": "acme.com", "snippet": "contact us" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", email_query("Broken")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", email_query("Slow")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "organic_results": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", email_query("Garbage")))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "text/plain"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_information": { "organic_results_state": "Fully empty" }
        })))
        .mount(&server)
        .await;

    server
}

fn search_url(server: &MockServer) -> String {
    format!("{}/search", server.uri())
}

/// Builds a client for `url`; must be called off the async runtime.
fn client_for(url: &str) -> Arc<dyn SearchClientTrait> {
    let http = reqwest::blocking::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(500))
        .build()
        .expect("failed to build http client");
    let config = Config::new(API_KEY, "unused").with_search_url(url);
    let client = SearchClientBuilder::from_config(&config)
        .http_client(http)
        .build()
        .expect("Failed to create search client");
    Arc::new(client)
}

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Decoded `q` parameters of every request the server saw, in arrival order.
async fn received_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn uploaded_csv_to_results_document() {
    let server = search_server().await;
    let url = search_url(&server);

    let document = tokio::task::spawn_blocking(move || {
        let file = csv_file("company,city\nAcme,Springfield\nGlobex,Cypress Creek\n");
        let table = source::load_file(file.path()).expect("csv should load");
        let template = QueryTemplate::for_attribute("email");
        let batch = BatchSearch::new(client_for(&url), 10);

        let report = batch.run(queries_for(&table, "company", &template).unwrap());
        sink::serialize(&report.into_rows()).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(document).unwrap(),
        "Title,Link,Snippet\r\nAcme Corp,acme.com,contact us\r\n"
    );
    assert_eq!(
        received_queries(&server).await,
        vec![email_query("Acme"), email_query("Globex")]
    );
}

#[tokio::test]
async fn request_carries_query_and_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Get me the email of Acme"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let url = search_url(&server);

    let result = tokio::task::spawn_blocking(move || {
        client_for(&url)
            .search(&Query::new("Get me the email of Acme"))
            .map(|response| response.organic_results())
    })
    .await
    .unwrap();

    assert!(matches!(result, Ok(None)));
    server.verify().await;
}

#[tokio::test]
async fn http_status_failure_is_reported() {
    let server = search_server().await;
    let url = search_url(&server);

    let result = tokio::task::spawn_blocking(move || {
        client_for(&url)
            .search(&Query::new(email_query("Broken")))
            .map(|_| ())
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(SearchError::Http { status: 500 })));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = search_server().await;
    let url = search_url(&server);

    let result = tokio::task::spawn_blocking(move || {
        client_for(&url)
            .search(&Query::new(email_query("Garbage")))
            .map(|_| ())
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(SearchError::Decode(_))));
}

#[tokio::test]
async fn failures_do_not_stop_the_batch() {
    let server = search_server().await;
    let url = search_url(&server);

    let report = tokio::task::spawn_blocking(move || {
        let batch = BatchSearch::new(client_for(&url), 10);
        let queries = ["Broken", "Slow", "Acme"].map(|name| Query::new(email_query(name)));
        batch.run(queries)
    })
    .await
    .unwrap();

    assert_eq!(received_queries(&server).await.len(), 3);
    assert_eq!(report.failures().count(), 2);
    assert!(matches!(
        report.outcomes()[0].result(),
        Err(SearchError::Http { status: 500 })
    ));
    assert!(matches!(
        report.outcomes()[1].result(),
        Err(SearchError::Timeout(_))
    ));
    assert_eq!(report.rows().len(), 1);
    assert_eq!(report.rows()[0].title(), "Acme Corp");
}

#[tokio::test]
async fn fifteen_records_issue_exactly_ten_searches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Get me the address of Company 11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(10)
        .mount(&server)
        .await;
    let url = search_url(&server);

    let report = tokio::task::spawn_blocking(move || {
        let rows: String = (1..=15).map(|i| format!("Company {}\n", i)).collect();
        let file = csv_file(&format!("company\n{}", rows));
        let table = source::load_file(file.path()).unwrap();
        let template = QueryTemplate::for_attribute("address");
        let batch = BatchSearch::from_config(client_for(&url), &Config::new(API_KEY, "unused"));

        batch.run(queries_for(&table, "company", &template).unwrap())
    })
    .await
    .unwrap();

    assert_eq!(report.queries_issued(), 10);
    assert!(report.is_truncated());
    let queries = received_queries(&server).await;
    assert_eq!(queries.len(), 10);
    assert_eq!(queries[9], "Get me the address of Company 10");
    server.verify().await;
}
