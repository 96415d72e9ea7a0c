//! Integration tests for single-page and full paginated listings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert2::{check, let_assert};
use redmine_api::{
    ClientConfig, DirectObjectsSearcher, Identifiable, JsonPageParser, Page, Params, RawResponse,
    RequestParams, Transport,
};
use serde::Deserialize;
use wiremock::{
    Mock, MockServer, Request, Respond, ResponseTemplate,
    matchers::{method, path, query_param},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Issue {
    id: u64,
    subject: String,
}

impl Identifiable for Issue {
    type Id = u64;

    fn identity(&self) -> Option<u64> {
        Some(self.id)
    }
}

/// Serves `total` issues, sliced by the request's `offset` and `limit`.
struct Slices {
    total: usize,
    server_cap: usize,
    /// Shifts every page after the first back by this many elements.
    overlap: usize,
    with_total: bool,
}

impl Slices {
    fn new(total: usize) -> Self {
        Self {
            total,
            server_cap: 100,
            overlap: 0,
            with_total: true,
        }
    }
}

fn query_usize(request: &Request, name: &str) -> Option<usize> {
    request
        .url
        .query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.parse().ok())
}

impl Respond for Slices {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let limit = query_usize(request, "limit").unwrap_or(25).min(self.server_cap);
        let offset = query_usize(request, "offset").unwrap_or(0);
        let start = if offset > 0 {
            offset.saturating_sub(self.overlap)
        } else {
            0
        };
        let end = (start + limit).min(self.total);
        let issues: Vec<_> = (start..end)
            .map(|i| serde_json::json!({"id": i + 1, "subject": format!("issue {}", i + 1)}))
            .collect();

        let mut body = serde_json::json!({
            "issues": issues,
            "offset": offset,
            "limit": limit,
        });
        if self.with_total {
            body["total_count"] = serde_json::json!(self.total);
        }
        ResponseTemplate::new(200).set_body_json(body)
    }
}

async fn mount(server: &MockServer, slices: Slices) {
    Mock::given(method("GET"))
        .and(path("/issues.json"))
        .respond_with(slices)
        .mount(server)
        .await;
}

fn transport(server: &MockServer, page_size: usize) -> Transport {
    Transport::builder(server.uri())
        .config(ClientConfig::builder().objects_per_page(page_size).build())
        .build()
        .expect("transport")
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.expect("recording enabled").len()
}

fn parser() -> JsonPageParser<Issue> {
    JsonPageParser::new("issues")
}

#[tokio::test]
async fn test_full_listing_walks_every_page() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(27)).await;

    let results = transport(&server, 10)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    check!(request_count(&server).await == 3);
    check!(results.results_number() == 27);
    check!(results.total_count() == 27);
    check!(results.offset_on_server() == Some(0));
    check!(results.limit_on_server() == Some(10));
    let ids: Vec<u64> = results.results().iter().map(|issue| issue.id).collect();
    check!(ids == (1..=27).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_full_listing_sends_advancing_offsets() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(27)).await;

    transport(&server, 10)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    let offsets: Vec<Option<usize>> = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .map(|request| query_usize(request, "offset"))
        .collect();
    check!(offsets == vec![Some(0), Some(10), Some(20)]);
}

#[tokio::test]
async fn test_exact_multiple_stops_on_total() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(20)).await;

    let results = transport(&server, 10)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    check!(request_count(&server).await == 2);
    check!(results.results_number() == 20);
}

#[tokio::test]
async fn test_empty_listing() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(0)).await;

    let results = transport(&server, 10)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    check!(request_count(&server).await == 1);
    check!(!results.has_some_results());
    check!(results.total_count() == 0);
}

#[tokio::test]
async fn test_server_capped_page_size() {
    let server = MockServer::start().await;
    let mut slices = Slices::new(27);
    slices.server_cap = 5;
    mount(&server, slices).await;

    let results = transport(&server, 10)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    check!(request_count(&server).await == 6);
    check!(results.results_number() == 27);
}

#[tokio::test]
async fn test_overlapping_pages_are_deduplicated() {
    let server = MockServer::start().await;
    let mut slices = Slices::new(12);
    slices.overlap = 2;
    mount(&server, slices).await;

    let results = transport(&server, 5)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    let ids: Vec<u64> = results.results().iter().map(|issue| issue.id).collect();
    check!(ids == (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_missing_total_stops_after_one_page() {
    let server = MockServer::start().await;
    let mut slices = Slices::new(27);
    slices.with_total = false;
    mount(&server, slices).await;

    let results = transport(&server, 10)
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    check!(request_count(&server).await == 1);
    check!(results.results_number() == 10);
    check!(results.total_count() == 10);
}

#[tokio::test]
async fn test_page_limit_fails_listing() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(27)).await;

    let transport = Transport::builder(server.uri())
        .config(
            ClientConfig::builder()
                .objects_per_page(10)
                .max_pages(2)
                .build(),
        )
        .build()
        .expect("transport");
    let_assert!(
        Err(err) = transport
            .get_objects_list("issues.json", &RequestParams::new(), &parser())
            .await
    );

    check!(err.is_internal());
    check!(err.to_string().contains("2 pages"));
    check!(request_count(&server).await == 2);
}

#[tokio::test]
async fn test_page_limit_reached_exactly_succeeds() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(20)).await;

    let transport = Transport::builder(server.uri())
        .config(
            ClientConfig::builder()
                .objects_per_page(10)
                .max_pages(2)
                .build(),
        )
        .build()
        .expect("transport");
    let results = transport
        .get_objects_list("issues.json", &RequestParams::new(), &parser())
        .await
        .expect("listing");

    check!(results.results_number() == 20);
}

#[tokio::test]
async fn test_limit_or_offset_rejected_before_sending() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(27)).await;
    let transport = transport(&server, 10);

    for name in ["limit", "offset"] {
        let params = Params::new().add(name, "3").build().expect("params");
        let_assert!(
            Err(err) = transport
                .get_objects_list("issues.json", &params, &parser())
                .await
        );
        check!(err.is_internal());
        check!(err.to_string().contains(name));
    }
    check!(request_count(&server).await == 0);
}

#[tokio::test]
async fn test_no_paging_sends_caller_window_once() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(27)).await;

    let params = Params::new()
        .add("limit", "3")
        .add("offset", "0")
        .build()
        .expect("params");
    let results = transport(&server, 10)
        .get_objects_list_no_paging("issues.json", &params, &parser())
        .await
        .expect("page");

    check!(request_count(&server).await == 1);
    check!(results.results_number() == 3);
    check!(results.total_count() == 27);
    check!(results.limit_on_server() == Some(3));
}

#[tokio::test]
async fn test_failing_page_aborts_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/issues.json"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount(&server, Slices::new(27)).await;

    let_assert!(
        Err(err) = transport(&server, 10)
            .get_objects_list("issues.json", &RequestParams::new(), &parser())
            .await
    );
    check!(err.is_transport());
    check!(request_count(&server).await == 2);
}

#[tokio::test]
async fn test_malformed_page_is_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/issues.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "issues": [{"id": 1, "subject": "ok"}, {"id": "two", "subject": "bad"}],
            "total_count": 2,
        })))
        .mount(&server)
        .await;

    let_assert!(
        Err(err) = transport(&server, 10)
            .get_objects_list("issues.json", &RequestParams::new(), &parser())
            .await
    );
    check!(err.is_format());
    check!(err.to_string().contains("issues[1].id"));
}

#[tokio::test]
async fn test_repeated_filter_values_are_all_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/issues.json"))
        .and(query_param("project_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "issues": [], "total_count": 0,
        })))
        .mount(&server)
        .await;

    let params = Params::new()
        .add("f[]", "status_id")
        .add("f[]", "tracker_id")
        .add("project_id", "7")
        .build()
        .expect("params");
    transport(&server, 10)
        .get_objects_list("issues.json", &params, &parser())
        .await
        .expect("listing");

    let requests = server.received_requests().await.expect("recording enabled");
    let_assert!([request] = requests.as_slice());
    let filters: Vec<String> = request
        .url
        .query_pairs()
        .filter(|(key, _)| key == "f[]")
        .map(|(_, value)| value.into_owned())
        .collect();
    check!(filters == vec!["status_id".to_string(), "tracker_id".to_string()]);
}

#[tokio::test]
async fn test_direct_searcher_rejects_missing_value() {
    let server = MockServer::start().await;
    mount(&server, Slices::new(5)).await;
    let transport = transport(&server, 10);

    let_assert!(
        Err(err) = DirectObjectsSearcher::get_objects_list_no_paging(
            &transport,
            [("project_id", Some("1")), ("status_id", None)],
            "issues.json",
            &parser(),
        )
        .await
    );
    check!(err.is_internal());
    check!(request_count(&server).await == 0);

    let results = DirectObjectsSearcher::get_objects_list_no_paging(
        &transport,
        [("project_id", Some("1"))],
        "issues.json",
        &parser(),
    )
    .await
    .expect("page");
    check!(results.results_number() == 5);
}

#[tokio::test]
async fn test_closure_page_parser() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ids.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1,2,3"))
        .mount(&server)
        .await;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let parser = move |response: &RawResponse| -> redmine_api::Result<Page<String>> {
        counter.fetch_add(1, Ordering::SeqCst);
        let items = response
            .text()?
            .split(',')
            .map(str::to_owned)
            .collect::<Vec<_>>();
        Ok(Page::new(items))
    };
    let results = transport(&server, 10)
        .get_objects_list_no_paging("ids.txt", &RequestParams::new(), &parser)
        .await
        .expect("page");

    check!(results.into_results() == vec!["1", "2", "3"]);
    check!(calls.load(Ordering::SeqCst) == 1);
}
