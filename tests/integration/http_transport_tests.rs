//! Real HTTP transport tests.
//!
//! `UreqTransport` and the integration operations against a local wiremock
//! server. The transport blocks, so calls run on tokio's blocking pool.

use pipecheck::checks::integration::{cross_origin, service_reachability, static_content};
use pipecheck::platform::http::{
    HttpRequest, HttpResponse, HttpTransport, TransportError, UreqTransport,
};
use pipecheck::CheckFailure;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn send(request: HttpRequest) -> Result<HttpResponse, TransportError> {
    tokio::task::spawn_blocking(move || UreqTransport::new().send(&request))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_returns_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hello World"})))
        .mount(&server)
        .await;

    let response = send(HttpRequest::get(format!("{}/api/", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.header("Content-Type").unwrap().contains("application/json"));
    assert_eq!(response.json().unwrap()["message"], "Hello World");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_statuses_are_responses_not_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let response = send(HttpRequest::get(format!("{}/api/", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.body, b"maintenance");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_sends_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/status"))
        .and(body_json(json!({"client_name": "test_client"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5b1f6e0e",
            "client_name": "test_client"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = send(HttpRequest::post_json(
        format!("{}/api/status", server.uri()),
        json!({"client_name": "test_client"}),
    ))
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["client_name"], "test_client");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop a server so the port is closed
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let result = send(HttpRequest::get(format!("{}/api/", uri))).await;
    assert!(matches!(result, Err(TransportError::Connect(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reachability_against_live_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hello World"})))
        .mount(&server)
        .await;

    let url = format!("{}/api/", server.uri());
    let outcome = tokio::task::spawn_blocking(move || {
        service_reachability(&UreqTransport::new(), &url, "message")
    })
    .await
    .unwrap();

    assert!(outcome.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_static_content_rejects_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "html"})))
        .mount(&server)
        .await;

    let url = format!("{}/", server.uri());
    let outcome = tokio::task::spawn_blocking(move || static_content(&UreqTransport::new(), &url))
        .await
        .unwrap();

    assert!(matches!(outcome, Err(CheckFailure::ContentTypeMismatch { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cors_preflight_sends_origin_and_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .and(path("/api/"))
        .and(header("Origin", "http://localhost:3000"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("Access-Control-Allow-Origin", "http://localhost:3000"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api/", server.uri());
    let outcome = tokio::task::spawn_blocking(move || {
        cross_origin(&UreqTransport::new(), &url, "http://localhost:3000")
    })
    .await
    .unwrap();

    assert!(outcome.is_ok(), "{:?}", outcome);
}
