//! Common test utilities

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use std::sync::Arc;

use minicourse::courses::{Course, CourseServer, CourseStore, IdGenerator, ServerConfig};

/// URL of a local port nothing listens on
#[allow(dead_code)]
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/")
}

/// Router over a store holding the demo catalog, with deterministic ids
#[allow(dead_code)]
pub fn demo_router() -> (Router, Arc<CourseStore>) {
    let store = Arc::new(CourseStore::with_generator(
        IdGenerator::from_seed(42),
        Course::demo_catalog(),
    ));
    let config = ServerConfig::builder()
        .enable_request_logging(false)
        .build()
        .expect("valid config");
    let server = CourseServer::with_store(config, Arc::clone(&store)).expect("server");
    (server.build_router(), store)
}

/// Build a request with an optional JSON body
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Collect a response body as JSON
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
