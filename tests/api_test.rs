//! Integration tests for the course API router

mod common;

use axum::http::{header, StatusCode};
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

use common::{demo_router, json_body, request};
use minicourse::courses::{CourseServer, ServerConfig};

#[tokio::test]
async fn test_home_page() {
    let (router, _) = demo_router();
    let response = router.oneshot(request("GET", "/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>Welcome to the Course API</h1>");
}

#[tokio::test]
async fn test_list_demo_courses() {
    let (router, _) = demo_router();
    let response = router.oneshot(request("GET", "/courses", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let courses = body.as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["courseid"], "2");
    assert_eq!(courses[0]["coursename"], "ProtoBuf");
    assert_eq!(courses[1]["author"]["fullname"], "Sam");
}

#[tokio::test]
async fn test_get_one_course() {
    let (router, _) = demo_router();

    let response = router
        .clone()
        .oneshot(request("GET", "/course/4", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["coursename"], "gRPC");
    assert_eq!(body["courseprice"], 240);

    let response = router
        .oneshot(request("GET", "/course/77", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!("No course found for CourseId: 77"));
}

#[tokio::test]
async fn test_create_then_fetch_by_returned_id() {
    let (router, store) = demo_router();
    let payload = r#"{"coursename":"Rust","courseprice":300,"author":{"fullname":"Ferris","website":"rust-lang.org"}}"#;

    let response = router
        .clone()
        .oneshot(request("POST", "/course", Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        json_body(response).await,
        json!("Course: Rust has been created")
    );

    let response = router.oneshot(request("GET", &location, None)).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["coursename"], "Rust");
    assert_eq!(body["courseprice"], 300);
    assert_eq!(body["author"]["website"], "rust-lang.org");
    assert_eq!(format!("/course/{}", body["courseid"].as_str().unwrap()), location);
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn test_create_rejections() {
    let (router, store) = demo_router();

    let cases = [
        (None, "No data sent"),
        (Some("{}"), "Data is empty"),
        (Some("{not json"), "Data is empty"),
        (Some(r#"{"coursename":"gRPC"}"#), "This course already exists"),
    ];

    for (body, expected) in cases {
        let response = router
            .clone()
            .oneshot(request("POST", "/course", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!(expected), "body: {body:?}");
    }

    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_update_preserves_id() {
    let (router, store) = demo_router();

    let response = router
        .clone()
        .oneshot(request(
            "PUT",
            "/course/2",
            Some(r#"{"courseid":"999","coursename":"ProtoBuf 3","courseprice":160}"#),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!("Course has been updated"));

    let updated = store.get("2").await.unwrap();
    assert_eq!(updated.course_name, "ProtoBuf 3");
    assert_eq!(updated.course_price, 160);
    assert!(store.get("999").await.is_none());

    let response = router
        .oneshot(request("PUT", "/course/nope", Some(r#"{"coursename":"x"}"#)))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!("Course does not exist"));
}

#[tokio::test]
async fn test_delete_then_fetch() {
    let (router, _) = demo_router();

    let response = router
        .clone()
        .oneshot(request("DELETE", "/course/2", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!("Course id: 2 has been deleted"));

    let response = router
        .clone()
        .oneshot(request("GET", "/course/2", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!("No course found for CourseId: 2"));

    let response = router
        .oneshot(request("DELETE", "/course/2", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!("Course does not exist"));
}

#[tokio::test]
async fn test_delete_all() {
    let (router, store) = demo_router();

    let response = router
        .clone()
        .oneshot(request("DELETE", "/courses", None))
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await,
        json!("All the courses have been deleted")
    );
    assert!(store.is_empty().await);

    let response = router.oneshot(request("GET", "/courses", None)).await.unwrap();
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_serve_over_tcp_with_shutdown() {
    let config = ServerConfig::builder()
        .enable_request_logging(false)
        .build()
        .unwrap();
    let server = CourseServer::new(config).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let client = reqwest::Client::new();
    let courses: serde_json::Value = client
        .get(format!("http://{addr}/courses"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(courses.as_array().unwrap().len(), 2);

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}
