/// End-to-end tests driving the full router over the in-memory item store
/// and a temporary cache directory.
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use inventory_service::{
    config::{ItemStoreConfig, ServerConfig},
    context::AppContext,
    server::build_router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

async fn test_app() -> (Router, TempDir) {
    let cache = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 3000,
        cache_dir: cache.path().to_path_buf(),
        item_store: ItemStoreConfig::Memory,
    };
    let ctx = AppContext::new(config).await.unwrap();
    (build_router(ctx), cache)
}

/// Build a multipart/form-data body with text fields and an optional file part
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, method: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, name: Option<&str>, description: &str, file: Option<(&str, &[u8])>) -> axum::response::Response {
    let mut fields = vec![("description", description)];
    if let Some(name) = name {
        fields.insert(0, ("inventory_name", name));
    }
    let body = multipart_body(&fields, file);
    app.clone()
        .oneshot(multipart_request("/register", "POST", body))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_without_name_is_400() {
    let (app, _cache) = test_app().await;

    let response = register(&app, None, "18V", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "no inventory_name");
}

#[tokio::test]
async fn test_register_list_get_roundtrip() {
    let (app, _cache) = test_app().await;

    let response = register(&app, Some("Drill"), "18V", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = json_body(response).await;
    assert_eq!(item["id"], 1);
    assert_eq!(item["inventory_name"], "Drill");
    assert_eq!(item["description"], "18V");
    assert_eq!(item["photofile"], Value::Null);

    register(&app, Some("Saw"), "", None).await;

    let response = app.clone().oneshot(get("/inventory")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let items = json_body(response).await;
    let ids: Vec<i64> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let response = app.clone().oneshot(get("/inventory/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["inventory_name"], "Saw");

    let response = app.clone().oneshot(get("/inventory/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_metadata_is_partial() {
    let (app, _cache) = test_app().await;
    register(&app, Some("Drill"), "18V", None).await;

    let request = Request::builder()
        .method("PUT")
        .uri("/inventory/1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"description":"20V"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let item = json_body(response).await;
    assert_eq!(item["inventory_name"], "Drill");
    assert_eq!(item["description"], "20V");

    let request = Request::builder()
        .method("PUT")
        .uri("/inventory/42")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"inventory_name":"x"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_lifecycle_drill_scenario() {
    let (app, cache) = test_app().await;

    // register {name:"Drill", description:"18V"} with no photo
    let response = register(&app, Some("Drill"), "18V", None).await;
    let item = json_body(response).await;
    assert_eq!(item["id"], 1);
    assert_eq!(item["photofile"], Value::Null);

    // no photo yet
    let response = app.clone().oneshot(get("/inventory/1/photo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // PUT /inventory/1/photo with a.png
    let body = multipart_body(&[], Some(("a.png", b"png bytes")));
    let response = app
        .clone()
        .oneshot(multipart_request("/inventory/1/photo", "PUT", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let item = json_body(response).await;
    let reference = item["photofile"].as_str().unwrap().to_string();
    assert!(reference.ends_with("_a.png"));

    // photo is served back with a guessed content type
    let response = app.clone().oneshot(get("/inventory/1/photo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "image/png"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"png bytes");

    // DELETE /inventory/1 removes the record and the blob
    let request = Request::builder()
        .method("DELETE")
        .uri("/inventory/1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Deleted");

    assert!(!cache.path().join(&reference).exists());
    let response = app.clone().oneshot(get("/inventory/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_replace_photo_twice_keeps_single_blob() {
    let (app, cache) = test_app().await;
    register(&app, Some("Drill"), "", Some(("a.png", b"one"))).await;

    for (name, data) in [("b.png", b"two".as_slice()), ("c.png", b"three".as_slice())] {
        let body = multipart_body(&[], Some((name, data)));
        let response = app
            .clone()
            .oneshot(multipart_request("/inventory/1/photo", "PUT", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // the original and the first replacement are gone
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_replace_photo_missing_item_is_404_and_clean() {
    let (app, cache) = test_app().await;

    let body = multipart_body(&[], Some(("a.png", b"bytes")));
    let response = app
        .clone()
        .oneshot(multipart_request("/inventory/7/photo", "PUT", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_replace_photo_without_file_is_400() {
    let (app, _cache) = test_app().await;
    register(&app, Some("Drill"), "", None).await;

    let body = multipart_body(&[("inventory_name", "ignored")], None);
    let response = app
        .clone()
        .oneshot(multipart_request("/inventory/1/photo", "PUT", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_get() {
    let (app, _cache) = test_app().await;
    register(&app, Some("Drill"), "", None).await;
    register(&app, Some("Saw"), "", Some(("s.png", b"x"))).await;

    // missing id
    let response = app.clone().oneshot(get("/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "no id");

    // unknown id
    let response = app.clone().oneshot(get("/search?id=99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // photo requested and present
    let response = app
        .clone()
        .oneshot(get("/search?id=2&includePhoto=on"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["photo_url"], "/inventory/2/photo");

    // photo requested but absent: no photo_url field at all
    let response = app
        .clone()
        .oneshot(get("/search?id=1&includePhoto=on"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body.get("photo_url").is_none());

    // photo present but not requested
    let response = app.clone().oneshot(get("/search?id=2")).await.unwrap();
    let body = json_body(response).await;
    assert!(body.get("photo_url").is_none());
}

#[tokio::test]
async fn test_search_post_form() {
    let (app, _cache) = test_app().await;
    register(&app, Some("Saw"), "", Some(("s.png", b"x"))).await;

    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("id=1&includePhoto=on"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["inventory_name"], "Saw");
    assert_eq!(body["photo_url"], "/inventory/1/photo");

    // the form checkbox is only truthy as the literal "on"
    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("id=1&includePhoto=yes"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let body = json_body(response).await;
    assert!(body.get("photo_url").is_none());
}

#[tokio::test]
async fn test_unmatched_route_is_405() {
    let (app, _cache) = test_app().await;

    let response = app.clone().oneshot(get("/no/such/route")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(response).await["error"], "Method not allowed");
}

#[tokio::test]
async fn test_unmatched_method_on_known_path_is_405_with_body() {
    let (app, _cache) = test_app().await;
    register(&app, Some("Drill"), "", None).await;

    // the path exists, the method does not
    for (method, uri) in [("POST", "/inventory/1"), ("GET", "/register"), ("DELETE", "/search")] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_body(response).await["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_form_pages_served() {
    let (app, _cache) = test_app().await;

    for uri in ["/RegisterForm.html", "/SearchForm.html"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
