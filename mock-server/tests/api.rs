use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, EchoedRequest, ROUTES};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- api key ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/echo").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "missing x-api-key header");
}

#[tokio::test]
async fn empty_api_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/text")
                .header("x-api-key", "")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_query_headers_and_body() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/echo?context=%7B%7D&q=bolt",
            r#"{"name":"widget"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: EchoedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "PATCH");
    assert_eq!(echoed.path, "/echo");
    assert_eq!(
        echoed.query,
        vec![
            ("context".to_string(), "{}".to_string()),
            ("q".to_string(), "bolt".to_string()),
        ]
    );
    assert_eq!(echoed.headers["x-api-key"], KEY);
    assert_eq!(echoed.headers["content-type"], "application/json");
    assert_eq!(echoed.body, r#"{"name":"widget"}"#);
}

// --- status / text ---

#[tokio::test]
async fn status_route_answers_requested_code_with_json() {
    let resp = app().oneshot(request("GET", "/status/500")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app().oneshot(request("GET", "/status/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn text_route_is_plain_text() {
    let resp = app().oneshot(request("GET", "/text")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[http::header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "oops");
}

// --- records ---

#[tokio::test]
async fn list_records_empty() {
    let resp = app()
        .oneshot(request("GET", "/api/v2/model/product"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let records: Vec<Value> = body_json(resp).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn create_record_returns_201_with_id() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v2/model/product", r#"{"name":"widget"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let record: Value = body_json(resp).await;
    assert_eq!(record, json!({"id": 1, "name": "widget"}));
}

#[tokio::test]
async fn create_record_rejects_non_object() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v2/model/product", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_record_not_found() {
    let resp = app()
        .oneshot(request("GET", "/api/v2/model/product/99"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "record not found");
}

#[tokio::test]
async fn get_record_bad_id_returns_400() {
    let resp = app()
        .oneshot(request("GET", "/api/v2/model/product/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_record_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v2/model/product/99", r#"{"name":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_record_not_found() {
    let resp = app()
        .oneshot(request("DELETE", "/api/v2/model/product/99"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full record lifecycle ---

#[tokio::test]
async fn record_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v2/model/product",
            r#"{"name":"widget","qty":3}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_u64().unwrap();

    // list: one record under this model, none under another
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/api/v2/model/product"))
        .await
        .unwrap();
    let records: Vec<Value> = body_json(resp).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], id);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/api/v2/model/report"))
        .await
        .unwrap();
    let records: Vec<Value> = body_json(resp).await;
    assert!(records.is_empty());

    // update merges fields, id cannot be overwritten
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/v2/model/product/{id}"),
            r#"{"qty":5,"id":999}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated, json!({"id": id, "name": "widget", "qty": 5}));

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/api/v2/model/product/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/api/v2/model/product/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/api/v2/model/product/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- raw bodies ---

#[tokio::test]
async fn binary_route_is_not_utf8() {
    let resp = app().oneshot(request("GET", "/binary")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"\xff\xfeoops");
    assert!(std::str::from_utf8(&body).is_err());
}

#[tokio::test]
async fn large_route_pads_json_to_requested_size() {
    let resp = app().oneshot(request("GET", "/large/64")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(body.len(), 64);
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert!(parsed["name"].as_str().unwrap().chars().all(|c| c == 'a'));
}

// --- route table ---

#[tokio::test]
async fn every_listed_route_is_served() {
    for (methods, path) in ROUTES {
        let method = match methods.split(", ").next().unwrap() {
            "ANY" => "GET",
            first => first,
        };
        let uri = path
            .replace("{model}", "product")
            .replace("{id}", "1")
            .replace("{code}", "200")
            .replace("{size}", "16");

        let resp = app().oneshot(request(method, &uri)).await.unwrap();

        assert_ne!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        // the router's own fallback 404 has no body; handler 404s do
        if resp.status() == StatusCode::NOT_FOUND {
            let body: Value = body_json(resp).await;
            assert_eq!(body["error"], "record not found", "{method} {uri}");
        }
    }
}
