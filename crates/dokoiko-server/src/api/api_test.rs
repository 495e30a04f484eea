use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_support::{app_state, UNREACHABLE_BASE_URL};

fn app(base_url: &str) -> Router {
    build_app(app_state(base_url), rate_limit_state(120))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, headers, json)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

// -------------------------------------------------------------------------
// Envelope and middleware
// -------------------------------------------------------------------------

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_upstream_keeps_upstream_status() {
    let response = ApiError::upstream("req-1", 404, "photo missing").into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_echoes_request_id() {
    let request = Request::builder()
        .uri("/api/v1/health")
        .header("x-request-id", "req-abc")
        .body(Body::empty())
        .expect("request");

    let (status, headers, json) = send(app(UNREACHABLE_BASE_URL), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-request-id"], "req-abc");
    assert_eq!(json["meta"]["request_id"], "req-abc");
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["sessions"], 0);
}

fn request_from(uri: &str, client: &str, request_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .header("x-request-id", request_id)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn api_routes_are_rate_limited_per_client_but_health_is_not() {
    let app = build_app(app_state(UNREACHABLE_BASE_URL), rate_limit_state(1));

    let (first, _, _) = send(
        app.clone(),
        request_from("/api/v1/categories", "203.0.113.1", "req-1"),
    )
    .await;
    let (second, _, json) = send(
        app.clone(),
        request_from("/api/v1/categories", "203.0.113.1", "req-2"),
    )
    .await;
    let (other_client, _, _) = send(
        app.clone(),
        request_from("/api/v1/categories", "203.0.113.2", "req-3"),
    )
    .await;
    let (health, _, _) = send(
        app,
        request_from("/api/v1/health", "203.0.113.1", "req-4"),
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
    assert_eq!(json["meta"]["request_id"], "req-2");
    assert!(json["meta"]["timestamp"].is_string());
    assert_eq!(other_client, StatusCode::OK);
    assert_eq!(health, StatusCode::OK);
}

// -------------------------------------------------------------------------
// Categories and filters
// -------------------------------------------------------------------------

#[tokio::test]
async fn categories_include_type_labels() {
    let (status, _, json) = send(app(UNREACHABLE_BASE_URL), get_request("/api/v1/categories")).await;

    assert_eq!(status, StatusCode::OK);
    let categories = json["data"].as_array().expect("data array");
    assert_eq!(categories.len(), 8);
    let gourmet = &categories[0];
    assert_eq!(gourmet["name"], "グルメ・レストラン");
    assert_eq!(gourmet["providerATypes"][0]["code"], "restaurant");
    assert_eq!(gourmet["providerATypes"][0]["label"], "レストラン");
    assert_eq!(gourmet["providerBGenres"][0], "01");
}

#[tokio::test]
async fn reconcile_prunes_filters_outside_the_category() {
    let body = json!({
        "category": "グルメ・レストラン",
        "providerATypes": ["cafe", "museum"],
        "providerBGenres": ["0101", "0201"]
    });
    let (status, _, json) = send(
        app(UNREACHABLE_BASE_URL),
        json_request(Method::POST, "/api/v1/filters/reconcile", &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["providerATypes"], json!(["cafe"]));
    assert_eq!(json["data"]["providerBGenres"], json!(["0101"]));
    assert_eq!(json["data"]["providerAChanged"], true);
    assert_eq!(json["data"]["providerBChanged"], true);
}

#[tokio::test]
async fn reconcile_with_empty_category_clears_everything() {
    let body = json!({ "providerATypes": ["cafe"] });
    let (_, _, json) = send(
        app(UNREACHABLE_BASE_URL),
        json_request(Method::POST, "/api/v1/filters/reconcile", &body),
    )
    .await;

    assert_eq!(json["data"]["providerATypes"], json!([]));
    assert_eq!(json["data"]["providerAChanged"], true);
    assert_eq!(json["data"]["providerBChanged"], false);
}

// -------------------------------------------------------------------------
// Search sessions
// -------------------------------------------------------------------------

fn google_places(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "name": format!("google-{i}"),
                "vicinity": "大阪市北区梅田",
                "geometry": { "location": { "lat": 34.70 + i as f64 * 0.001, "lng": 135.49 } },
                "types": ["cafe"]
            })
        })
        .collect()
}

fn yahoo_page(start: u32, count: u32, total: u32) -> Value {
    let features: Vec<Value> = (start..start + count)
        .map(|n| {
            json!({
                "Name": format!("yahoo-{n}"),
                "Geometry": { "Coordinates": "135.4959,34.7025" },
                "Property": { "Address": "大阪府大阪市北区" }
            })
        })
        .collect();
    json!({
        "ResultInfo": { "Count": count, "Total": total, "Start": start },
        "Feature": features
    })
}

async fn mount_search_providers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "梅田"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": 34.7025, "lng": 135.4959 } } }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": google_places(3)
        })))
        .expect(1)
        .mount(server)
        .await;
    for (start, count) in [(1, 20), (21, 10)] {
        Mock::given(method("GET"))
            .and(path("/yahoo/search/local/V1/localSearch"))
            .and(query_param("start", start.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(yahoo_page(start, count, 30)))
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn search_then_load_more_then_view() {
    let server = MockServer::start().await;
    mount_search_providers(&server).await;
    let app = app(&server.uri());

    let (status, _, json) = send(
        app.clone(),
        json_request(Method::POST, "/api/v1/search", &json!({ "address": "梅田" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["phase"], "ready");
    assert_eq!(data["results"].as_array().map(Vec::len), Some(23));
    assert_eq!(data["markers"].as_array().map(Vec::len), Some(23));
    assert_eq!(data["hasMore"], true);
    assert_eq!(data["origin"]["lat"], 34.7025);
    assert_eq!(data["status"]["providerA"]["state"], "ok");
    assert_eq!(data["status"]["providerA"]["count"], 3);
    let session_id = data["sessionId"].as_str().expect("session id").to_owned();

    let (status, _, json) = send(
        app.clone(),
        json_request(
            Method::POST,
            &format!("/api/v1/search/{session_id}/more"),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["sessionId"], session_id);
    assert_eq!(json["data"]["results"].as_array().map(Vec::len), Some(33));
    assert_eq!(json["data"]["hasMore"], false);
    assert_eq!(json["data"]["status"]["providerA"]["state"], "skipped");

    let (status, _, json) = send(app, get_request(&format!("/api/v1/search/{session_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["results"].as_array().map(Vec::len), Some(33));
}

#[tokio::test]
async fn search_rejects_invalid_input_before_any_provider_call() {
    let body = json!({ "address": "  ", "radius": 10 });
    let (status, _, json) = send(
        app(UNREACHABLE_BASE_URL),
        json_request(Method::POST, "/api/v1/search", &body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    let message = json["error"]["message"].as_str().expect("message");
    assert!(message.contains("address"));
    assert!(message.contains("radius"));
}

#[tokio::test]
async fn unknown_address_reports_not_found_and_blocks_load_more() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let (status, _, json) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/search",
            &json!({ "address": "どこにもない" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["phase"], "idle");
    assert_eq!(json["data"]["status"]["addressNotFound"], true);
    assert_eq!(json["data"]["results"], json!([]));
    let session_id = json["data"]["sessionId"].as_str().expect("session id").to_owned();

    let (status, _, json) = send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/search/{session_id}/more"),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");
}

#[tokio::test]
async fn unknown_sessions_are_not_found() {
    let app = app(UNREACHABLE_BASE_URL);

    let (status, _, json) = send(
        app.clone(),
        get_request("/api/v1/search/6f1c1a52-8a8e-4c7e-9a43-0d3c1f7b2a11"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");

    let (status, _, _) = send(
        app,
        json_request(Method::POST, "/api/v1/search/not-a-uuid/more", &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -------------------------------------------------------------------------
// Photo proxy
// -------------------------------------------------------------------------

#[tokio::test]
async fn photo_requires_a_reference() {
    let (status, _, json) = send(app(UNREACHABLE_BASE_URL), get_request("/api/v1/photo")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");

    let (status, _, _) = send(
        app(UNREACHABLE_BASE_URL),
        get_request("/api/v1/photo?photoReference="),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn photo_returns_data_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/photo"))
        .and(query_param("photoreference", "ref-1"))
        .and(query_param("maxwidth", "400"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"png-bytes".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let (status, _, json) = send(
        app(&server.uri()),
        get_request("/api/v1/photo?photoReference=ref-1"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["contentType"], "image/png");
    assert_eq!(json["data"]["imageData"], "data:image/png;base64,cG5nLWJ5dGVz");
}

#[tokio::test]
async fn photo_passes_through_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/photo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, _, json) = send(
        app(&server.uri()),
        get_request("/api/v1/photo?photoReference=missing"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "upstream_error");
}

// -------------------------------------------------------------------------
// Favorites cookie
// -------------------------------------------------------------------------

fn search_result(name: &str) -> Value {
    json!({
        "name": name,
        "latitude": 34.7,
        "longitude": 135.5,
        "sourceProvider": "google",
        "fetchedAtEpochMillis": 1,
        "position": [34.7, 135.5]
    })
}

fn cookie_pair(headers: &HeaderMap) -> String {
    let set_cookie = headers[header::SET_COOKIE].to_str().expect("ascii cookie");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_owned()
}

#[tokio::test]
async fn favorites_round_trip_through_the_cookie() {
    let app = app(UNREACHABLE_BASE_URL);

    let (status, headers, json) = send(
        app.clone(),
        json_request(Method::POST, "/api/v1/favorites", &search_result("Cafe")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["favorites"][0]["id"], "google_Cafe_34.7_135.5");
    let set_cookie = headers[header::SET_COOKIE].to_str().expect("ascii cookie");
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Expires="));
    let cookie = cookie_pair(&headers);
    assert!(cookie.starts_with("dokoiko_favorites="));

    let request = Request::builder()
        .uri("/api/v1/favorites")
        .header(header::COOKIE, format!("theme=dark; {cookie}"))
        .body(Body::empty())
        .expect("request");
    let (status, headers, json) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert_eq!(json["data"]["favorites"][0]["name"], "Cafe");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/v1/favorites?id=google_Cafe_34.7_135.5")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request");
    let (status, _, json) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 0);
}

#[tokio::test]
async fn toggle_adds_then_removes() {
    let app = app(UNREACHABLE_BASE_URL);

    let (_, headers, json) = send(
        app.clone(),
        json_request(Method::POST, "/api/v1/favorites/toggle", &search_result("Bar")),
    )
    .await;
    assert_eq!(json["data"]["favorited"], true);
    assert_eq!(json["data"]["count"], 1);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/favorites/toggle")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie_pair(&headers))
        .body(Body::from(search_result("Bar").to_string()))
        .expect("request");
    let (_, _, json) = send(app, request).await;
    assert_eq!(json["data"]["favorited"], false);
    assert_eq!(json["data"]["count"], 0);
}

#[tokio::test]
async fn removing_an_absent_favorite_is_not_found() {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/v1/favorites?id=nope")
        .header(header::COOKIE, "dokoiko_favorites=%7Bgarbage")
        .body(Body::empty())
        .expect("request");
    let (status, _, _) = send(app(UNREACHABLE_BASE_URL), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
