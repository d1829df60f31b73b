use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use event_sink_server::{
    clock::FixedClock,
    create_app,
    server::{EventSinkServer, ServerConfig},
    types::{EventCategory, REQUIRED_FIELDS},
};

const EVENT_ID: &str = "b5b046a2-80cc-474f-b945-aff681a57c35";
const TODAY_TOKEN: &str = "FAKE_JWT_TOKEN_2023-07-27";

/// Test configuration with the calendar pinned to 2023-07-27
struct TestConfig {
    app: Router,
}

impl TestConfig {
    fn new() -> Self {
        let clock = FixedClock::from_ymd(2023, 7, 27).expect("valid date");
        let server = EventSinkServer::with_clock(ServerConfig::default(), Arc::new(clock));

        Self {
            app: create_app(server),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);

        (status, headers, value)
    }

    async fn post_with_key(&self, id: &str, payload: &Value) -> (StatusCode, HeaderMap, Value) {
        let request = Request::builder()
            .uri(format!("/events/key/v1/{id}"))
            .method(Method::POST)
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Api-Key", "FAKE_API_KEY")
            .body(Body::from(payload.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn post_with_token(&self, id: &str, token: Option<&str>, payload: &Value) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder()
            .uri(format!("/events/jwt/v1/{id}"))
            .method(Method::POST)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }

        self.send(builder.body(Body::from(payload.to_string())).unwrap()).await
    }
}

fn valid_event() -> Value {
    json!({
        "eventId": EVENT_ID,
        "timestamp": "2023-07-27T11:44:00.655Z",
        "eventName": "test_event_parsed",
        "eventCategory": "system_outcome_event",
        "eventSource": "MiniDigitalSdk.Test",
        "entityId": "1234",
        "entityType": "test_event",
        "action": "parsed",
        "trackingId": "82d21361-ce5a-4ce0-bdc8-a32a29341e76",
        "primaryIdentifier": "82d21361-ce5a-4ce0-bdc8-a32a29341e76",
        "additionalIdentifiers": {},
        "anonymousUser": "1",
        "sdkVersion": "MiniDigitalEventSink.Test",
        "schemaVersion": "1.0.0"
    })
}

fn event_with(field: &str, value: Value) -> Value {
    let mut event = valid_event();
    event[field] = value;
    event
}

fn message(text: &str) -> Value {
    json!({ "message": text })
}

#[tokio::test]
async fn test_valid_event_with_api_key() {
    let config = TestConfig::new();

    let (status, _, body) = config.post_with_key(EVENT_ID, &valid_event()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, message("ok"));
}

#[tokio::test]
async fn test_minimal_event_with_api_key() {
    let config = TestConfig::new();
    let event = json!({
        "eventId": "E1",
        "eventName": "n",
        "eventCategory": "content_event",
        "timestamp": "2023-07-27T11:44:00.655Z",
        "eventSource": "s",
        "trackingId": "t",
        "primaryIdentifier": "p",
        "userId": "p",
        "anonymousUser": "0",
        "sdkVersion": "v",
        "schemaVersion": "1.0.0"
    });

    let request = Request::builder()
        .uri("/events/key/v1/E1")
        .method(Method::POST)
        .header("X-Api-Key", "k")
        .body(Body::from(event.to_string()))
        .unwrap();
    let (status, _, body) = config.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, message("ok"));
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let config = TestConfig::new();

    let request = Request::builder()
        .uri(format!("/events/key/v1/{EVENT_ID}"))
        .method(Method::POST)
        .body(Body::from(valid_event().to_string()))
        .unwrap();
    let (status, headers, body) = config.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, message("X-Api-Key is missing from the request."));
    assert!(headers.get(header::AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_empty_api_key_is_unauthorized() {
    let config = TestConfig::new();

    let request = Request::builder()
        .uri(format!("/events/key/v1/{EVENT_ID}"))
        .method(Method::POST)
        .header("X-Api-Key", "")
        .body(Body::from(valid_event().to_string()))
        .unwrap();
    let (status, _, _) = config.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authentication_runs_before_validation() {
    let config = TestConfig::new();

    let request = Request::builder()
        .uri(format!("/events/key/v1/{EVENT_ID}"))
        .method(Method::POST)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = config.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, headers, _) = config.post_with_token(EVENT_ID, None, &json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), TODAY_TOKEN);
}

#[tokio::test]
async fn test_bearer_challenge_then_retry() {
    let config = TestConfig::new();

    let (status, headers, body) = config.post_with_token(EVENT_ID, None, &valid_event()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, message("Unauthorized"));
    assert_eq!(
        headers.get("Access-Control-Expose-Headers").unwrap(),
        "Authorization"
    );
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert_eq!(token, TODAY_TOKEN);

    let (status, _, body) = config.post_with_token(EVENT_ID, Some(&token), &valid_event()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, message("ok"));
}

#[tokio::test]
async fn test_stale_or_decorated_token_is_rejected() {
    let config = TestConfig::new();

    for token in [
        "FAKE_JWT_TOKEN_2023-07-26",
        "Bearer FAKE_JWT_TOKEN_2023-07-27",
        "fake_jwt_token_2023-07-27",
        "somethingDifferent",
    ] {
        let (status, headers, _) = config.post_with_token(EVENT_ID, Some(token), &valid_event()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{token} should be rejected");
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), TODAY_TOKEN);
    }
}

#[tokio::test]
async fn test_bearer_route_validates_payload() {
    let config = TestConfig::new();
    let event = event_with("schemaVersion", json!("2.0.0"));

    let (status, _, body) = config.post_with_token(EVENT_ID, Some(TODAY_TOKEN), &event).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, message("The provided schema version is not supported."));
}

#[tokio::test]
async fn test_each_missing_required_field() {
    let config = TestConfig::new();

    for field in REQUIRED_FIELDS {
        let mut event = valid_event();
        event.as_object_mut().unwrap().remove(field);

        let expected = message(&format!("Event must have the {field} field provided."));

        let (status, _, body) = config.post_with_key(EVENT_ID, &event).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field} via api key");
        assert_eq!(body, expected);

        let (status, headers, body) = config.post_with_token(EVENT_ID, Some(TODAY_TOKEN), &event).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field} via bearer token");
        assert_eq!(body, expected);
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }
}

#[tokio::test]
async fn test_undecodable_event_id() {
    let config = TestConfig::new();

    // without credentials the request is rejected before the id is read
    let request = Request::builder()
        .uri("/events/key/v1/%FF")
        .method(Method::POST)
        .body(Body::from(valid_event().to_string()))
        .unwrap();
    let (status, _, body) = config.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, message("X-Api-Key is missing from the request."));

    let (status, headers, _) = config.post_with_token("%FF", None, &valid_event()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), TODAY_TOKEN);

    let request = Request::builder()
        .uri("/events/key/v1/%FF")
        .method(Method::POST)
        .header("X-Api-Key", "FAKE_API_KEY")
        .body(Body::from(valid_event().to_string()))
        .unwrap();
    let (status, headers, body) = config.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid URL"));
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
}

#[tokio::test]
async fn test_oversized_body() {
    let config = TestConfig::new();
    let oversized = vec![b' '; 3 * 1024 * 1024];

    let request = Request::builder()
        .uri(format!("/events/key/v1/{EVENT_ID}"))
        .method(Method::POST)
        .header("X-Api-Key", "FAKE_API_KEY")
        .body(Body::from(oversized.clone()))
        .unwrap();
    let (status, headers, body) = config.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Failed to buffer the request body"));
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");

    // credentials are still checked first
    let request = Request::builder()
        .uri(format!("/events/jwt/v1/{EVENT_ID}"))
        .method(Method::POST)
        .body(Body::from(oversized))
        .unwrap();
    let (status, headers, body) = config.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, message("Unauthorized"));
    assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), TODAY_TOKEN);
}

#[tokio::test]
async fn test_event_id_mismatch() {
    let config = TestConfig::new();

    let (status, _, body) = config.post_with_key("somethingDifferent", &valid_event()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        message("The event ID in the payload must match the one in the request.")
    );
}

#[tokio::test]
async fn test_field_rules() {
    let config = TestConfig::new();

    let cases = [
        ("eventCategory", "somethingDifferent", "Event category is not valid."),
        ("anonymousUser", "somethingDifferent", "Anonymous user needs to be either 0 or 1."),
        ("schemaVersion", "somethingDifferent", "The provided schema version is not supported."),
        ("timestamp", "somethingDifferent", "The timestamp should be in ISO 8601 format."),
    ];

    for (field, value, expected) in cases {
        let (status, _, body) = config.post_with_key(EVENT_ID, &event_with(field, json!(value))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        assert_eq!(body, message(expected));
    }
}

#[tokio::test]
async fn test_all_categories_accepted() {
    let config = TestConfig::new();

    for category in EventCategory::ALL {
        let event = event_with("eventCategory", json!(category.as_str()));
        let (status, _, _) = config.post_with_key(EVENT_ID, &event).await;
        assert_eq!(status, StatusCode::OK, "{category}");
    }
}

#[tokio::test]
async fn test_empty_and_malformed_bodies() {
    let config = TestConfig::new();

    for body in ["", "{}", "null"] {
        let request = Request::builder()
            .uri(format!("/events/key/v1/{EVENT_ID}"))
            .method(Method::POST)
            .header("X-Api-Key", "FAKE_API_KEY")
            .body(Body::from(body))
            .unwrap();
        let (status, _, response) = config.send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, message("Event payload must be provided."));
    }

    let request = Request::builder()
        .uri(format!("/events/key/v1/{EVENT_ID}"))
        .method(Method::POST)
        .header("X-Api-Key", "FAKE_API_KEY")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, response) = config.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let config = TestConfig::new();

    for path in [
        format!("/events/key/v1/{EVENT_ID}"),
        format!("/events/jwt/v1/{EVENT_ID}"),
    ] {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            // credentials make no difference
            let request = Request::builder()
                .uri(&path)
                .method(method.clone())
                .header("X-Api-Key", "FAKE_API_KEY")
                .header(header::AUTHORIZATION, TODAY_TOKEN)
                .body(Body::from(valid_event().to_string()))
                .unwrap();
            let (status, headers, body) = config.send(request).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {path}");
            assert_eq!(body, message("Method Not Allowed"));
            assert!(headers.get(header::AUTHORIZATION).is_none());

            let request = Request::builder()
                .uri(&path)
                .method(method.clone())
                .body(Body::empty())
                .unwrap();
            let (status, _, _) = config.send(request).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {path} without credentials");
        }
    }
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    let config = TestConfig::new();

    for path in ["/", "/invalid", "/events/key/v1", "/events/key/v2/abc", "/events/jwt/v1/abc/extra"] {
        let request = Request::builder()
            .uri(path)
            .method(Method::POST)
            .header("X-Api-Key", "FAKE_API_KEY")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = config.send(request).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body, message("Not found"));
    }
}

#[tokio::test]
async fn test_options_is_answered_everywhere() {
    let config = TestConfig::new();

    for path in [
        "/".to_string(),
        "/invalid".to_string(),
        format!("/events/key/v1/{EVENT_ID}"),
        format!("/events/jwt/v1/{EVENT_ID}"),
    ] {
        let request = Request::builder()
            .uri(&path)
            .method(Method::OPTIONS)
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = config.send(request).await;

        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, json!({}));
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let config = TestConfig::new();

    let requests = [
        Request::builder()
            .uri(format!("/events/key/v1/{EVENT_ID}"))
            .method(Method::POST)
            .header("X-Api-Key", "FAKE_API_KEY")
            .body(Body::from(valid_event().to_string()))
            .unwrap(),
        Request::builder()
            .uri(format!("/events/jwt/v1/{EVENT_ID}"))
            .method(Method::POST)
            .body(Body::empty())
            .unwrap(),
        Request::builder()
            .uri(format!("/events/key/v1/{EVENT_ID}"))
            .method(Method::GET)
            .body(Body::empty())
            .unwrap(),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
        Request::builder()
            .uri("/")
            .method(Method::OPTIONS)
            .body(Body::empty())
            .unwrap(),
    ];

    for request in requests {
        let (status, headers, _) = config.send(request).await;

        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*", "{status}");
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
        assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(
            headers.get(header::CONTENT_SECURITY_POLICY).unwrap(),
            "default-src 'none';"
        );
    }
}
