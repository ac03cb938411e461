//! Integration tests for the riskmap server API
//!
//! Exercises the complete HTTP surface against an in-process router:
//! health, filtered prediction queries, report submission with its
//! broadcast side effect, and validation failures.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use riskmap_common::events::FeedEvent;
use riskmap_common::model::Prediction;
use riskmap_server::api::{create_router, AppContext};
use riskmap_server::feed::{PredictionFeed, SyntheticFeed};
use riskmap_server::sse::Broadcaster;
use riskmap_server::store::ReportStore;

/// Test context with handles kept for direct inspection.
struct TestApp {
    router: axum::Router,
    store: Arc<ReportStore>,
    broadcaster: Broadcaster,
}

fn prediction(id: &str, weather: &str, period: &str) -> Prediction {
    Prediction {
        id: id.to_string(),
        latitude: Some(14.6),
        longitude: Some(-90.5),
        risk_score: 0.7,
        date: "2024-05-01".to_string(),
        hour: "09:00".to_string(),
        weather: weather.to_string(),
        period: period.to_string(),
        road_segment: "Segmento 2".to_string(),
    }
}

fn setup_app(predictions: Vec<Prediction>) -> TestApp {
    let feed = SyntheticFeed::empty();
    for p in predictions {
        feed.append(p);
    }

    let store = Arc::new(ReportStore::new());
    let broadcaster = Broadcaster::new(32);

    let ctx = AppContext {
        store: Arc::clone(&store),
        feed: Arc::new(PredictionFeed::Synthetic(feed)),
        broadcaster: broadcaster.clone(),
        rebroadcast_fetches: true,
    };

    TestApp {
        router: create_router(ctx),
        store,
        broadcaster,
    }
}

async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        _ => panic!("Unsupported method"),
    };

    let mut request = Request::builder().method(method).uri(path);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = match body {
        Some(json_body) => request.body(Body::from(json_body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };

    (status, json_body)
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let app = setup_app(Vec::new());

    let (status, body) = make_request(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "riskmap-server");
}

#[tokio::test]
async fn report_submission_stores_and_broadcasts() {
    let app = setup_app(Vec::new());
    let mut rx = app.broadcaster.subscribe();

    let payload = json!({
        "description": "  Choque leve  ",
        "latitude": 14.63,
        "longitude": -90.50,
        "severity": "alta"
    });
    let (status, body) = make_request(&app.router, "POST", "/api/reports", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    let body = body.unwrap();
    assert_eq!(body["description"], "Choque leve");
    assert_eq!(body["severity"], "alta");
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());

    // the store now lists it first
    let stored = app.store.list();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "Choque leve");

    // every connected client receives an identical payload
    match rx.try_recv().unwrap() {
        FeedEvent::ReportNew(report) => {
            assert_eq!(report.id.to_string(), body["id"].as_str().unwrap());
            assert_eq!(report.description, "Choque leve");
        }
        other => panic!("expected report:new, got {}", other.event_name()),
    }
}

#[tokio::test]
async fn invalid_report_is_rejected_without_side_effects() {
    let app = setup_app(Vec::new());
    let mut rx = app.broadcaster.subscribe();

    let payload = json!({
        "description": "Choque leve",
        "latitude": "abc",
        "longitude": -90.50
    });
    let (status, body) = make_request(&app.router, "POST", "/api/reports", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Datos del reporte incompletos.");
    assert!(app.store.list().is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn blank_description_is_rejected() {
    let app = setup_app(Vec::new());

    let payload = json!({
        "description": "   ",
        "latitude": 14.63,
        "longitude": -90.50
    });
    let (status, body) = make_request(&app.router, "POST", "/api/reports", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Datos del reporte incompletos.");
}

#[tokio::test]
async fn reports_are_listed_most_recent_first() {
    let app = setup_app(Vec::new());

    for description in ["primero", "segundo", "tercero"] {
        let payload = json!({
            "description": description,
            "latitude": 14.6,
            "longitude": -90.5
        });
        let (status, _) = make_request(&app.router, "POST", "/api/reports", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = make_request(&app.router, "GET", "/api/reports", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = body.unwrap()["data"].as_array().unwrap().clone();
    assert_eq!(data[0]["description"], "tercero");
    assert_eq!(data[2]["description"], "primero");
}

#[tokio::test]
async fn prediction_query_applies_conjunctive_filters() {
    let app = setup_app(vec![
        prediction("a", "lluvia", "dia"),
        prediction("b", "lluvia", "noche"),
        prediction("c", "no_lluvia", "dia"),
    ]);

    let (status, body) = make_request(
        &app.router,
        "GET",
        "/api/predictions?weather=lluvia&period=dia",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = body.unwrap()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], "a");

    // weather=todos drops that constraint; the period constraint remains
    let (status, body) = make_request(
        &app.router,
        "GET",
        "/api/predictions?weather=todos&period=dia",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body.unwrap()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn synthetic_query_does_not_broadcast() {
    let app = setup_app(vec![prediction("a", "lluvia", "dia")]);
    let mut rx = app.broadcaster.subscribe();

    let (status, _) = make_request(&app.router, "GET", "/api/predictions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sse_connection_starts_with_an_init_snapshot() {
    use http_body_util::BodyExt;

    let app = setup_app(vec![prediction("a", "lluvia", "dia")]);

    let payload = json!({
        "description": "Derrumbe en la ruta",
        "latitude": 14.61,
        "longitude": -90.52
    });
    let (status, _) = make_request(&app.router, "POST", "/api/reports", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let request = http::Request::builder()
        .method(http::Method::GET)
        .uri("/api/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    // the first frame is the one-time init event with both collections
    let mut body = response.into_body();
    let frame = tokio::time::timeout(std::time::Duration::from_secs(5), body.frame())
        .await
        .expect("timed out waiting for init event")
        .unwrap()
        .unwrap();
    let text = String::from_utf8_lossy(frame.data_ref().unwrap()).to_string();
    assert!(text.starts_with("event: init"), "got: {text}");
    assert!(text.contains("Derrumbe en la ruta"));
    assert!(text.contains("\"predictions\""));
}

#[tokio::test]
async fn live_events_reach_a_connected_sse_client() {
    use http_body_util::BodyExt;

    let app = setup_app(Vec::new());

    let request = http::Request::builder()
        .method(http::Method::GET)
        .uri("/api/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let mut body = response.into_body();

    // consume the init event
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), body.frame())
        .await
        .expect("timed out waiting for init event");

    app.broadcaster
        .broadcast_lossy(FeedEvent::PredictionNew(prediction("live-1", "lluvia", "dia")));

    let frame = tokio::time::timeout(std::time::Duration::from_secs(5), body.frame())
        .await
        .expect("timed out waiting for live event")
        .unwrap()
        .unwrap();
    let text = String::from_utf8_lossy(frame.data_ref().unwrap()).to_string();
    assert!(text.starts_with("event: prediction:new"), "got: {text}");
    assert!(text.contains("live-1"));
}

#[tokio::test]
async fn hour_filter_matches_on_the_hour_component() {
    let app = setup_app(vec![prediction("a", "lluvia", "dia")]);

    // prediction hour is 09:00
    let (_, body) = make_request(&app.router, "GET", "/api/predictions?hour=09:45", None).await;
    assert_eq!(body.unwrap()["data"].as_array().unwrap().len(), 1);

    let (_, body) = make_request(&app.router, "GET", "/api/predictions?hour=10:00", None).await;
    assert!(body.unwrap()["data"].as_array().unwrap().is_empty());
}
