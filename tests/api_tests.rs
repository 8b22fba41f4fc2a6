use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use ghcn_weather_api::api::{router, AppState};
use ghcn_weather_api::models::Observation;
use ghcn_weather_api::store::Database;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn obs(date: &str, station_id: &str, max_temp: f64, min_temp: f64, precipitation: f64) -> Observation {
    Observation::new(
        NaiveDate::parse_from_str(date, "%Y%m%d").unwrap(),
        station_id.to_string(),
        max_temp,
        min_temp,
        precipitation,
    )
}

/// Router over an in-memory store seeded with two stations and two years
fn seeded_router() -> Router {
    let mut db = Database::open_in_memory().unwrap();
    db.replace_observations(&[
        obs("19850101", "USC00110072", -22.0, -128.0, 94.0),
        obs("19850102", "USC00110072", -122.0, -217.0, 0.0),
        obs("20200601", "USC00110072", 250.0, 150.0, -9999.0),
        obs("20200602", "USC00110072", 350.0, -9999.0, -9999.0),
        obs("20200602", "USC00257715", 300.0, 200.0, 12.0),
    ])
    .unwrap();

    router(AppState::new(db))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Error rejections carry a plain-text body
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

#[tokio::test]
async fn test_list_weather_defaults() {
    let (status, body) = get_json(seeded_router(), "/api/weather").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["total_items"], 5);
    assert_eq!(body["weather_data"].as_array().unwrap().len(), 5);

    // Raw rows round-trip exactly, sentinel values included
    assert_eq!(
        body["weather_data"][3],
        json!({
            "date": "20200602",
            "station_id": "USC00110072",
            "max_temp": 350.0,
            "min_temp": -9999.0,
            "precipitation_amount": -9999.0
        })
    );
}

#[tokio::test]
async fn test_list_weather_pagination() {
    let (status, body) = get_json(seeded_router(), "/api/weather?page=1&per_page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather_data"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["total_items"], 5);
}

#[tokio::test]
async fn test_list_weather_page_past_the_end() {
    let (status, body) = get_json(seeded_router(), "/api/weather?page=99&per_page=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather_data"], json!([]));
    assert_eq!(body["page"], 99);
    assert_eq!(body["total_items"], 5);
}

#[tokio::test]
async fn test_list_weather_filters() {
    let (status, body) =
        get_json(seeded_router(), "/api/weather?date=20200602&station_id=USC00257715").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["weather_data"][0]["station_id"], "USC00257715");
}

#[tokio::test]
async fn test_list_weather_rejects_malformed_page() {
    let (status, _) = get_json(seeded_router(), "/api/weather?page=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_all_years() {
    let (status, body) = get_json(seeded_router(), "/api/weather/stats").await;

    assert_eq!(status, StatusCode::OK);
    let stats = body["weather_stats"].as_array().unwrap();
    assert_eq!(stats.len(), 3); // 1985 and 2020 for one station, 2020 for the other
    assert_eq!(stats[0]["year"], "1985");
    assert_eq!(stats[0]["avg_max_temp"], -72.0);
    assert_eq!(stats[0]["total_precipitation_cm"], 9.4);
}

#[tokio::test]
async fn test_stats_year_filter() {
    let (status, body) = get_json(
        seeded_router(),
        "/api/weather/stats?date=2020&station_id=USC00110072",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let stats = body["weather_stats"].as_array().unwrap();
    assert_eq!(stats.len(), 1);

    // Unweighted mean of the non-sentinel readings recorded in 2020
    assert_eq!(stats[0]["year"], "2020");
    assert_eq!(stats[0]["avg_max_temp"], 300.0);
    assert_eq!(stats[0]["avg_min_temp"], 150.0);
    assert_eq!(stats[0]["total_precipitation_cm"], Value::Null);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get_json(seeded_router(), "/api/forecast").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
