#![allow(dead_code)]

use axum::{
    extract::RawQuery,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

pub const FIXTURE_ROWS: &[(&str, &str)] = &[("U1", "D1"), ("U1", "D2"), ("U2", "D1")];

/// Year whose employment query answers `{"error": ...}`.
pub const ERROR_YEAR: i32 = 2013;
/// Year whose dispersion query answers HTTP 500.
pub const BROKEN_DISPERSION_YEAR: i32 = 2013;

fn employment_fixture() -> Vec<Value> {
    vec![
        json!({
            "university": "U1",
            "degree": "D1",
            "years": [2022, 2023],
            "overall_employment_rate": [80.0, null],
            "data_source": ["official", "predicted"],
        }),
        json!({
            "university": "U1",
            "degree": "D2",
            "years": [2022, 2023],
            "overall_employment_rate": [60.0, 70.0],
            "data_source": ["official", "official"],
        }),
        json!({
            "university": "U2",
            "degree": "D1",
            "years": [2022, 2023],
            "overall_employment_rate": [90.0, 95.0],
        }),
    ]
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn metadata_full() -> Json<Value> {
    let rows: Vec<Value> = FIXTURE_ROWS
        .iter()
        .map(|(university, degree)| json!({"university": university, "degree": degree}))
        .collect();
    Json(Value::Array(rows))
}

async fn metadata_years() -> Json<Value> {
    Json(json!({"min": 2013, "max": 2023}))
}

async fn legacy_universities() -> Json<Value> {
    Json(json!(["U1", "U2"]))
}

async fn legacy_degrees() -> Json<Value> {
    Json(json!(["D1", "D2"]))
}

async fn employment(Json(body): Json<Value>) -> Json<Value> {
    if body["start_year"] == json!(ERROR_YEAR) && body["end_year"] == json!(ERROR_YEAR) {
        return Json(json!({"error": "No data found for the selected year range"}));
    }
    let universities = strings(&body["universities"]);
    let degrees = strings(&body["degrees"]);
    let series: Vec<Value> = employment_fixture()
        .into_iter()
        .filter(|s| {
            s["university"]
                .as_str()
                .is_some_and(|u| universities.iter().any(|x| x == u))
                && s["degree"]
                    .as_str()
                    .is_some_and(|d| degrees.iter().any(|x| x == d))
        })
        .collect();
    Json(json!({ "series": series }))
}

async fn salary_comparison(RawQuery(query): RawQuery) -> Json<Value> {
    let pairs: Vec<(String, String)> = query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.replace('+', " ")))
        .collect();
    let value_of = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let item_key = if value_of("group_by") == "degree" {
        "degrees"
    } else {
        "universities"
    };
    let mut items: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k == item_key)
        .map(|(_, v)| v.clone())
        .collect();
    if items.is_empty() {
        items = vec!["U1".to_string(), "U2".to_string()];
    }
    if value_of("aggregate") == "true" {
        items = vec![format!("Average of {} degrees", items.len())];
    }

    let series: Vec<Value> = items
        .iter()
        .map(|label| {
            json!({
                "label": label,
                "mean": [4200.0, 4400.0],
                "median": [4000.0, 4150.0],
                "data_source": ["official", "predicted"],
            })
        })
        .collect();
    Json(json!({"years": [2022, 2023], "series": series}))
}

async fn salary_dispersion(Json(body): Json<Value>) -> Response {
    let year = body["year"].as_i64().unwrap_or_default();
    if year == i64::from(BROKEN_DISPERSION_YEAR) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "percentiles unavailable").into_response();
    }
    let degrees = strings(&body["degrees"]);
    if degrees.iter().any(|d| d == "D2") {
        return Json(json!({"year": year, "series": []})).into_response();
    }
    let labels = if degrees.is_empty() {
        vec!["Bachelor of Computer Science and Engineering".to_string()]
    } else {
        degrees
    };
    let series: Vec<Value> = labels
        .iter()
        .map(|label| json!({"label": label, "p25": 3500.0, "median": 4000.0, "p75": 4700.0}))
        .collect();
    Json(json!({"year": year, "series": series})).into_response()
}

fn router() -> Router {
    Router::new()
        .route("/metadata/full", get(metadata_full))
        .route("/metadata/years", get(metadata_years))
        .route("/metadata/universities", get(legacy_universities))
        .route("/metadata/degrees", get(legacy_degrees))
        .route("/analytics/employment", post(employment))
        .route("/analytics/salary-comparison", get(salary_comparison))
        .route("/analytics/salary-dispersion", post(salary_dispersion))
}

/// Start the fake analytics service on an ephemeral port and return its base URL.
pub fn spawn_fake_service() -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind fake service");
            let addr = listener.local_addr().expect("local addr");
            tx.send(addr).expect("report address");
            axum::serve(listener, router()).await.expect("serve");
        });
    });
    let addr = rx.recv().expect("fake service address");
    format!("http://{addr}")
}

/// Base URL of a port with nothing listening.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
