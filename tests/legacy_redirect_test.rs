//! The fixed-range veterinary URLs answer with a redirect to the unified
//! endpoint, keeping every parameter they don't translate.

mod common;

use axum::http::{header, StatusCode};
use common::{response_json, TestApp};

async fn location(app: &TestApp, uri: &str) -> String {
    let response = app.get(uri, None).await;
    assert_eq!(response.status(), StatusCode::FOUND, "GET {}", uri);
    response.headers()[header::LOCATION]
        .to_str()
        .expect("ascii location")
        .to_string()
}

#[tokio::test]
async fn daily_defaults_to_today() {
    let app = TestApp::empty().await;
    assert_eq!(
        location(&app, "/api/v1/reports/veterinary/daily").await,
        "/api/v1/reports/veterinary?range_type=daily&date_from=2024-03-13&date_to=2024-03-13"
    );
}

#[tokio::test]
async fn daily_preserves_other_parameters_in_order() {
    let app = TestApp::empty().await;
    assert_eq!(
        location(
            &app,
            "/api/v1/reports/veterinary/daily?project_id=2&date=2024-03-05&format=pdf&lang=ar"
        )
        .await,
        "/api/v1/reports/veterinary?range_type=daily&date_from=2024-03-05&date_to=2024-03-05\
         &project_id=2&format=pdf&lang=ar"
    );
}

#[tokio::test]
async fn weekly_uses_week_start_or_the_week_of_date() {
    let app = TestApp::empty().await;

    assert_eq!(
        location(&app, "/api/v1/reports/veterinary/weekly").await,
        "/api/v1/reports/veterinary?range_type=weekly&date_from=2024-03-11&date_to=2024-03-17"
    );
    assert_eq!(
        location(&app, "/api/v1/reports/veterinary/weekly?week_start=2024-03-05&dog_id=7").await,
        "/api/v1/reports/veterinary?range_type=weekly&date_from=2024-03-05&date_to=2024-03-11&dog_id=7"
    );
    assert_eq!(
        location(&app, "/api/v1/reports/veterinary/weekly?date=2024-03-20").await,
        "/api/v1/reports/veterinary?range_type=weekly&date_from=2024-03-18&date_to=2024-03-24"
    );
}

#[tokio::test]
async fn stale_range_parameters_are_replaced() {
    let app = TestApp::empty().await;
    assert_eq!(
        location(
            &app,
            "/api/v1/reports/veterinary/daily?range_type=monthly&date_from=2020-01-01&page=3"
        )
        .await,
        "/api/v1/reports/veterinary?range_type=daily&date_from=2024-03-13&date_to=2024-03-13&page=3"
    );
}

#[tokio::test]
async fn malformed_date_is_a_bad_request() {
    let app = TestApp::empty().await;
    let response = app
        .get("/api/v1/reports/veterinary/daily?date=yesterday", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get("/api/v1/reports/veterinary/weekly?week_start=2024-02-30", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn redirect_target_serves_the_same_report() {
    let app = TestApp::new().await;
    let target = location(&app, "/api/v1/reports/veterinary/weekly?project_id=1").await;

    let token = app.admin_token();
    let response = app.get(&target, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = response_json(response).await["data"].clone();
    assert_eq!(data["range"]["range_type"], "weekly");
    assert_eq!(data["range"]["date_from"], "2024-03-11");
    assert_eq!(data["filters"]["project_id"], 1);
    assert_eq!(data["pagination"]["total"], 3);
}
