#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use k9ops_api::{
    auth::{GENERAL_ADMIN, PROJECT_MANAGER, TRAINER, VETERINARIAN, VIEWER},
    build_router,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{
        checkup_log, dog, employee, feeding_log, project, project_assignment, training_activity,
        user, user_permission, veterinary_visit,
    },
    reports::FixedClock,
    AppState,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Wednesday; its week runs 2024-03-11..=2024-03-17.
pub const TODAY: (i32, u32, u32) = (2024, 3, 13);

pub const PROJECT_ALPHA: i32 = 1;
pub const PROJECT_BRAVO: i32 = 2;

pub const ADMIN_ID: i32 = 1;
pub const MANAGER_ID: i32 = 2;
pub const TRAINER_ID: i32 = 3;
pub const VIEWER_ID: i32 = 4;
pub const VET_ID: i32 = 5;

/// Staff ids referenced by the activity logs.
pub const EMPLOYEE_HALA: i32 = 1;
pub const EMPLOYEE_OMAR: i32 = 2;
pub const EMPLOYEE_SAMIR: i32 = 3;
pub const EMPLOYEE_NOUR: i32 = 4;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(TODAY.0, TODAY.1, TODAY.2)
}

/// Helper harness for an application backed by an in-memory SQLite database
/// and a clock pinned to [`TODAY`].
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Fresh schema with no rows.
    pub async fn empty() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::sqlite_memory())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let state = AppState::new(Arc::new(pool), cfg)
            .with_clock(Arc::new(FixedClock::on(today())));
        let router = build_router(state.clone(), CorsLayer::permissive());

        Self { router, state }
    }

    /// Schema plus the standard fixture set, see [`seed`].
    pub async fn new() -> Self {
        let app = Self::empty().await;
        seed(app.db()).await;
        app
    }

    /// Rebuilds the router around a modified copy of the state.
    pub fn map_state(self, f: impl FnOnce(AppState) -> AppState) -> Self {
        let state = f(self.state);
        let router = build_router(state.clone(), CorsLayer::permissive());
        Self { router, state }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn token_for(&self, user_id: i32, role: &str) -> String {
        self.state
            .auth
            .issue_token(user_id, role, Some("Test User"))
            .expect("token issued")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(ADMIN_ID, GENERAL_ADMIN)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, uri, token, &[]).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).expect("request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// GET as the general admin, asserting 200 and returning the `data` payload.
    pub async fn report(&self, uri: &str) -> Value {
        let token = self.admin_token();
        let response = self.get(uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        response_json(response).await["data"].clone()
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    let bytes = response_bytes(response).await;
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn response_text(response: Response) -> String {
    String::from_utf8(response_bytes(response).await).expect("utf-8 body")
}

/// The `date` column of every row, in order.
pub fn row_dates(data: &Value) -> Vec<String> {
    data["rows"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|r| r["date"].as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn row_projects(data: &Value) -> Vec<Option<i64>> {
    data["rows"]
        .as_array()
        .map(|rows| rows.iter().map(|r| r["project_id"].as_i64()).collect())
        .unwrap_or_default()
}

pub fn kpi<'a>(data: &'a Value, key: &str) -> &'a Value {
    data["kpis"]
        .as_array()
        .and_then(|kpis| kpis.iter().find(|k| k["key"] == key))
        .map(|k| &k["value"])
        .unwrap_or_else(|| panic!("kpi {} missing", key))
}

/// Standard fixtures.
///
/// * Projects Alpha (1) and Bravo (2).
/// * Users: admin, a project manager assigned to Alpha, a trainer assigned to
///   Bravo, a viewer holding one project-bound veterinary grant on Bravo and a
///   veterinarian assigned to both.
/// * Staff: veterinarians Hala and Samir, trainers Omar and Nour. Samir handles
///   both emergencies and the critical checkup; Nour ran the Alpha session.
/// * Veterinary visits: three this week in Alpha, one this week in Bravo, one
///   earlier in March in Alpha and one today with no project.
pub async fn seed(db: &DatabaseConnection) {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

    for (id, code, name) in [(PROJECT_ALPHA, "ALP", "Alpha"), (PROJECT_BRAVO, "BRV", "Bravo")] {
        project::ActiveModel {
            id: Set(id),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            status: Set("active".to_string()),
            start_date: Set(date(2024, 1, 1)),
            end_date: Set(None),
            created_at: Set(created),
        }
        .insert(db)
        .await
        .expect("project");
    }

    for (id, username, role) in [
        (ADMIN_ID, "admin", GENERAL_ADMIN),
        (MANAGER_ID, "manager", PROJECT_MANAGER),
        (TRAINER_ID, "trainer", TRAINER),
        (VIEWER_ID, "viewer", VIEWER),
        (VET_ID, "vet", VETERINARIAN),
    ] {
        user::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            full_name: Set(format!("{} user", username)),
            role: Set(role.to_string()),
            active: Set(true),
            created_at: Set(created),
        }
        .insert(db)
        .await
        .expect("user");
    }

    for (user_id, project_id) in [
        (MANAGER_ID, PROJECT_ALPHA),
        (TRAINER_ID, PROJECT_BRAVO),
        (VET_ID, PROJECT_ALPHA),
        (VET_ID, PROJECT_BRAVO),
    ] {
        project_assignment::ActiveModel {
            project_id: Set(project_id),
            user_id: Set(user_id),
            created_at: Set(created),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("assignment");
    }

    user_permission::ActiveModel {
        user_id: Set(VIEWER_ID),
        project_id: Set(Some(PROJECT_BRAVO)),
        permission: Set("reports:veterinary:read".to_string()),
        created_at: Set(created),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("permission");

    for (id, code, name, project_id) in [
        (EMPLOYEE_HALA, "E-001", "Dr. Hala", PROJECT_ALPHA),
        (EMPLOYEE_OMAR, "E-002", "Omar", PROJECT_BRAVO),
        (EMPLOYEE_SAMIR, "E-003", "Dr. Samir", PROJECT_BRAVO),
        (EMPLOYEE_NOUR, "E-004", "Nour", PROJECT_ALPHA),
    ] {
        employee::ActiveModel {
            id: Set(id),
            employee_code: Set(code.to_string()),
            full_name: Set(name.to_string()),
            role: Set("staff".to_string()),
            project_id: Set(Some(project_id)),
            active: Set(true),
        }
        .insert(db)
        .await
        .expect("employee");
    }

    for (id, code, name, project_id) in [
        (1, "K9-001", "Rex", PROJECT_ALPHA),
        (2, "K9-002", "Luna", PROJECT_BRAVO),
        (3, "K9-003", "Max", PROJECT_ALPHA),
    ] {
        dog::ActiveModel {
            id: Set(id),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            breed: Set("Malinois".to_string()),
            gender: Set("male".to_string()),
            birth_date: Set(None),
            project_id: Set(Some(project_id)),
            status: Set("active".to_string()),
        }
        .insert(db)
        .await
        .expect("dog");
    }

    let visits: [(i32, i32, Option<i32>, NaiveDate, &str, Option<f64>); 6] = [
        (1, EMPLOYEE_HALA, Some(PROJECT_ALPHA), date(2024, 3, 13), "routine", Some(100.0)),
        (3, EMPLOYEE_HALA, Some(PROJECT_ALPHA), date(2024, 3, 12), "routine", Some(80.0)),
        (3, EMPLOYEE_SAMIR, Some(PROJECT_ALPHA), date(2024, 3, 11), "emergency", Some(320.25)),
        (2, EMPLOYEE_SAMIR, Some(PROJECT_BRAVO), date(2024, 3, 13), "emergency", Some(250.5)),
        (1, EMPLOYEE_HALA, Some(PROJECT_ALPHA), date(2024, 3, 1), "vaccination", None),
        (1, EMPLOYEE_HALA, None, date(2024, 3, 13), "routine", Some(10.0)),
    ];
    for (dog_id, vet_id, project_id, visit_date, visit_type, cost) in visits {
        veterinary_visit::ActiveModel {
            dog_id: Set(dog_id),
            vet_id: Set(Some(vet_id)),
            project_id: Set(project_id),
            visit_date: Set(visit_date),
            visit_type: Set(visit_type.to_string()),
            diagnosis: Set(None),
            treatment: Set(None),
            cost: Set(cost),
            created_at: Set(created),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("visit");
    }

    for (dog_id, trainer_id, project_id, category, minutes, rating) in [
        (2, EMPLOYEE_OMAR, PROJECT_BRAVO, "obedience", 90, Some(4)),
        (1, EMPLOYEE_NOUR, PROJECT_ALPHA, "detection", 60, None),
    ] {
        training_activity::ActiveModel {
            dog_id: Set(dog_id),
            trainer_id: Set(Some(trainer_id)),
            project_id: Set(Some(project_id)),
            session_date: Set(today()),
            category: Set(category.to_string()),
            duration_minutes: Set(minutes),
            success_rating: Set(rating),
            notes: Set(None),
            created_at: Set(created),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("training");
    }

    for (meal, grams, water) in [("breakfast", 500, Some(1000)), ("dinner", 700, None)] {
        feeding_log::ActiveModel {
            dog_id: Set(1),
            recorder_id: Set(Some(EMPLOYEE_HALA)),
            project_id: Set(Some(PROJECT_ALPHA)),
            log_date: Set(today()),
            meal_type: Set(meal.to_string()),
            food_type: Set("dry".to_string()),
            quantity_grams: Set(grams),
            water_ml: Set(water),
            notes: Set(None),
            created_at: Set(created),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("feeding");
    }

    for (dog_id, examiner_id, temp, status) in [
        (1, EMPLOYEE_HALA, 38.5, "normal"),
        (3, EMPLOYEE_SAMIR, 40.1, "critical"),
    ] {
        checkup_log::ActiveModel {
            dog_id: Set(dog_id),
            examiner_id: Set(Some(examiner_id)),
            project_id: Set(Some(PROJECT_ALPHA)),
            check_date: Set(today()),
            temperature_c: Set(Some(temp)),
            heart_rate: Set(Some(90)),
            weight_kg: Set(Some(30.0)),
            overall_status: Set(status.to_string()),
            notes: Set(None),
            created_at: Set(created),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("checkup");
    }
}
