use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use uuid::Uuid;

use cars_api::api::{create_router, AppState};
use cars_api::db::{create_pool, ConnectionProvider, MySqlProvider, PoolSettings, SessionSettings};
use cars_api::Config;

/// A server whose pool points at a port nothing listens on
fn unreachable_server(enable_admin_routes: bool) -> (TestServer, MySqlPool) {
    let pool = create_pool(&PoolSettings {
        host: "127.0.0.1".into(),
        port: 1,
        user: "cars".into(),
        password: "secret".into(),
        database: "garage".into(),
        max_connections: 2,
        acquire_timeout: Duration::from_millis(300),
    });
    let state = AppState::new(
        pool.clone(),
        SessionSettings::default(),
        Duration::from_secs(5),
        enable_admin_routes,
    );
    (TestServer::new(create_router(state)).unwrap(), pool)
}

#[tokio::test]
async fn test_health_check_does_not_touch_database() {
    let (server, _pool) = unreachable_server(false);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["pool"]["size"], 0);
}

#[tokio::test]
async fn test_unreachable_database_is_service_unavailable() {
    let (server, _pool) = unreachable_server(false);

    let response = server.get("/cars").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"], "unavailable");
    assert_eq!(body["message"], "database connection unavailable");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _pool) = unreachable_server(false);
    let id = Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            "x-request-id".parse::<axum::http::HeaderName>().unwrap(),
            id.parse::<axum::http::HeaderValue>().unwrap(),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id.as_str());
}

#[tokio::test]
async fn test_request_id_is_generated_on_errors_too() {
    let (server, _pool) = unreachable_server(false);

    let response = server.delete("/cars/5").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let header = response.header("x-request-id");
    assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_admin_route_is_off_by_default() {
    let (server, _pool) = unreachable_server(false);

    server
        .put("/addcolumn")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_route_mounts_when_enabled() {
    let (server, _pool) = unreachable_server(true);

    // Mounted, so it gets as far as leasing a connection
    server
        .put("/addcolumn")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

// Database-backed tests
//
// Run with the service's own environment (PORT, DB_HOST, DB_USER,
// DB_PASSWORD, DB_NAME) pointing at a disposable MySQL schema:
//   cargo test -- --ignored

async fn db_server() -> (TestServer, MySqlPool) {
    let config = Config::from_env().expect("database environment required");
    let pool = create_pool(&PoolSettings::from(&config));
    sqlx::raw_sql(include_str!("../schema/cars.sql"))
        .execute(&pool)
        .await
        .expect("failed to create cars table");

    let state = AppState::new(
        pool.clone(),
        config.session_settings(),
        config.request_timeout(),
        true,
    );
    (TestServer::new(create_router(state)).unwrap(), pool)
}

async fn list(server: &TestServer) -> Vec<Value> {
    let response = server.get("/cars").await;
    response.assert_status_ok();
    response.json()
}

/// Creates a car under a make no other test uses and returns its id
async fn create_unique(server: &TestServer, model: &str, year: i64) -> (String, i64) {
    let make = format!("make-{}", Uuid::new_v4().simple());
    server
        .post("/cars")
        .json(&json!({ "make": make, "model": model, "year": year }))
        .await
        .assert_status_ok();

    let id = list(server)
        .await
        .iter()
        .find(|car| car["make"] == make.as_str())
        .and_then(|car| car["id"].as_i64())
        .expect("created car is listed");
    (make, id)
}

/// Returned connections are handed back asynchronously; give them a moment
async fn wait_until_idle(pool: &MySqlPool) {
    for _ in 0..50 {
        if pool.num_idle() == pool.size() as usize {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "pool did not return to baseline: size {} idle {}",
        pool.size(),
        pool.num_idle()
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_and_list_car() {
    let (server, _pool) = db_server().await;
    let before: Vec<i64> = list(&server)
        .await
        .iter()
        .filter_map(|car| car["id"].as_i64())
        .collect();

    let response = server
        .post("/cars")
        .json(&json!({ "make": "Toyota", "model": "Corolla", "year": 2020 }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "success": true,
        "message": "Car successfully created",
        "data": null
    }));

    let cars = list(&server).await;
    let new: Vec<&Value> = cars
        .iter()
        .filter(|car| !before.contains(&car["id"].as_i64().unwrap()))
        .filter(|car| car["make"] == "Toyota" && car["model"] == "Corolla")
        .collect();
    assert_eq!(new.len(), 1);
    assert_eq!(new[0]["year"], 2020);
    assert!(!new[0]["date_created"].is_null());
    assert_eq!(new[0]["deleted_flag"], false);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_soft_delete_hides_row_but_keeps_it() {
    let (server, pool) = db_server().await;
    let (_make, id) = create_unique(&server, "Civic", 2004).await;

    let response = server.delete(&format!("/cars/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Car successfully deleted");

    let cars = list(&server).await;
    assert!(cars.iter().all(|car| car["id"] != id));
    assert!(cars.iter().all(|car| car["deleted_flag"] == false));

    let (deleted,): (bool,) = sqlx::query_as("SELECT deleted_flag FROM cars WHERE id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await
        .expect("row still exists");
    assert!(deleted);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_changes_only_year() {
    let (server, _pool) = db_server().await;
    let (make, id) = create_unique(&server, "Accord", 2010).await;

    server
        .put(&format!("/cars/{}", id))
        .json(&json!({ "year": 1999 }))
        .await
        .assert_status_ok();

    let cars = list(&server).await;
    let car = cars.iter().find(|car| car["id"] == id).expect("car listed");
    assert_eq!(car["year"], 1999);
    assert_eq!(car["make"], make.as_str());
    assert_eq!(car["model"], "Accord");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_strict_mode_rejects_non_numeric_year() {
    let (server, _pool) = db_server().await;
    let make = format!("make-{}", Uuid::new_v4().simple());

    let response = server
        .post("/cars")
        .json(&json!({ "make": make, "model": "Prius", "year": "abc" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_data");
    assert_eq!(body["data"], Value::Null);

    assert!(list(&server).await.iter().all(|car| car["make"] != make.as_str()));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_malformed_body_is_invalid_input() {
    let (server, pool) = db_server().await;

    let response = server.post("/cars").text("make=Toyota").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "invalid_input");
    wait_until_idle(&pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_add_existing_column_is_conflict() {
    let (server, pool) = db_server().await;

    let response = server.put("/addcolumn").await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "conflict");
    wait_until_idle(&pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_pool_returns_to_baseline_after_every_request() {
    let (server, pool) = db_server().await;
    let (_make, id) = create_unique(&server, "Golf", 2015).await;
    wait_until_idle(&pool).await;

    server.get("/cars").await;
    wait_until_idle(&pool).await;

    server
        .post("/cars")
        .json(&json!({ "make": "Bad", "model": "Year", "year": "nope" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    wait_until_idle(&pool).await;

    server
        .put(&format!("/cars/{}", id))
        .json(&json!({ "year": 1999 }))
        .await;
    wait_until_idle(&pool).await;

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["pool"]["size"], health["pool"]["idle"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_leased_connection_has_session_settings() {
    let config = Config::from_env().expect("database environment required");
    let pool = create_pool(&PoolSettings::from(&config));
    let provider = MySqlProvider::new(pool.clone(), config.session_settings());

    let mut conn = provider.acquire().await.expect("acquire");
    provider.configure(&mut conn).await.expect("configure");

    let (mode, zone): (String, String) = sqlx::query_as(
        "SELECT CAST(@@SESSION.sql_mode AS CHAR), CAST(@@SESSION.time_zone AS CHAR)",
    )
    .fetch_one(&mut *conn)
    .await
    .expect("read session variables");

    assert!(mode.contains("STRICT_ALL_TABLES"));
    assert_eq!(zone, config.session_time_zone);
}
