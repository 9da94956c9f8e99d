use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::{mysql::MySqlQueryResult, pool::PoolConnection, MySql};

use super::statements;
use super::AppState;
use crate::db::{Lease, NamedQuery, Params};
use crate::error::AppResult;
use crate::middleware::Db;
use crate::models::{ApiResponse, Car, CreateCarRequest, UpdateYearRequest};

/// Runs one named statement on the request's connection
async fn execute(
    lease: &Lease<PoolConnection<MySql>>,
    sql: &str,
    params: Params,
) -> AppResult<MySqlQueryResult> {
    let query = NamedQuery::parse(sql);
    let args = query.bind(&params)?;
    let mut conn = lease.get().await?;
    let result = sqlx::query_with(query.sql(), args)
        .execute(&mut **conn)
        .await?;
    Ok(result)
}

/// Health check endpoint, with pool occupancy
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let pool = state.pool();
    Json(json!({
        "status": "healthy",
        "pool": {
            "size": pool.size(),
            "idle": pool.num_idle(),
        }
    }))
}

/// List every car that has not been soft-deleted
pub async fn list_cars(Db(lease): Db) -> AppResult<Json<Vec<Car>>> {
    let query = NamedQuery::parse(statements::LIST_CARS);
    let args = query.bind(&crate::params!())?;
    let mut conn = lease.get().await?;

    let cars = sqlx::query_as_with::<MySql, Car, _>(query.sql(), args)
        .fetch_all(&mut **conn)
        .await?;

    tracing::debug!(count = cars.len(), "Listed cars");
    Ok(Json(cars))
}

/// Create a car stamped with the current time
pub async fn create_car(
    Db(lease): Db,
    payload: Result<Json<CreateCarRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload?;

    let result = execute(
        &lease,
        statements::INSERT_CAR,
        crate::params! {
            make => request.make,
            model => request.model,
            year => request.year,
        },
    )
    .await?;

    tracing::info!(id = result.last_insert_id(), "Car created");
    Ok(Json(ApiResponse::done("Car successfully created")))
}

/// Soft-delete a car; the row stays in the table with its flag set
pub async fn delete_car(Db(lease): Db, Path(id): Path<String>) -> AppResult<Json<ApiResponse<()>>> {
    let result = execute(&lease, statements::SOFT_DELETE_CAR, crate::params! { id => id.as_str() })
        .await?;

    tracing::info!(id = %id, rows = result.rows_affected(), "Car soft-deleted");
    Ok(Json(ApiResponse::done("Car successfully deleted")))
}

/// Change a car's year; nothing else on the row is touched
pub async fn update_car_year(
    Db(lease): Db,
    Path(id): Path<String>,
    payload: Result<Json<UpdateYearRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload?;

    let result = execute(
        &lease,
        statements::UPDATE_CAR_YEAR,
        crate::params! { id => id.as_str(), year => request.year },
    )
    .await?;

    tracing::info!(id = %id, rows = result.rows_affected(), "Car year updated");
    Ok(Json(ApiResponse::done("Car successfully updated")))
}

/// Add the `date_created` column to a table that predates it
pub async fn add_date_created_column(Db(lease): Db) -> AppResult<Json<ApiResponse<()>>> {
    execute(&lease, statements::ADD_DATE_CREATED_COLUMN, crate::params!()).await?;

    tracing::warn!("Altered table cars: added date_created");
    Ok(Json(ApiResponse::done("Column date_created successfully added")))
}
