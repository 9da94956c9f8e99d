use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db::SqlValue;

/// A row of the `cars` table as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Car {
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    /// `None` only for rows written before the column existed
    pub date_created: Option<NaiveDateTime>,
    pub deleted_flag: bool,
}

/// Body of `POST /cars`
///
/// Fields are kept as raw JSON scalars: strict SQL mode, not the
/// deserializer, decides whether `"year": "abc"` is acceptable.
#[derive(Debug, Deserialize)]
pub struct CreateCarRequest {
    #[serde(default)]
    pub make: SqlValue,
    #[serde(default)]
    pub model: SqlValue,
    #[serde(default)]
    pub year: SqlValue,
}

/// Body of `PUT /cars/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateYearRequest {
    #[serde(default)]
    pub year: SqlValue,
}
