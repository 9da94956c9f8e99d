//! SQL issued by the route handlers, one statement per route.

pub const LIST_CARS: &str = "
    SELECT id, make, model, year, date_created, deleted_flag
    FROM cars
    WHERE deleted_flag = 0";

pub const INSERT_CAR: &str = "
    INSERT INTO cars (make, model, year, date_created)
    VALUES (:make, :model, :year, NOW())";

pub const SOFT_DELETE_CAR: &str = "UPDATE cars SET deleted_flag = 1 WHERE id = :id";

pub const UPDATE_CAR_YEAR: &str = "UPDATE cars SET year = :year WHERE id = :id";

/// Backfills the creation timestamp column on tables created before it existed
pub const ADD_DATE_CREATED_COLUMN: &str =
    "ALTER TABLE cars ADD COLUMN date_created DATETIME AFTER year";
