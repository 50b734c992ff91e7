//! # Dining Hall Repository
//!
//! Serving-location reads for station setup. Hall selection happens before
//! any scan, so this repository sits outside the engine's store traits.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use foodpass_core::DiningHall;

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct DiningHallRow {
    id: String,
    name: String,
    location: String,
    capacity: i64,
    is_active: bool,
}

impl From<DiningHallRow> for DiningHall {
    fn from(row: DiningHallRow) -> Self {
        DiningHall {
            id: row.id,
            name: row.name,
            location: row.location,
            capacity: row.capacity,
            is_active: row.is_active,
        }
    }
}

/// Repository for dining halls.
#[derive(Debug, Clone)]
pub struct DiningHallRepository {
    pool: SqlitePool,
}

impl DiningHallRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiningHallRepository { pool }
    }

    /// Inserts a dining hall. The caller supplies the id (UUID v4).
    pub async fn insert(&self, hall: &DiningHall) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO dining_halls (id, name, location, capacity, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&hall.id)
        .bind(&hall.name)
        .bind(&hall.location)
        .bind(hall.capacity)
        .bind(hall.is_active)
        .execute(&self.pool)
        .await?;

        debug!(hall_id = %hall.id, name = %hall.name, "Dining hall inserted");
        Ok(())
    }

    /// Looks up a hall by id.
    pub async fn get_by_id(&self, hall_id: &str) -> DbResult<Option<DiningHall>> {
        let row: Option<DiningHallRow> = sqlx::query_as(
            "SELECT id, name, location, capacity, is_active
               FROM dining_halls WHERE id = ?1",
        )
        .bind(hall_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(DiningHall::from))
    }

    /// All active halls, for the station's hall picker.
    pub async fn list_active(&self) -> DbResult<Vec<DiningHall>> {
        let rows: Vec<DiningHallRow> = sqlx::query_as(
            "SELECT id, name, location, capacity, is_active
               FROM dining_halls
              WHERE is_active = 1
              ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DiningHall::from).collect())
    }
}
