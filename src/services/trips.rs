use tracing::info;

use crate::{
    db::DbPool,
    error::AppError,
    models::trip::{NewTrip, Trip},
};

const TRIP_COLUMNS: &str = "id, trip_name, destination, start_date, end_date";

#[derive(Clone)]
pub struct TripService {
    db: DbPool,
}

impl TripService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Inserts the trip as submitted; names and destinations need not be unique.
    pub async fn create(&self, trip: &NewTrip) -> Result<Trip, AppError> {
        let id = sqlx::query(
            "INSERT INTO trips (trip_name, destination, start_date, end_date) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&trip.trip_name)
        .bind(&trip.destination)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        info!(trip_id = id, destination = %trip.destination, "trip created");
        Ok(Trip {
            id,
            trip_name: trip.trip_name.clone(),
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
        })
    }

    pub async fn find_by_id(&self, trip_id: i64) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"))
            .bind(trip_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(trip)
    }

    /// The trip with the latest start date for `destination`.
    pub async fn latest_for_destination(&self, destination: &str) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE destination = ?1 ORDER BY start_date DESC, id DESC LIMIT 1"
        ))
        .bind(destination)
        .fetch_optional(&self.db)
        .await?;
        Ok(trip)
    }

    /// Resolves an explicit id first, then falls back to the latest trip for the destination.
    pub async fn resolve(
        &self,
        trip_id: Option<i64>,
        destination: Option<&str>,
    ) -> Result<Trip, AppError> {
        let trip = match (trip_id, destination) {
            (Some(id), _) => self.find_by_id(id).await?,
            (None, Some(destination)) => self.latest_for_destination(destination).await?,
            (None, None) => None,
        };
        trip.ok_or(AppError::NotFound)
    }
}
