use std::collections::HashMap;

use chrono::Utc;
use sqlx::FromRow;
use tracing::{debug, info};

use crate::{
    db::DbPool,
    error::AppError,
    models::itinerary::{default_itinerary, DayOrder, ItineraryDay, SavedDay},
    reorder::is_permutation,
};

#[derive(FromRow)]
struct TemplateRow {
    trip_id: i64,
    day_number: i64,
    location: String,
    activities: String,
}

#[derive(FromRow)]
struct SavedRow {
    trip_id: i64,
    day_number: i64,
    activity_order: String,
}

// Activities cross the storage boundary as a JSON array of strings.
fn encode_activities(activities: &[String]) -> Result<String, AppError> {
    serde_json::to_string(activities).map_err(|err| AppError::Other(err.into()))
}

fn decode_activities(raw: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(raw).map_err(|err| AppError::Other(err.into()))
}

#[derive(Clone)]
pub struct ItineraryService {
    db: DbPool,
}

impl ItineraryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Template days of a trip ordered by day number. Empty when the trip has none.
    pub async fn template_days(&self, trip_id: i64) -> Result<Vec<ItineraryDay>, AppError> {
        let rows: Vec<TemplateRow> = sqlx::query_as(
            "SELECT trip_id, day_number, location, activities FROM itineraries WHERE trip_id = ?1 ORDER BY day_number, id",
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ItineraryDay {
                    trip_id: row.trip_id,
                    day_number: row.day_number,
                    location: row.location,
                    activities: decode_activities(&row.activities)?,
                })
            })
            .collect()
    }

    pub async fn add_template_day(&self, day: &ItineraryDay) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO itineraries (trip_id, day_number, location, activities) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(day.trip_id)
        .bind(day.day_number)
        .bind(&day.location)
        .bind(encode_activities(&day.activities)?)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Stores the user's order for every submitted day, replacing earlier saves.
    ///
    /// All days are checked against the planned days before anything is written.
    /// Writes are independent statements; a failure leaves earlier days stored.
    pub async fn save(
        &self,
        user_id: i64,
        trip_id: i64,
        days: &[DayOrder],
    ) -> Result<usize, AppError> {
        let planned = self.effective_days(trip_id).await?;
        ensure_permutations(&planned, days)?;

        for day in days {
            sqlx::query(
                r#"INSERT INTO saved_itinerary (trip_id, day_number, activity_order, user_id, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5)
                   ON CONFLICT (trip_id, day_number, user_id)
                   DO UPDATE SET activity_order = excluded.activity_order, updated_at = excluded.updated_at"#,
            )
            .bind(trip_id)
            .bind(day.day_number)
            .bind(encode_activities(&day.activities)?)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.db)
            .await?;
        }

        info!(user_id, trip_id, days = days.len(), "itinerary saved");
        Ok(days.len())
    }

    /// Rewrites already saved days. Days without a saved row are skipped silently.
    pub async fn update(
        &self,
        user_id: i64,
        trip_id: i64,
        days: &[DayOrder],
    ) -> Result<u64, AppError> {
        let planned = self.effective_days(trip_id).await?;
        ensure_permutations(&planned, days)?;

        let mut updated = 0;
        for day in days {
            updated += sqlx::query(
                "UPDATE saved_itinerary SET activity_order = ?1, updated_at = ?2 WHERE trip_id = ?3 AND day_number = ?4 AND user_id = ?5",
            )
            .bind(encode_activities(&day.activities)?)
            .bind(Utc::now())
            .bind(trip_id)
            .bind(day.day_number)
            .bind(user_id)
            .execute(&self.db)
            .await?
            .rows_affected();
        }

        info!(user_id, trip_id, updated, "itinerary updated");
        Ok(updated)
    }

    pub async fn saved_days(&self, user_id: i64, trip_id: i64) -> Result<Vec<SavedDay>, AppError> {
        let rows: Vec<SavedRow> = sqlx::query_as(
            "SELECT trip_id, day_number, activity_order FROM saved_itinerary WHERE trip_id = ?1 AND user_id = ?2 ORDER BY day_number",
        )
        .bind(trip_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SavedDay {
                    trip_id: row.trip_id,
                    day_number: row.day_number,
                    activities: decode_activities(&row.activity_order)?,
                })
            })
            .collect()
    }

    /// The days a trip is planned with: its template rows, or the built-in
    /// plan for its destination when it has none.
    pub async fn effective_days(&self, trip_id: i64) -> Result<Vec<ItineraryDay>, AppError> {
        let templates = self.template_days(trip_id).await?;
        if !templates.is_empty() {
            return Ok(templates);
        }

        let destination: Option<String> =
            sqlx::query_scalar("SELECT destination FROM trips WHERE id = ?1")
                .bind(trip_id)
                .fetch_optional(&self.db)
                .await?;
        let destination = destination.ok_or(AppError::NotFound)?;
        debug!(trip_id, destination = %destination, "no template rows, using default itinerary");
        Ok(default_itinerary(trip_id, &destination))
    }

    /// Planned days with the user's saved order laid over them.
    pub async fn personalized(
        &self,
        trip_id: i64,
        user_id: Option<i64>,
    ) -> Result<Vec<ItineraryDay>, AppError> {
        let planned = self.effective_days(trip_id).await?;
        let Some(user_id) = user_id else {
            return Ok(planned);
        };
        let saved = self.saved_days(user_id, trip_id).await?;
        Ok(overlay_saved(planned, saved))
    }
}

fn ensure_permutations(planned: &[ItineraryDay], days: &[DayOrder]) -> Result<(), AppError> {
    for day in days {
        let Some(template) = planned.iter().find(|t| t.day_number == day.day_number) else {
            return Err(AppError::Validation(format!(
                "day {} is not part of this itinerary",
                day.day_number
            )));
        };
        if !is_permutation(&template.activities, &day.activities) {
            return Err(AppError::Validation(format!(
                "day {} must contain exactly the planned activities",
                day.day_number
            )));
        }
    }
    Ok(())
}

fn overlay_saved(mut templates: Vec<ItineraryDay>, saved: Vec<SavedDay>) -> Vec<ItineraryDay> {
    let mut saved: HashMap<i64, Vec<String>> = saved
        .into_iter()
        .map(|day| (day.day_number, day.activities))
        .collect();

    for day in &mut templates {
        match saved.remove(&day.day_number) {
            Some(order) if is_permutation(&day.activities, &order) => day.activities = order,
            Some(_) => debug!(
                trip_id = day.trip_id,
                day = day.day_number,
                "saved order no longer matches template, ignoring"
            ),
            None => {}
        }
    }
    templates
}
