use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub trip_name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Trip {
    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            self.start_date.format("%d %b %Y"),
            self.end_date.format("%d %b %Y")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub trip_name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
