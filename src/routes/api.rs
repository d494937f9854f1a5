use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::{serde_as, NoneAsEmptyString};

use crate::{
    auth::CurrentUser,
    error::AppError,
    extract::JsonOrForm,
    models::{
        itinerary::{ItineraryDay, ItineraryPayload, SavedDay},
        trip::{NewTrip, Trip},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/trip", get(fetch_trip))
        .route("/api/saved-itinerary", get(fetch_saved_itinerary))
        .route("/create", post(create_trip))
        .route("/save-itinerary", post(save_itinerary))
        .route("/update-itinerary", post(update_itinerary))
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TripQuery {
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    trip_id: Option<i64>,
    #[serde(default)]
    destination: Option<String>,
}

#[derive(Debug, Serialize)]
struct TripDetails {
    trip: Trip,
    itinerary: Vec<ItineraryDay>,
}

async fn fetch_trip(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<TripDetails>, AppError> {
    let destination = query.destination.as_deref().filter(|d| !d.is_empty());
    let trip = state.trips.resolve(query.trip_id, destination).await?;
    let itinerary = state.itineraries.template_days(trip.id).await?;
    Ok(Json(TripDetails { trip, itinerary }))
}

async fn create_trip(
    State(state): State<AppState>,
    JsonOrForm(form): JsonOrForm<NewTrip>,
) -> Result<Redirect, AppError> {
    let trip = state.trips.create(&form).await?;
    let path: String = url::form_urlencoded::byte_serialize(trip.destination.as_bytes()).collect();
    Ok(Redirect::to(&format!("/{path}")))
}

async fn save_itinerary(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ItineraryPayload>,
) -> Result<Json<Value>, AppError> {
    let user = current.require_user()?;
    let days = state
        .itineraries
        .save(user.id, payload.trip_id, &payload.itinerary)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Itinerary saved successfully!",
        "days": days,
    })))
}

async fn update_itinerary(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ItineraryPayload>,
) -> Result<Json<Value>, AppError> {
    let user = current.require_user()?;
    let updated = state
        .itineraries
        .update(user.id, payload.trip_id, &payload.itinerary)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Itinerary updated successfully!",
        "updated": updated,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedQuery {
    trip_id: i64,
}

#[derive(Debug, Serialize)]
struct SavedItinerary {
    trip_id: i64,
    itinerary: Vec<SavedDay>,
}

async fn fetch_saved_itinerary(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<SavedQuery>,
) -> Result<Json<SavedItinerary>, AppError> {
    let user = current.require_user()?;
    let itinerary = state.itineraries.saved_days(user.id, query.trip_id).await?;
    Ok(Json(SavedItinerary {
        trip_id: query.trip_id,
        itinerary,
    }))
}
