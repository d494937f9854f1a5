use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::trip::Trip,
    reorder::{DayList, ReorderBoard},
    state::AppState,
};

pub const DESTINATIONS: [&str; 2] = ["rajasthan", "kerala"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/startplanning", get(start_planning))
        .route("/rajasthan", get(rajasthan))
        .route("/kerala", get(kerala))
        .route("/saved-itinerary", get(saved_itinerary))
}

#[derive(Template)]
#[template(path = "index.html")]
struct HomeTemplate {
    logged_in: bool,
}

async fn home(current: CurrentUser) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(HomeTemplate {
        logged_in: current.user_id().is_some(),
    })
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    username: String,
}

async fn dashboard(current: CurrentUser) -> Response {
    match current.0 {
        Some(user) => AskamaTemplateResponse::into_response(DashboardTemplate {
            username: user.username,
        }),
        None => Redirect::to("/login").into_response(),
    }
}

#[derive(Template)]
#[template(path = "startplanning.html")]
struct StartPlanningTemplate {
    destinations: Vec<&'static str>,
}

async fn start_planning() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(StartPlanningTemplate {
        destinations: DESTINATIONS.to_vec(),
    })
}

#[derive(Template)]
#[template(path = "destination.html")]
struct DestinationTemplate {
    title: String,
    trip: Option<Trip>,
    days: Vec<DayList>,
    itinerary_json: String,
    logged_in: bool,
}

async fn rajasthan(state: State<AppState>, current: CurrentUser) -> Result<Response, AppError> {
    destination_page(state, current, "rajasthan").await
}

async fn kerala(state: State<AppState>, current: CurrentUser) -> Result<Response, AppError> {
    destination_page(state, current, "kerala").await
}

async fn destination_page(
    State(state): State<AppState>,
    current: CurrentUser,
    destination: &str,
) -> Result<Response, AppError> {
    let trip = state.trips.latest_for_destination(destination).await?;
    let board = match &trip {
        Some(trip) => ReorderBoard::new(
            state
                .itineraries
                .personalized(trip.id, current.user_id())
                .await?,
        ),
        None => ReorderBoard::default(),
    };

    Ok(AskamaTemplateResponse::into_response(DestinationTemplate {
        title: title_case(destination),
        itinerary_json: embed_json(&board)?,
        days: board.days().to_vec(),
        trip,
        logged_in: current.user_id().is_some(),
    }))
}

async fn saved_itinerary() -> Redirect {
    Redirect::to("/rajasthan")
}

/// JSON for an inline `<script type="application/json">` block.
fn embed_json(board: &ReorderBoard) -> Result<String, AppError> {
    let raw = serde_json::to_string(&board.snapshot()).map_err(|err| AppError::Other(err.into()))?;
    Ok(raw.replace('<', "\\u003c"))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::ItineraryDay;

    #[test]
    fn title_case_capitalizes_first_letter() {
        assert_eq!(title_case("kerala"), "Kerala");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn embedded_json_cannot_close_script_tag() {
        let board = ReorderBoard::new(vec![ItineraryDay {
            trip_id: 1,
            day_number: 1,
            location: "Kochi".into(),
            activities: vec!["</script><b>".into()],
        }]);
        let json = embed_json(&board).unwrap();
        assert!(!json.contains("</script>"));
        assert!(json.contains("\\u003c/script>"));
    }
}
