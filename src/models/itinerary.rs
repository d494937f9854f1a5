use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// One day of a trip's template itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub trip_id: i64,
    pub day_number: i64,
    pub location: String,
    pub activities: Vec<String>,
}

/// A user's saved activity order for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDay {
    pub trip_id: i64,
    pub day_number: i64,
    pub activities: Vec<String>,
}

/// One day of a submitted reorder, as produced by the itinerary widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOrder {
    #[serde(alias = "day")]
    pub day_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub activities: Vec<String>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPayload {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub trip_id: i64,
    pub itinerary: Vec<DayOrder>,
}

/// Built-in itinerary shown on a destination page when a trip has no template rows.
pub fn default_itinerary(trip_id: i64, destination: &str) -> Vec<ItineraryDay> {
    let days: &[(&str, &[&str])] = match destination {
        "kerala" => &[
            ("Munnar", &["Tea Gardens", "Eravikulam National Park"]),
            ("Alleppey", &["Houseboat Cruise", "Vembanad Lake"]),
        ],
        "rajasthan" => &[
            ("Jaipur", &["Amber Fort", "Hawa Mahal", "City Palace"]),
            ("Udaipur", &["Lake Pichola", "City Palace Museum"]),
        ],
        _ => &[],
    };

    days.iter()
        .zip(1..)
        .map(|((location, activities), day_number)| ItineraryDay {
            trip_id,
            day_number,
            location: (*location).to_string(),
            activities: activities.iter().map(|a| (*a).to_string()).collect(),
        })
        .collect()
}
