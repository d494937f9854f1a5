pub mod itinerary;
pub mod trips;
