pub mod itinerary;
pub mod session;
pub mod trip;
pub mod user;
