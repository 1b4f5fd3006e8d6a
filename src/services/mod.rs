//! Pure computations over a user's check-ins. Handlers load rows and hand
//! them here; nothing in this module touches the database.

pub mod calendar;
pub mod export;
pub mod streak;
pub mod trends;
