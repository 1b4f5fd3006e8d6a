pub mod checkin;
pub mod user;
