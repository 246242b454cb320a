pub mod analysis;
pub mod booking;
pub mod calendar;
pub mod events;
pub mod health;
pub mod outreach;
pub mod vendors;
