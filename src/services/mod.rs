pub mod ai;
pub mod booking;
pub mod calendar;
pub mod classifier;
pub mod outreach;
pub mod places;
pub mod random;
pub mod rate_limit;
pub mod speech;
pub mod vendors;
pub mod zip;
