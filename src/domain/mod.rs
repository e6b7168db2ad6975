pub mod alerts;
pub mod calendar;
pub mod insights;
pub mod weather;
