pub mod database;

pub use database::{Database, ObservationFilter, ObservationPage, StatsFilter};
