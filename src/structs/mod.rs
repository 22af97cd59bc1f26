pub mod auth;
pub mod shifts;
pub mod ui;
