pub mod auth;
pub mod config;
pub mod errors;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod structs;
pub mod utils;
pub mod views;
