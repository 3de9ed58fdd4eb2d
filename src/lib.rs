pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod gifts;
pub mod state;
pub mod store;
pub mod telemetry;
