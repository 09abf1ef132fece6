pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod profiles;
pub mod state;
pub mod validation;
