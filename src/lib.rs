pub mod config;
pub mod domain;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;
