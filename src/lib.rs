pub mod api;
pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
