pub mod api;
pub mod auth;
pub mod config;
pub mod curriculum;
pub mod db;
pub mod error;
pub mod external;
pub mod models;
pub mod services;
pub mod state;
