pub mod app;
pub mod auth;
pub mod csrf;
pub mod db;
pub mod env;
pub mod error;
pub mod web;

pub use app::AppConfig;
pub use error::ConfigError;
