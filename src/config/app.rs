//! # Application Configuration Loader
//!
//! Loads every setting once at startup and fails fast on missing required
//! values.
//!
//! Non-production environments load a dotenv file first: `DOTENV_FILE` if
//! set, otherwise `.env.{APP_ENV}`, falling back to `.env`.
//!
//! # Environment Variables
//! | Variable | Description | Default |
//! |-----------|-------------|----------|
//! | `APP_ENV` | `development`, `production`, ... | `"development"` |
//! | `DOTENV_FILE` | custom dotenv path | *none* |
//! | `BIND_ADDR` | listen address | `0.0.0.0:3000` |
//! | `DATABASE_URL` | MySQL connection URL | *none* (in-memory store outside production) |
//! | `HTTP_MAX_BODY_BYTES` / `HTTP_MAX_BODY_MB` | request body limit | `5` MB |
//! | `CORS_ORIGINS` / `CORS_CREDENTIALS` | CORS | `""` / `false` |
//! | `JWT_SECRET` | token signing secret | *required* |
//! | `CSRF_SECRET` | enables CSRF checks | *none* |
//! | `SPA_TEMPLATE` | HTML shell for page routes | built-in |
//! | `SEED_DEMO_DATA` | insert demo accounts and catalog at startup | `false` |
//!
//! See [`AuthConfig`] for the remaining auth variables.

use std::path::PathBuf;

use crate::config::{
    auth::AuthConfig,
    csrf::CsrfConfig,
    db::DbConfig,
    env::{process_env, read_flag_from, read_string_from},
    error::ConfigError,
    web::{CorsConfig, HttpConfig},
};

/// Top-level application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub app_env: String,
    pub db: DbConfig,
    pub http: HttpConfig,
    pub auth: AuthConfig,
    pub csrf: CsrfConfig,
    pub cors: CorsConfig,
    pub spa_template: Option<PathBuf>,
    /// Seed the demo data into a database-backed store. The in-memory
    /// store is always seeded.
    pub seed_demo_data: bool,
}

impl AppConfig {
    /// Loads the dotenv file (outside production) and then the process
    /// environment.
    ///
    /// # Errors
    /// [`ConfigError`] when a required variable such as `JWT_SECRET` is
    /// missing or a value is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = process_env("APP_ENV").unwrap_or_else(|| "development".into());

        if app_env != "production" {
            if let Some(path) = process_env("DOTENV_FILE") {
                let _ = dotenvy::from_filename(path);
            } else {
                let candidate = format!(".env.{}", app_env);
                dotenvy::from_filename(&candidate)
                    .or_else(|_| dotenvy::dotenv())
                    .ok();
            }
        }

        Self::from_env_with(process_env)
    }

    /// Builds the configuration from an arbitrary provider.
    pub fn from_env_with<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = read_string_from(&get, "APP_ENV").unwrap_or_else(|| "development".into());
        let production = app_env == "production";

        Ok(AppConfig {
            db: DbConfig::from_env_with(&get),
            http: HttpConfig::from_env_with(&get),
            auth: AuthConfig::from_env_with(&get, production)?,
            csrf: CsrfConfig::from_env_with(&get),
            cors: CorsConfig::from_env_with(&get),
            spa_template: read_string_from(&get, "SPA_TEMPLATE").map(PathBuf::from),
            seed_demo_data: read_flag_from(&get, "SEED_DEMO_DATA", false),
            app_env,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    pub fn is_csrf_enabled(&self) -> bool {
        self.csrf.is_enabled()
    }
}
