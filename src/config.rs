use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Everything the application needs at startup. Loaded once in `main`
/// and passed down; nothing else reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub template_dir: String,
    pub static_dir: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:8000"),
            database_url: try_load("DATABASE_URL", "sqlite://idgate.db"),
            gemini_api_key: env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set"),
            gemini_model: try_load("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: try_load(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            template_dir: try_load("TEMPLATE_DIR", "templates"),
            static_dir: try_load("STATIC_DIR", "static"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
