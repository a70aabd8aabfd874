// src/config/mod.rs

use std::str::FromStr;

/// Runtime configuration, read once at startup and carried in `AppState`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // ── Gemini Configuration
    pub google_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub completion_timeout_secs: u64,

    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Server Configuration
    pub host: String,
    pub port: u16,

    // ── Logging Configuration
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                default
            }
        },
        Err(_) => default,
    }
}

impl AppConfig {
    /// Load configuration from the environment. Values from a `.env` file are
    /// folded into the process environment first when the file exists.
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            google_api_key: env_var_or("GOOGLE_API_KEY", String::new()),
            gemini_base_url: env_var_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ),
            gemini_model: env_var_or("GEMINI_MODEL", "gemini-2.5-flash".to_string()),
            completion_timeout_secs: env_var_or("COMPLETION_TIMEOUT_SECS", 60),
            database_url: env_var_or("DATABASE_URL", "sqlite:parlor.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            host: env_var_or("PARLOR_HOST", "0.0.0.0".to_string()),
            port: env_var_or("PARLOR_PORT", 3000),
            log_level: env_var_or("PARLOR_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_env();

        assert!(!config.gemini_model.is_empty());
        assert!(!config.database_url.is_empty());
        assert!(config.completion_timeout_secs > 0);
        assert!(config.sqlite_max_connections > 0);
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::from_env();
        assert_eq!(config.bind_address(), format!("{}:{}", config.host, config.port));
    }

    #[test]
    fn test_env_var_or_falls_back_on_garbage() {
        // Unset variables and unparseable values both yield the default.
        assert_eq!(env_var_or("PARLOR_NO_SUCH_VAR", 42u16), 42);
    }
}
