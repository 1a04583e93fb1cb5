use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub log_level: String,
}

impl AppConfig {
    /// Tracing filter directive used when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> String {
        format!("{},actix_web=debug", self.log_level)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("APP_PORT must be a valid port number")?,
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}
