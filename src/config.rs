use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.net".into(),
            user_agent: "NutriTrackerBot/1.0 (contact@example.com)".into(),
            timeout_ms: 10_000,
            retries: 2,
            retry_delay_ms: 350,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Shared secret expected in `X-Webhook-Secret`; `None` disables the check.
    pub webhook_secret: Option<String>,
    pub catalog: CatalogConfig,
    pub barcode_decoder_url: Option<String>,
    pub barcode_decoder_timeout_ms: u64,
    /// Directory `pic_save` writes images into.
    pub image_save_dir: String,
    /// `0` keeps abandoned flows forever.
    pub session_idle_timeout_minutes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            database_url: None,
            webhook_secret: None,
            catalog: CatalogConfig::default(),
            barcode_decoder_url: None,
            barcode_decoder_timeout_ms: 15_000,
            image_save_dir: "downloads".into(),
            session_idle_timeout_minutes: 60,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_defaults = AppConfig::default();
        let defaults = CatalogConfig::default();
        let catalog = CatalogConfig {
            base_url: std::env::var("OFF_BASE_URL").unwrap_or(defaults.base_url),
            user_agent: std::env::var("OFF_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_ms: env_number("OFF_TIMEOUT_MS").unwrap_or(defaults.timeout_ms),
            retries: env_number("OFF_RETRIES").unwrap_or(defaults.retries),
            retry_delay_ms: env_number("OFF_RETRY_DELAY_MS").unwrap_or(defaults.retry_delay_ms),
        };
        Ok(Self {
            host: env_non_empty("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: env_number("APP_PORT").unwrap_or(8080),
            database_url: env_non_empty("DATABASE_URL"),
            webhook_secret: env_non_empty("WEBHOOK_SECRET"),
            catalog,
            barcode_decoder_url: env_non_empty("BARCODE_DECODER_URL"),
            barcode_decoder_timeout_ms: env_number("BARCODE_DECODER_TIMEOUT_MS")
                .unwrap_or(app_defaults.barcode_decoder_timeout_ms),
            image_save_dir: env_non_empty("IMAGE_SAVE_DIR").unwrap_or(app_defaults.image_save_dir),
            session_idle_timeout_minutes: env_number("SESSION_IDLE_TIMEOUT_MINUTES")
                .unwrap_or(app_defaults.session_idle_timeout_minutes),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn barcode_decoder_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.barcode_decoder_timeout_ms)
    }

    pub fn session_idle_timeout(&self) -> Option<time::Duration> {
        match self.session_idle_timeout_minutes {
            0 => None,
            minutes => Some(time::Duration::minutes(minutes as i64)),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_timeout_zero_disables_expiry() {
        let config = AppConfig {
            session_idle_timeout_minutes: 0,
            ..AppConfig::default()
        };
        assert!(config.session_idle_timeout().is_none());
    }

    #[test]
    fn idle_timeout_is_in_minutes() {
        let config = AppConfig::default();
        assert_eq!(config.session_idle_timeout(), Some(time::Duration::minutes(60)));
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn decoder_timeout_defaults_to_fifteen_seconds() {
        let config = AppConfig::default();
        assert_eq!(config.barcode_decoder_timeout(), std::time::Duration::from_secs(15));

        let config = AppConfig {
            barcode_decoder_timeout_ms: 250,
            ..AppConfig::default()
        };
        assert_eq!(config.barcode_decoder_timeout(), std::time::Duration::from_millis(250));
    }
}
