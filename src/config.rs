//! Application configuration
//!
//! All configuration is loaded once at startup into an immutable [`AppConfig`]
//! and accessed through [`get_config`]. Priority: environment variables
//! (prefix `LP`, separator `__`, e.g. `LP__SERVER__PORT=9000`) over
//! `config.toml` over built-in defaults. `.env` files are honored via dotenvy.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global configuration, loading it on first use.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}

/// Install a specific configuration (used by tests). No-op if already set.
pub fn init_config(config: AppConfig) {
    let _ = CONFIG.set(config);
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` and `LP__`-prefixed env vars.
    pub fn load() -> Self {
        use config::{Config, Environment, File};

        dotenvy::dotenv().ok();

        let builder = Config::builder()
            .add_source(File::with_name("config.toml").required(false))
            .add_source(
                Environment::with_prefix("LP")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<AppConfig>() {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL used when constructing short links
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            base_url: "http://localhost:4000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlite://, mysql:// or postgres:// URL
    pub url: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://linkpulse.db?mode=rwc".to_string(),
            pool_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "linkpulse=debug,info"
    pub level: String,
    /// "plain" or "json"
    pub format: String,
    /// Log file path; empty or unset logs to stdout
    pub file: Option<String>,
    pub enable_rotation: bool,
    pub max_backups: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
            file: None,
            enable_rotation: true,
            max_backups: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// JWT signing secret; a random one is generated when empty
    pub jwt_secret: String,
    pub access_token_minutes: u64,
    pub refresh_token_days: u64,
    /// Allowed CORS origins; empty list allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_minutes: 15,
            refresh_token_days: 7,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Which signal drives channel attribution for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AttributionMode {
    /// Match the User-Agent against the in-app/browser rule table
    #[default]
    UserAgent,
    /// Match the short-code prefix against the campaign prefix table
    ShortCode,
}

impl FromStr for AttributionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user-agent" | "user_agent" => Ok(Self::UserAgent),
            "short-code" | "short_code" => Ok(Self::ShortCode),
            _ => Err(format!(
                "Invalid attribution mode: '{}'. Valid: user-agent, short-code",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// IANA timezone name used for all dashboard date bucketing
    pub display_timezone: String,
    pub attribution_mode: AttributionMode,
    /// Path to a GeoLite2-City mmdb file; geo lookups are disabled when unset
    pub maxminddb_path: Option<String>,
    /// Public IP substituted for loopback addresses so dev traffic still
    /// resolves to some location
    pub geo_fallback_ip: String,
    /// Fixed chart palette, cycled over breakdown categories in
    /// descending-count order
    pub chart_palette: Vec<String>,
    /// Database-native city name -> display-preferred localized name
    pub city_translations: HashMap<String, String>,
    pub random_code_length: usize,
}

impl AnalyticsConfig {
    /// Parsed display timezone; invalid names fall back to UTC.
    pub fn display_tz(&self) -> Tz {
        self.display_timezone.parse().unwrap_or(Tz::UTC)
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let city_translations: HashMap<String, String> = [
            ("Ho Chi Minh City", "TP. Hồ Chí Minh"),
            ("Hanoi", "Hà Nội"),
            ("Da Nang", "Đà Nẵng"),
            ("Can Tho", "Cần Thơ"),
            ("Hue", "Huế"),
            ("Haiphong", "Hải Phòng"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            display_timezone: "Asia/Ho_Chi_Minh".to_string(),
            attribution_mode: AttributionMode::default(),
            maxminddb_path: None,
            geo_fallback_ip: "8.8.8.8".to_string(),
            chart_palette: [
                "#6366F1", // Indigo
                "#10B981", // Emerald
                "#F59E0B", // Amber
                "#EF4444", // Red
                "#8B5CF6", // Violet
                "#EC4899", // Pink
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            city_translations,
            random_code_length: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_tz_parses() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.display_tz().name(), "Asia/Ho_Chi_Minh");
    }

    #[test]
    fn test_invalid_tz_falls_back_to_utc() {
        let config = AnalyticsConfig {
            display_timezone: "Not/AZone".to_string(),
            ..Default::default()
        };
        assert_eq!(config.display_tz(), Tz::UTC);
    }

    #[test]
    fn test_attribution_mode_from_str() {
        assert_eq!(
            "user-agent".parse::<AttributionMode>().unwrap(),
            AttributionMode::UserAgent
        );
        assert_eq!(
            "short_code".parse::<AttributionMode>().unwrap(),
            AttributionMode::ShortCode
        );
        assert!("banner".parse::<AttributionMode>().is_err());
    }

    #[test]
    fn test_palette_has_six_colors() {
        assert_eq!(AnalyticsConfig::default().chart_palette.len(), 6);
    }
}
