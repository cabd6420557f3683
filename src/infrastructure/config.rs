use crate::domain::source::{SheetSource, SourceKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub sheets: SheetsSettings,
    #[serde(default)]
    pub sources: Vec<SheetSource>,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub theme: ThemeSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub assets_dir: String,
    /// Mark the session cookie `Secure`; enable when served over HTTPS
    pub secure_cookies: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            assets_dir: "assets".to_string(),
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SheetsSettings {
    pub api_base: String,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            cache_ttl_secs: 300,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionSettings {
    pub live_hours: i64,
    pub remember_days: i64,
    pub demo_hours: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            live_hours: 8,
            remember_days: 30,
            demo_hours: 8,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    /// Substitute demo rows for sources whose fetch fails or comes back empty
    pub demo_fallback: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { demo_fallback: true }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ThemeSettings {
    pub brand: String,
    pub tagline: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub stylesheet: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            brand: "Metrics Dashboard".to_string(),
            tagline: "Business intelligence from your spreadsheets".to_string(),
            primary: "#4A90E2".to_string(),
            secondary: "#2E86AB".to_string(),
            accent: "#10B981".to_string(),
            background: "#F0F8FF".to_string(),
            stylesheet: "/assets/theme.css".to_string(),
        }
    }
}

impl AppConfig {
    /// Configured source for every key; keys missing from the file are unconfigured
    pub fn resolved_sources(&self) -> Vec<SheetSource> {
        SourceKey::ALL
            .into_iter()
            .map(|key| {
                self.sources
                    .iter()
                    .find(|s| s.key == key)
                    .map(|s| SheetSource::new(key, &s.sheet_id, s.worksheet.as_deref()))
                    .unwrap_or_else(|| SheetSource::new(key, "", None))
            })
            .collect()
    }
}

/// Load `config/dashboard.{toml,yaml,json}` if present, then `DASHBOARD__*` env overrides
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
