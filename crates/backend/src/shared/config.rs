use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub drafts: DraftsConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    pub submission: SubmissionConfig,
}

impl Config {
    /// Проверить значения, которые serde не может отсечь сам
    pub fn validate(&self) -> anyhow::Result<()> {
        self.drafts.ttl()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// JSON-файл со справочником категорий и характеристик
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DraftsConfig {
    pub dir: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Черновики старше этого срока считаются отсутствующими; 0 отключает срок
    #[serde(default)]
    pub ttl_hours: u64,
}

fn default_debounce_ms() -> u64 {
    1000
}

impl DraftsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn ttl(&self) -> anyhow::Result<Option<chrono::Duration>> {
        if self.ttl_hours == 0 {
            return Ok(None);
        }
        i64::try_from(self.ttl_hours)
            .ok()
            .and_then(chrono::TimeDelta::try_hours)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("drafts.ttl_hours is out of range: {}", self.ttl_hours))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionsConfig {
    /// Сессия без обращений дольше этого срока закрывается; 0 отключает
    #[serde(default = "default_idle_minutes")]
    pub idle_minutes: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_minutes: default_idle_minutes(),
        }
    }
}

fn default_idle_minutes() -> u64 {
    60
}

impl SessionsConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_minutes == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_minutes.saturating_mul(60)))
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Адрес обработчика создания позиции (multipart POST)
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[catalog]
path = "data/catalog.json"

[drafts]
dir = "target/drafts"
debounce_ms = 1000
ttl_hours = 168

[sessions]
idle_minutes = 60

[submission]
endpoint = "http://localhost:3000/api/warehouse/items"
timeout_secs = 30
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                config.validate()?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    config.validate()?;
    Ok(config)
}

/// Resolve a configured path: absolute paths are used as is,
/// relative ones are resolved against the executable directory
pub fn resolve_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(configured)
}
