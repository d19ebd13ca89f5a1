use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub fiscal: FiscalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Empty means: generate once and keep it in `sys_settings`
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_admin_password")]
    pub bootstrap_admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FiscalConfig {
    /// Year of the actual sales; budgets are entered for the year after
    #[serde(default = "default_actuals_year")]
    pub actuals_year: i32,
}

fn default_port() -> u16 {
    8000
}

fn default_token_minutes() -> i64 {
    24 * 60
}

fn default_admin_password() -> String {
    "admin".to_string()
}

fn default_actuals_year() -> i32 {
    2025
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_minutes: default_token_minutes(),
            bootstrap_admin_password: default_admin_password(),
        }
    }
}

impl Default for FiscalConfig {
    fn default() -> Self {
        Self {
            actuals_year: default_actuals_year(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "target/db/dashboard.db".to_string(),
            },
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            fiscal: FiscalConfig::default(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/dashboard.db"

[server]
port = 8000

[auth]
jwt_secret = ""
access_token_minutes = 1440
bootstrap_admin_password = "admin"

[fiscal]
actuals_year = 2025
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

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
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Make `config` the process-wide configuration. Only the first call wins.
pub fn install(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already installed, keeping the first one");
    }
}

/// Process-wide configuration; defaults when nothing was installed
pub fn current() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}
