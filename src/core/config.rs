use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "xavier.toml";

/// Settings read from `<data_dir>/xavier.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XavierConfig {
    pub api_host: String,
    pub api_port: u16,
    /// SQLite file, relative to the data dir unless absolute.
    pub database: String,
    pub log_level: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for XavierConfig {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 5000,
            database: "xavier.db".to_string(),
            log_level: "info".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl XavierConfig {
    pub async fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let config_path = data_dir.as_ref().join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config in {}", config_path.display()))
    }

    /// `PORT` wins over the file, as the hosting environment sets it. An
    /// unparsable value leaves the port unchanged and is returned as an error.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        let Some(raw) = port else {
            return Ok(());
        };
        let port = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| anyhow!("Ignoring invalid PORT value '{}'", raw))?;
        self.api_port = port;
        Ok(())
    }

    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        let path = Path::new(&self.database);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            data_dir.join(path)
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// `XAVIER_DATA_DIR` if set, otherwise `~/.xavier`.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(std::env::var("XAVIER_DATA_DIR").ok())
}

fn resolve_data_dir(env_value: Option<String>) -> PathBuf {
    if let Some(dir) = env_value.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".xavier")
}
