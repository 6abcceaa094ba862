use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://service-2-backend-production.up.railway.app/api";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_url: Option<String>,
    token_file: Option<PathBuf>,
    log_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token_file: PathBuf,
    pub log_file: PathBuf,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Defaults, then `config.toml`, then environment (including `.env`).
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let dirs = directories::ProjectDirs::from("", "", "inkaranya");

        let (config_path, data_dir) = match &dirs {
            Some(dirs) => (
                Some(dirs.config_dir().join("config.toml")),
                dirs.data_dir().to_path_buf(),
            ),
            None => (None, PathBuf::from(".")),
        };

        let file = match config_path.as_deref() {
            Some(path) if path.exists() => Self::read_file(path)?,
            _ => FileConfig::default(),
        };

        let mut config = Self::resolve(file, &data_dir);
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn resolve(file: FileConfig, data_dir: &Path) -> Self {
        Self {
            api_url: file.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_file: file.token_file.unwrap_or_else(|| data_dir.join("token")),
            log_file: file.log_file.unwrap_or_else(|| data_dir.join("inkaranya.log")),
            timeout_secs: file.timeout_secs,
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("INKARANYA_API_URL").filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(path) = var("INKARANYA_TOKEN_FILE").filter(|v| !v.is_empty()) {
            self.token_file = PathBuf::from(path);
        }
        if let Some(secs) = var("INKARANYA_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            let parsed: u64 = secs
                .parse()
                .with_context(|| format!("INKARANYA_TIMEOUT_SECS must be a number, got '{}'", secs))?;
            if parsed == 0 {
                bail!("INKARANYA_TIMEOUT_SECS must be at least 1");
            }
            self.timeout_secs = Some(parsed);
        }
        Ok(())
    }

    /// Zero from the config file means no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = Config::resolve(FileConfig::default(), Path::new("/data"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_file, PathBuf::from("/data/token"));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_file_values_then_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://localhost:5000/api\"\ntimeout_secs = 10\n",
        )
        .unwrap();

        let file = Config::read_file(&path).unwrap();
        let mut config = Config::resolve(file, dir.path());
        assert_eq!(config.api_url, "http://localhost:5000/api");
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));

        let env: HashMap<&str, &str> = [
            ("INKARANYA_API_URL", "http://staging/api"),
            ("INKARANYA_TOKEN_FILE", "/tmp/tok"),
        ]
        .into_iter()
        .collect();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_url, "http://staging/api");
        assert_eq!(config.token_file, PathBuf::from("/tmp/tok"));
        assert_eq!(config.timeout_secs, Some(10));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let mut config = Config::resolve(FileConfig::default(), Path::new("."));
        let result = config.apply_env(|key| {
            (key == "INKARANYA_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_never_reaches_the_client() {
        let mut config = Config::resolve(FileConfig::default(), Path::new("."));
        let result = config.apply_env(|key| {
            (key == "INKARANYA_TIMEOUT_SECS").then(|| "0".to_string())
        });
        assert!(result.is_err());
        assert_eq!(config.timeout(), None);

        let file = FileConfig {
            timeout_secs: Some(0),
            ..FileConfig::default()
        };
        assert_eq!(Config::resolve(file, Path::new(".")).timeout(), None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [").unwrap();
        assert!(Config::read_file(&path).is_err());
    }
}
