use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::downloader::manager::DEFAULT_MAX_CONCURRENT;
use crate::errors::{AppError, Result};
use crate::i18n::Language;
use crate::search::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_LIMIT};

const ENV_PREFIX: &str = "SAVING_BOT";
const TOKEN_ENV: &str = "BOT_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BotConfig {
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,
    /// The only user allowed to run `/admin`.
    pub admin_user_id: u64,
    pub max_concurrent_downloads: usize,
    pub page_size: usize,
    /// Upper bound of candidates fetched per search call.
    pub search_limit: usize,
    pub read_timeout_secs: u64,
    pub stats_path: PathBuf,
    pub tmp_root: PathBuf,
    pub ytdlp_path: String,
    pub default_language: Language,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_user_id: 5151373754,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT,
            page_size: DEFAULT_PAGE_SIZE,
            search_limit: DEFAULT_SEARCH_LIMIT,
            read_timeout_secs: 600,
            stats_path: PathBuf::from("stats.json"),
            tmp_root: std::env::temp_dir().join("saving_bot_tmp"),
            ytdlp_path: "yt-dlp".to_string(),
            default_language: Language::Uz,
        }
    }
}

impl BotConfig {
    /// Layers the optional config file under `SAVING_BOT_*` environment
    /// overrides, then picks the token up from `BOT_TOKEN` if still unset.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        log::info!("Reading configuration from {:?}", config_path);
        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(path.is_some()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let mut loaded: BotConfig = settings.try_deserialize()?;
        loaded.apply_env_token();
        Ok(loaded)
    }

    /// Takes a non-blank `BOT_TOKEN` when no token is configured yet.
    pub fn apply_env_token(&mut self) {
        if self.token().is_err() {
            self.bot_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty());
        }
    }

    fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Config(config::ConfigError::Message("Could not find config directory".to_string())))?;

        Ok(config_dir.join("saving-bot").join("config.toml"))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Validation(format!("{} is not set", TOKEN_ENV)))
    }
}
