use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::email::{Category, DEFAULT_COUNT, SearchCriteria};

/// User defaults. The app password is deliberately not part of it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub user_email: Option<String>,
    pub imap_server: Option<String>,
    pub category: Option<String>,
    pub count: Option<usize>,
    pub speech_command: Option<String>,
}

impl Config {
    pub fn criteria(&self) -> SearchCriteria {
        let category = self
            .category
            .as_deref()
            .map(Category::from_label)
            .unwrap_or_default();
        SearchCriteria::new(category, self.count.unwrap_or(DEFAULT_COUNT))
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mail_speaker"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Reads `path`. A missing file is created from a template and defaults are used.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config {
            user_email: None,
            imap_server: None,
            category: Some(Category::default().label().to_string()),
            count: Some(DEFAULT_COUNT),
            speech_command: None,
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(path, tom)?;
        log::info!("created template config at {}", path.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}
