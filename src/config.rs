use std::fs;

use iced::Theme;
use serde::{Deserialize, Serialize};

use crate::screens::settings::theme_to_str;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Локальные настройки клиента. Токен доступа живёт здесь же: читается один
/// раз при старте, записывается при входе и стирается при выходе.
#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Config {
    pub theme_name: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Config {
    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

pub fn load_config() -> Option<Config> {
    let contents = fs::read_to_string(CONFIG_FILE).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn save_config(config: &Config) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(CONFIG_FILE, json)?;
    Ok(())
}

pub fn theme_from_str(name: &str) -> Option<Theme> {
    Theme::ALL
        .iter()
        .find(|t| theme_to_str(t).eq_ignore_ascii_case(name))
        .cloned()
}

pub fn load_theme() -> Option<Theme> {
    load_config().and_then(|c| theme_from_str(&c.theme_name))
}
