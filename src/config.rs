use dotenvy::dotenv;
use log::error;
use serde::Deserialize;
use std::env;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub pricing_dataset_path: String,
    pub delay_dataset_path: String,
    pub model_path: String,
    pub http_bind_address: String,
    pub dashboard_bind_address: String,
    pub sample_size: usize,
    /// Fixes the rng behind `/sample` when set.
    pub sample_seed: Option<u64>,
    /// Check categorical inputs against the model's known categories before inference.
    pub strict_categories: bool,
    pub late_threshold_minutes: f64,
    pub histogram_bins: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pricing_dataset_path: "data/get_around_pricing_project.csv".to_string(),
            delay_dataset_path: "data/get_around_delay_analysis.csv".to_string(),
            model_path: "data/pricing_model.json".to_string(),
            http_bind_address: "0.0.0.0:4000".to_string(),
            dashboard_bind_address: "0.0.0.0:8501".to_string(),
            sample_size: 5,
            sample_seed: None,
            strict_categories: true,
            late_threshold_minutes: 10.0,
            histogram_bins: 40,
            log_level: "info".to_string(),
        }
    }
}

pub fn create_test_config() -> Config {
    let fixtures = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
    Config {
        pricing_dataset_path: format!("{fixtures}/pricing.csv"),
        delay_dataset_path: format!("{fixtures}/delay_analysis.csv"),
        model_path: format!("{fixtures}/pricing_model.json"),
        http_bind_address: "127.0.0.1:0".to_string(),
        dashboard_bind_address: "127.0.0.1:0".to_string(),
        sample_seed: Some(42),
        histogram_bins: 10,
        ..Config::default()
    }
}

pub fn parse_config(text: &str) -> Result<Config, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}

/// Reads the TOML file named by `CONFIG_PATH`, falling back to defaults when the
/// variable is unset. Exits the process on an unreadable or invalid file.
pub fn read_config() -> Config {
    dotenv().ok();
    let config_path = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => path,
        Err(_) => return Config::default(),
    };

    std::fs::read_to_string(&config_path)
        .map_err(|e| format!("{config_path}: {e}"))
        .and_then(|text| parse_config(&text))
        .unwrap_or_else(|err| {
            error!("failed to read config: {err}");
            std::process::exit(1);
        })
}
