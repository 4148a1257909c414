use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::{debug, warn};

use crate::domain::{FeeRates, RateError};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "ListingNetReport";
const APP_NAME: &str = "ListingNetReport";
const SETTINGS_FILE: &str = "settings.json";

/// Operator defaults. Command-line flags take precedence over these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tax_rate_pct: Decimal,
    pub partner_commission_pct: Decimal,
    pub include_links: bool,
    pub agency_name: String,
    pub currency_symbol: String,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax_rate_pct: Decimal::ZERO,
            partner_commission_pct: Decimal::ZERO,
            include_links: true,
            agency_name: "Seller Desk".to_string(),
            currency_symbol: "R$".to_string(),
            http_timeout_secs: 20,
        }
    }
}

impl Settings {
    pub fn rates(&self) -> Result<FeeRates, RateError> {
        FeeRates::new(self.tax_rate_pct, self.partner_commission_pct)
    }
}

/// Location of `settings.json` in the platform config directory.
pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Loads settings from the default location, falling back to defaults.
pub fn load_settings() -> Settings {
    match settings_file() {
        Some(path) => load_settings_from(&path),
        None => {
            debug!("no config directory available; using default settings");
            Settings::default()
        }
    }
}

/// Missing file means defaults. A malformed file is reported and ignored.
pub fn load_settings_from(path: &Path) -> Settings {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "settings file not found; using defaults");
            return Settings::default();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read settings; using defaults");
            return Settings::default();
        }
    };

    serde_json::from_str(&data).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "malformed settings file; using defaults");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf, SettingsError> {
    let path = settings_file().ok_or(SettingsError::StorageUnavailable)?;
    save_settings_to(settings, &path)?;
    Ok(path)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = Settings {
            tax_rate_pct: dec!(12.5),
            partner_commission_pct: dec!(10),
            include_links: false,
            agency_name: "Loja Parceira".to_string(),
            ..Settings::default()
        };

        save_settings_to(&settings, &path).unwrap();

        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "agency_name": "Acme" }"#).unwrap();

        let settings = load_settings_from(&path);

        assert_eq!(settings.agency_name, "Acme");
        assert_eq!(settings.currency_symbol, "R$");
        assert!(settings.include_links);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn negative_rate_in_settings_is_rejected() {
        let settings = Settings {
            tax_rate_pct: dec!(-3),
            ..Settings::default()
        };
        assert!(settings.rates().is_err());
    }
}
