use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::core::GenericResult;
use crate::model::{DEFAULT_SECTIONS, Provenance};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub db_path: String,

    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    #[serde(default)]
    pub companies: Vec<CompanyConfig>,
}

impl Config {
    pub fn new(config_dir: &str) -> GenericResult<Config> {
        let config_path = Path::new(config_dir).join("config.yaml");

        let mut config = match fs::read_to_string(&config_path) {
            Ok(data) => parse_config(&data).map_err(|e| format!(
                "Error while reading {config_path:?} configuration file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{:?} doesn't exist. Using the default configuration.", config_path);
                Config::default()
            },
            Err(e) => return Err!("Unable to read {:?}: {}", config_path, e),
        };

        config.db_path = Path::new(config_dir).join("db.sqlite").to_str().ok_or_else(|| format!(
            "Invalid configuration directory path: {config_dir:?}"))?.to_owned();

        Ok(config)
    }

    pub fn get_company(&self, ticker: &str) -> GenericResult<&CompanyConfig> {
        for company in &self.companies {
            if company.ticker == ticker {
                return Ok(company);
            }
        }

        Err!("{:?} company is not defined in the configuration file", ticker)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            db_path: String::new(),
            sections: default_sections(),
            companies: Vec::new(),
        }
    }
}

fn default_sections() -> Vec<String> {
    DEFAULT_SECTIONS.iter().map(|&section| section.to_owned()).collect()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CompanyConfig {
    pub company: String,
    pub ticker: String,
    pub path: String,

    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub file_link: String,
}

impl CompanyConfig {
    pub fn provenance(&self) -> Provenance {
        Provenance {
            source: self.source.clone(),
            file_link: self.file_link.clone(),
        }
    }
}

fn parse_config(data: &str) -> GenericResult<Config> {
    let mut config: Config = serde_yaml::from_str(data)?;

    {
        let mut tickers = HashSet::new();

        for company in &config.companies {
            if !tickers.insert(&company.ticker) {
                return Err!("Duplicate company ticker: {:?}", company.ticker);
            }
        }
    }

    if config.sections.iter().any(|section| section.trim().is_empty()) {
        return Err!("Section labels mustn't be empty");
    }

    for company in &mut config.companies {
        company.path = shellexpand::tilde(&company.path).to_string();
    }

    Ok(config)
}
