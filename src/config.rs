use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Criteria, ProviderSpec};
use crate::error::AbSearchError;
use crate::providers::default_providers;

pub const CONFIG_FILE_NAME: &str = "absearch.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub criteria: Option<Criteria>,
}

/// Criteria and provider values given on the command line. Every set field
/// replaces the config file's value.
#[derive(Debug, Clone, Default)]
pub struct CriteriaOverrides {
    pub species_reactivity: Vec<String>,
    pub host_species: Vec<String>,
    pub clonality: Vec<String>,
    pub applications: Vec<String>,
    pub conjugation: Vec<String>,
    pub min_citations: Option<u32>,
    pub max_price: Option<f64>,
    pub min_amount_ug: Option<f64>,
    pub providers: Vec<String>,
    pub headless: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub providers: Vec<ProviderSpec>,
    pub criteria: Criteria,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `path` if given (it must exist), else `absearch.json` in the
    /// current directory, else the per-user config file. No file at all
    /// means defaults.
    pub fn resolve(
        path: Option<&str>,
        overrides: CriteriaOverrides,
    ) -> Result<ResolvedConfig, AbSearchError> {
        let config = match Self::locate(path) {
            Some(config_path) => Self::read(config_path)?,
            None => Config::default(),
        };
        Self::resolve_config(config, overrides)
    }

    fn locate(path: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("", "", "absearch")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|user| user.exists())
    }

    fn read(config_path: PathBuf) -> Result<Config, AbSearchError> {
        let content = fs::read_to_string(&config_path)
            .map_err(|_| AbSearchError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| AbSearchError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: CriteriaOverrides,
    ) -> Result<ResolvedConfig, AbSearchError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let provider_names = if overrides.providers.is_empty() {
            config.providers
        } else {
            overrides.providers
        };
        let mut providers = provider_names
            .iter()
            .map(|name| parse_provider(name))
            .collect::<Result<Vec<_>, AbSearchError>>()?;
        if overrides.headless {
            warn!("headless rendering is not supported, fetching static HTML");
        }
        if providers.is_empty() {
            providers = default_providers();
        }

        let mut criteria = config.criteria.unwrap_or_default();
        replace_list(&mut criteria.species_reactivity, overrides.species_reactivity);
        replace_list(&mut criteria.host_species, overrides.host_species);
        replace_list(&mut criteria.clonality, overrides.clonality);
        replace_list(&mut criteria.applications, overrides.applications);
        replace_list(&mut criteria.conjugation, overrides.conjugation);
        if overrides.min_citations.is_some() {
            criteria.min_citations = overrides.min_citations;
        }
        if overrides.max_price.is_some() {
            criteria.max_price = overrides.max_price;
        }
        if overrides.min_amount_ug.is_some() {
            criteria.min_amount_ug = overrides.min_amount_ug;
        }
        if criteria
            .species_reactivity
            .as_ref()
            .is_none_or(|species| species.is_empty())
        {
            criteria.species_reactivity = Some(default_species_reactivity());
        }

        Ok(ResolvedConfig {
            schema_version,
            providers,
            criteria,
        })
    }
}

/// Parse `name` or `name:mode`. Only static fetching exists, so a mode is
/// accepted and ignored.
fn parse_provider(value: &str) -> Result<ProviderSpec, AbSearchError> {
    let (name, mode) = match value.split_once(':') {
        Some((name, mode)) => (name, Some(mode.trim())),
        None => (value, None),
    };
    let spec = name.parse::<ProviderSpec>()?;
    if let Some(mode) = mode.filter(|mode| !mode.is_empty()) {
        warn!(provider = %spec, mode, "provider mode is not supported, fetching static HTML");
    }
    Ok(spec)
}

fn replace_list(slot: &mut Option<Vec<String>>, values: Vec<String>) {
    if !values.is_empty() {
        *slot = Some(values);
    }
}

pub fn default_species_reactivity() -> Vec<String> {
    vec!["Human".to_string()]
}
