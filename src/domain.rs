use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AbSearchError;

/// Canonical application codes that free-text vendor labels are normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationCode {
    #[serde(rename = "ICFC")]
    Icfc,
    #[serde(rename = "ICC")]
    Icc,
    #[serde(rename = "IHC")]
    Ihc,
    #[serde(rename = "WB")]
    Wb,
    #[serde(rename = "IF")]
    If,
    #[serde(rename = "FC")]
    Fc,
    #[serde(rename = "ELISA")]
    Elisa,
    #[serde(rename = "IP")]
    Ip,
    #[serde(rename = "ChIP")]
    Chip,
    #[serde(rename = "RIP")]
    Rip,
    #[serde(rename = "DotBlot")]
    DotBlot,
}

impl ApplicationCode {
    pub const ALL: [ApplicationCode; 11] = [
        ApplicationCode::Icfc,
        ApplicationCode::Icc,
        ApplicationCode::Ihc,
        ApplicationCode::Wb,
        ApplicationCode::If,
        ApplicationCode::Fc,
        ApplicationCode::Elisa,
        ApplicationCode::Ip,
        ApplicationCode::Chip,
        ApplicationCode::Rip,
        ApplicationCode::DotBlot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationCode::Icfc => "ICFC",
            ApplicationCode::Icc => "ICC",
            ApplicationCode::Ihc => "IHC",
            ApplicationCode::Wb => "WB",
            ApplicationCode::If => "IF",
            ApplicationCode::Fc => "FC",
            ApplicationCode::Elisa => "ELISA",
            ApplicationCode::Ip => "IP",
            ApplicationCode::Chip => "ChIP",
            ApplicationCode::Rip => "RIP",
            ApplicationCode::DotBlot => "DotBlot",
        }
    }
}

impl fmt::Display for ApplicationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationCode {
    type Err = AbSearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        ApplicationCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AbSearchError::InvalidApplicationCode(value.to_string()))
    }
}

/// A formulation property that a vendor may state explicitly, deny explicitly,
/// or not mention at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum TriState {
    Yes,
    No,
    #[default]
    Unknown,
}

impl TriState {
    pub fn is_yes(&self) -> bool {
        matches!(self, TriState::Yes)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TriState::Unknown)
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => TriState::Yes,
            Some(false) => TriState::No,
            None => TriState::Unknown,
        }
    }
}

impl From<TriState> for Option<bool> {
    fn from(value: TriState) -> Self {
        match value {
            TriState::Yes => Some(true),
            TriState::No => Some(false),
            TriState::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageOption {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub amount_ug: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub concentration_mg_per_ml: Option<f64>,
    #[serde(default)]
    pub volume_ul: Option<f64>,
}

/// One vendor listing for an antibody reagent.
///
/// Records are never modified after a provider builds them; filtering, ranking
/// and package selection all work on shared references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub vendor: String,
    pub catalog_number: String,
    pub name: String,
    pub target: String,

    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub datasheet_url: Option<String>,

    #[serde(default)]
    pub host_species: Option<String>,
    #[serde(default)]
    pub clonality: Option<String>,
    #[serde(default)]
    pub clone: Option<String>,
    #[serde(default)]
    pub isotype: Option<String>,

    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub validated_reactivity: Vec<String>,

    #[serde(default)]
    pub conjugation: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub formulation: Option<String>,
    #[serde(default)]
    pub is_bsa_free: TriState,
    #[serde(default)]
    pub is_gelatin_free: TriState,
    #[serde(default)]
    pub is_ascites_free: TriState,

    #[serde(default)]
    pub amount_ug: Option<f64>,
    #[serde(default)]
    pub concentration_mg_per_ml: Option<f64>,
    #[serde(default)]
    pub volume_ul: Option<f64>,

    #[serde(default)]
    pub package_options: Vec<PackageOption>,

    #[serde(default)]
    pub citations_count: Option<u32>,
    #[serde(default)]
    pub validation_images: Option<u32>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Record {
    pub fn purity_flags(&self) -> [TriState; 3] {
        [self.is_bsa_free, self.is_gelatin_free, self.is_ascites_free]
    }
}

/// Filter specification. Empty lists behave exactly like absent ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub species_reactivity: Option<Vec<String>>,
    #[serde(default)]
    pub host_species: Option<Vec<String>>,
    #[serde(default)]
    pub clonality: Option<Vec<String>>,
    #[serde(default)]
    pub applications: Option<Vec<String>>,
    #[serde(default)]
    pub conjugation: Option<Vec<String>>,

    #[serde(default)]
    pub min_citations: Option<u32>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default = "default_min_amount_ug")]
    pub min_amount_ug: Option<f64>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            species_reactivity: None,
            host_species: None,
            clonality: None,
            applications: None,
            conjugation: None,
            min_citations: None,
            max_price: None,
            min_amount_ug: default_min_amount_ug(),
        }
    }
}

fn default_min_amount_ug() -> Option<f64> {
    Some(crate::selection::DEFAULT_MIN_AMOUNT_UG)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSpec {
    Abcam,
    Mock,
}

impl ProviderSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderSpec::Abcam => "abcam",
            ProviderSpec::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderSpec {
    type Err = AbSearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abcam" => Ok(ProviderSpec::Abcam),
            "mock" => Ok(ProviderSpec::Mock),
            _ => Err(AbSearchError::UnknownProvider(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_application_code_case_insensitive() {
        let code: ApplicationCode = "chip".parse().unwrap();
        assert_eq!(code, ApplicationCode::Chip);
        assert_eq!(code.to_string(), "ChIP");
    }

    #[test]
    fn parse_application_code_invalid() {
        let err = "western".parse::<ApplicationCode>().unwrap_err();
        assert_matches!(err, AbSearchError::InvalidApplicationCode(_));
    }

    #[test]
    fn tristate_serializes_as_nullable_bool() {
        let json = serde_json::to_string(&[TriState::Yes, TriState::No, TriState::Unknown]).unwrap();
        assert_eq!(json, "[true,false,null]");
        let parsed: Vec<TriState> = serde_json::from_str("[null,true]").unwrap();
        assert_eq!(parsed, vec![TriState::Unknown, TriState::Yes]);
    }

    #[test]
    fn criteria_defaults_min_amount() {
        let criteria: Criteria = serde_json::from_str("{}").unwrap();
        assert_eq!(criteria.min_amount_ug, Some(10.0));
        assert_eq!(criteria, Criteria::default());
    }

    #[test]
    fn parse_provider_spec() {
        assert_eq!("Abcam".parse::<ProviderSpec>().unwrap(), ProviderSpec::Abcam);
        let err = "sigma".parse::<ProviderSpec>().unwrap_err();
        assert_matches!(err, AbSearchError::UnknownProvider(_));
    }
}
