use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{ApplicationCode, Criteria, Record};
use crate::error::AbSearchError;
use crate::filter::filter_records;
use crate::providers::{AntibodyProvider, search_all};
use crate::ranking::rank;
use crate::selection::{BestPackage, DEFAULT_MIN_AMOUNT_UG, best_package};
use crate::taxonomy::{application_score, normalize_applications};

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub target: String,
    pub generated_at: String,
    pub criteria: Criteria,
    pub total_listings: usize,
    pub entries: Vec<SearchEntry>,
}

/// A ranked record plus the values derived from it for display.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    #[serde(flatten)]
    pub record: Record,
    pub normalized_applications: Vec<ApplicationCode>,
    pub application_score: u8,
    pub best_package: Option<BestPackage>,
}

impl SearchEntry {
    pub fn new(record: &Record, min_amount_ug: f64) -> Self {
        let normalized_applications = normalize_applications(&record.applications);
        Self {
            application_score: application_score(&normalized_applications),
            normalized_applications,
            best_package: best_package(record, min_amount_ug),
            record: record.clone(),
        }
    }
}

pub struct App<P: AntibodyProvider> {
    providers: Vec<P>,
}

impl<P: AntibodyProvider> App<P> {
    pub fn new(providers: Vec<P>) -> Self {
        Self { providers }
    }

    pub fn search(&self, target: &str, criteria: &Criteria) -> Result<SearchReport, AbSearchError> {
        info!(target, providers = self.providers.len(), "starting search");
        let records = search_all(target, &self.providers)?;
        Ok(evaluate(target, &records, criteria))
    }
}

/// Filter, rank and annotate already-fetched records.
pub fn evaluate(target: &str, records: &[Record], criteria: &Criteria) -> SearchReport {
    let kept = filter_records(records, criteria);
    debug!(
        total = records.len(),
        kept = kept.len(),
        "applied criteria"
    );
    let floor = criteria.min_amount_ug.unwrap_or(DEFAULT_MIN_AMOUNT_UG);
    let entries = rank(kept)
        .into_iter()
        .map(|record| SearchEntry::new(record, floor))
        .collect::<Vec<_>>();
    info!(target, results = entries.len(), "search complete");

    SearchReport {
        target: target.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        criteria: criteria.clone(),
        total_listings: records.len(),
        entries,
    }
}
