use std::cmp::Ordering;

use crate::domain::Record;
use crate::taxonomy::{application_score, normalize_applications};

/// Composite sort key; smaller keys rank first.
///
/// Purity flags that are explicitly `Yes` count, then the application tier,
/// then citations, then price (missing sorts last), then vendor and catalog
/// number so the order never depends on input position unless two records
/// agree on every component.
#[derive(Debug, Clone)]
pub struct PriorityKey<'a> {
    pub purity: u8,
    pub application_score: u8,
    pub citations: u32,
    pub price: Option<f64>,
    pub vendor: &'a str,
    pub catalog_number: &'a str,
}

impl<'a> PriorityKey<'a> {
    pub fn of(record: &'a Record) -> Self {
        let purity = record
            .purity_flags()
            .iter()
            .filter(|flag| flag.is_yes())
            .count() as u8;
        let codes = normalize_applications(&record.applications);
        Self {
            purity,
            application_score: application_score(&codes),
            citations: record.citations_count.unwrap_or(0),
            price: record.price,
            vendor: &record.vendor,
            catalog_number: &record.catalog_number,
        }
    }

    fn price_or_infinity(&self) -> f64 {
        self.price.unwrap_or(f64::INFINITY)
    }
}

impl PartialEq for PriorityKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey<'_> {}

impl Ord for PriorityKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .purity
            .cmp(&self.purity)
            .then_with(|| other.application_score.cmp(&self.application_score))
            .then_with(|| other.citations.cmp(&self.citations))
            .then_with(|| self.price_or_infinity().total_cmp(&other.price_or_infinity()))
            .then_with(|| self.vendor.cmp(other.vendor))
            .then_with(|| self.catalog_number.cmp(other.catalog_number))
    }
}

impl PartialOrd for PriorityKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order records by [`PriorityKey`]. The sort is stable and leaves the input untouched.
pub fn rank<'a, I>(records: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut keyed: Vec<(PriorityKey<'a>, &'a Record)> = records
        .into_iter()
        .map(|record| (PriorityKey::of(record), record))
        .collect();
    keyed.sort_by(|(left, _), (right, _)| left.cmp(right));
    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TriState;

    fn base(vendor: &str, catalog: &str) -> Record {
        Record {
            vendor: vendor.to_string(),
            catalog_number: catalog.to_string(),
            applications: vec!["WB".to_string()],
            price: Some(300.0),
            citations_count: Some(10),
            ..Default::default()
        }
    }

    fn catalogs(ranked: &[&Record]) -> Vec<String> {
        ranked
            .iter()
            .map(|record| format!("{}:{}", record.vendor, record.catalog_number))
            .collect()
    }

    #[test]
    fn vendor_breaks_ties() {
        let records = vec![base("Biolegend", "x"), base("Abcam", "x")];
        assert_eq!(catalogs(&rank(&records)), vec!["Abcam:x", "Biolegend:x"]);
    }

    #[test]
    fn catalog_breaks_vendor_ties() {
        let records = vec![base("Abcam", "ab2"), base("Abcam", "ab1")];
        assert_eq!(catalogs(&rank(&records)), vec!["Abcam:ab1", "Abcam:ab2"]);
    }

    #[test]
    fn purity_outranks_price() {
        let mut pure = base("Zeta", "pure");
        pure.price = Some(900.0);
        pure.is_bsa_free = TriState::Yes;
        pure.is_gelatin_free = TriState::Yes;
        pure.is_ascites_free = TriState::Yes;
        let mut cheap = base("Alpha", "cheap");
        cheap.price = Some(10.0);
        cheap.is_bsa_free = TriState::No;

        let records = vec![cheap, pure];
        assert_eq!(catalogs(&rank(&records)), vec!["Zeta:pure", "Alpha:cheap"]);
    }

    #[test]
    fn unknown_purity_counts_as_zero() {
        let mut unknown = base("Alpha", "unknown");
        unknown.is_bsa_free = TriState::Unknown;
        let mut denied = base("Beta", "denied");
        denied.is_bsa_free = TriState::No;
        assert_eq!(PriorityKey::of(&unknown).purity, PriorityKey::of(&denied).purity);
    }

    #[test]
    fn application_tier_then_citations_then_price() {
        let mut icfc = base("Delta", "icfc");
        icfc.applications = vec!["Intracellular flow".to_string()];
        icfc.citations_count = Some(1);
        let mut cited = base("Charlie", "cited");
        cited.citations_count = Some(500);
        let mut unpriced = base("Alpha", "unpriced");
        unpriced.price = None;
        let cheap = {
            let mut record = base("Bravo", "cheap");
            record.price = Some(100.0);
            record
        };

        let records = vec![unpriced, cheap, cited, icfc];
        assert_eq!(
            catalogs(&rank(&records)),
            vec!["Delta:icfc", "Charlie:cited", "Bravo:cheap", "Alpha:unpriced"]
        );
    }

    #[test]
    fn missing_citations_tie_with_zero() {
        let mut uncited = base("Alpha", "uncited");
        uncited.citations_count = None;
        uncited.price = Some(250.0);
        let mut zero = base("Bravo", "zero");
        zero.citations_count = Some(0);
        zero.price = Some(200.0);
        let mut zero_same_price = base("Charlie", "zero");
        zero_same_price.citations_count = Some(0);
        zero_same_price.price = Some(250.0);

        let records = vec![zero_same_price, uncited, zero];
        assert_eq!(
            catalogs(&rank(&records)),
            vec!["Bravo:zero", "Alpha:uncited", "Charlie:zero"]
        );
    }

    #[test]
    fn identical_keys_keep_input_order() {
        let mut first = base("Abcam", "ab1");
        first.name = "first".to_string();
        let mut second = base("Abcam", "ab1");
        second.name = "second".to_string();
        let records = vec![first, second];
        let ranked = rank(&records);
        assert_eq!(ranked[0].name, "first");
        assert_eq!(ranked[1].name, "second");
    }

    #[test]
    fn empty_input() {
        let records: Vec<Record> = Vec::new();
        assert!(rank(&records).is_empty());
    }
}
