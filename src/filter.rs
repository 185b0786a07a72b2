use std::collections::HashSet;

use crate::domain::{Criteria, Record};
use crate::quantity::Quantified;
use crate::taxonomy::{RuleTable, normalize_applications};

/// `true` when every constraint set in `criteria` holds for `record`.
///
/// Missing record data fails only the constraint that needs it; a missing
/// price never violates a price ceiling.
pub fn matches(record: &Record, criteria: &Criteria) -> bool {
    if let Some(wanted) = specified(&criteria.species_reactivity) {
        let wanted = lowercase_set(wanted);
        let overlaps = record
            .validated_reactivity
            .iter()
            .any(|species| wanted.contains(&species.to_lowercase()));
        if !overlaps {
            return false;
        }
    }

    if let Some(allowed) = specified(&criteria.host_species) {
        if !one_of(record.host_species.as_deref(), allowed) {
            return false;
        }
    }

    if let Some(allowed) = specified(&criteria.clonality) {
        if !one_of(record.clonality.as_deref(), allowed) {
            return false;
        }
    }

    if let Some(required) = specified(&criteria.applications) {
        if !has_all_applications(record, required) {
            return false;
        }
    }

    if let Some(allowed) = specified(&criteria.conjugation) {
        if !one_of(record.conjugation.as_deref(), allowed) {
            return false;
        }
    }

    if let Some(min_citations) = criteria.min_citations {
        match record.citations_count {
            Some(count) if count >= min_citations => {}
            _ => return false,
        }
    }

    if let Some(max_price) = criteria.max_price {
        if record.price.is_some_and(|price| price > max_price) {
            return false;
        }
    }

    if let Some(floor) = criteria.min_amount_ug {
        if !record.meets_floor(floor) {
            return false;
        }
    }

    true
}

pub fn filter_records<'a, I>(records: I, criteria: &Criteria) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|record| matches(record, criteria))
        .collect()
}

fn specified(values: &Option<Vec<String>>) -> Option<&[String]> {
    values.as_deref().filter(|values| !values.is_empty())
}

fn lowercase_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|value| value.to_lowercase()).collect()
}

fn one_of(value: Option<&str>, allowed: &[String]) -> bool {
    let Some(value) = value else {
        return false;
    };
    let value = value.to_lowercase();
    allowed.iter().any(|candidate| candidate.to_lowercase() == value)
}

/// Superset check on normalized codes. A required label that the rule table
/// cannot recognize can never be satisfied.
fn has_all_applications(record: &Record, required: &[String]) -> bool {
    let table = RuleTable::standard();
    let mut required_codes = HashSet::new();
    for label in required {
        let codes = table.classify(label);
        if codes.is_empty() {
            return false;
        }
        required_codes.extend(codes);
    }
    let present: HashSet<_> = normalize_applications(&record.applications)
        .into_iter()
        .collect();
    required_codes.is_subset(&present)
}
