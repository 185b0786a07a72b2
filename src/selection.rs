use serde::Serialize;

use crate::domain::Record;
use crate::quantity::Quantified;

pub const DEFAULT_MIN_AMOUNT_UG: f64 = 10.0;

/// The purchasable unit recommended for a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPackage {
    pub amount_ug: f64,
    pub price: f64,
    pub currency: Option<String>,
    pub label: Option<String>,
}

/// Smallest package that reaches `min_amount_ug` and has a price; price breaks
/// ties on amount.
///
/// Every package option is a candidate, and so is the record itself (labelled
/// with its size). `None` means nothing on offer meets the floor.
pub fn best_package(record: &Record, min_amount_ug: f64) -> Option<BestPackage> {
    let options = record.package_options.iter().filter_map(|option| {
        candidate(
            option,
            min_amount_ug,
            option.price,
            option.currency.as_deref(),
            option.label.as_deref(),
        )
    });
    let own = candidate(
        record,
        min_amount_ug,
        record.price,
        record.currency.as_deref(),
        record.size.as_deref(),
    );

    options.chain(own).min_by(|left, right| {
        left.amount_ug
            .total_cmp(&right.amount_ug)
            .then_with(|| left.price.total_cmp(&right.price))
    })
}

fn candidate<Q: Quantified>(
    source: &Q,
    min_amount_ug: f64,
    price: Option<f64>,
    currency: Option<&str>,
    label: Option<&str>,
) -> Option<BestPackage> {
    if !source.meets_floor(min_amount_ug) {
        return None;
    }
    let amount_ug = source.resolved_amount_ug()?;
    Some(BestPackage {
        amount_ug,
        price: price?,
        currency: currency.map(str::to_string),
        label: label.map(str::to_string),
    })
}
