//! Micrograms of antibody available in a record or package option.

use crate::domain::{PackageOption, Record};

/// Resolve a usable amount in micrograms.
///
/// A direct amount always wins. Otherwise concentration (mg/mL) times volume
/// (µL) is taken as-is: mg/mL · µL is numerically equal to µg.
pub fn resolve_quantity(
    direct_ug: Option<f64>,
    concentration_mg_per_ml: Option<f64>,
    volume_ul: Option<f64>,
) -> Option<f64> {
    if direct_ug.is_some() {
        return direct_ug;
    }
    match (concentration_mg_per_ml, volume_ul) {
        (Some(concentration), Some(volume)) => Some(concentration * volume),
        _ => None,
    }
}

/// Anything that carries the amount fields understood by [`resolve_quantity`].
pub trait Quantified {
    fn direct_amount_ug(&self) -> Option<f64>;
    fn concentration_mg_per_ml(&self) -> Option<f64>;
    fn volume_ul(&self) -> Option<f64>;

    fn resolved_amount_ug(&self) -> Option<f64> {
        resolve_quantity(
            self.direct_amount_ug(),
            self.concentration_mg_per_ml(),
            self.volume_ul(),
        )
    }

    /// `true` when the resolved amount exists and reaches `floor_ug`.
    fn meets_floor(&self, floor_ug: f64) -> bool {
        self.resolved_amount_ug()
            .map(|amount| amount >= floor_ug)
            .unwrap_or(false)
    }
}

impl Quantified for Record {
    fn direct_amount_ug(&self) -> Option<f64> {
        self.amount_ug
    }

    fn concentration_mg_per_ml(&self) -> Option<f64> {
        self.concentration_mg_per_ml
    }

    fn volume_ul(&self) -> Option<f64> {
        self.volume_ul
    }
}

impl Quantified for PackageOption {
    fn direct_amount_ug(&self) -> Option<f64> {
        self.amount_ug
    }

    fn concentration_mg_per_ml(&self) -> Option<f64> {
        self.concentration_mg_per_ml
    }

    fn volume_ul(&self) -> Option<f64> {
        self.volume_ul
    }
}
