use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::app::{SearchEntry, SearchReport};
use crate::domain::TriState;
use crate::error::AbSearchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
    Csv(String),
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &SearchReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

const CSV_HEADERS: [&str; 25] = [
    "vendor",
    "catalog_number",
    "name",
    "target",
    "url",
    "host_species",
    "clonality",
    "clone",
    "applications",
    "validated_reactivity",
    "conjugation",
    "price",
    "currency",
    "formulation",
    "is_bsa_free",
    "is_gelatin_free",
    "is_ascites_free",
    "amount_ug",
    "concentration_mg_per_ml",
    "volume_ul",
    "best_amount_ug",
    "best_price",
    "best_currency",
    "best_label",
    "citations_count",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    vendor: &'a str,
    catalog_number: &'a str,
    name: &'a str,
    target: &'a str,
    url: Option<&'a str>,
    host_species: Option<&'a str>,
    clonality: Option<&'a str>,
    clone: Option<&'a str>,
    applications: String,
    validated_reactivity: String,
    conjugation: Option<&'a str>,
    price: Option<f64>,
    currency: Option<&'a str>,
    formulation: Option<&'a str>,
    is_bsa_free: Option<bool>,
    is_gelatin_free: Option<bool>,
    is_ascites_free: Option<bool>,
    amount_ug: Option<f64>,
    concentration_mg_per_ml: Option<f64>,
    volume_ul: Option<f64>,
    best_amount_ug: Option<f64>,
    best_price: Option<f64>,
    best_currency: Option<&'a str>,
    best_label: Option<&'a str>,
    citations_count: Option<u32>,
}

impl<'a> From<&'a SearchEntry> for CsvRow<'a> {
    fn from(entry: &'a SearchEntry) -> Self {
        let record = &entry.record;
        let best = entry.best_package.as_ref();
        Self {
            vendor: &record.vendor,
            catalog_number: &record.catalog_number,
            name: &record.name,
            target: &record.target,
            url: record.url.as_deref(),
            host_species: record.host_species.as_deref(),
            clonality: record.clonality.as_deref(),
            clone: record.clone.as_deref(),
            applications: join_codes(entry),
            validated_reactivity: record.validated_reactivity.join(","),
            conjugation: record.conjugation.as_deref(),
            price: record.price,
            currency: record.currency.as_deref(),
            formulation: record.formulation.as_deref(),
            is_bsa_free: record.is_bsa_free.into(),
            is_gelatin_free: record.is_gelatin_free.into(),
            is_ascites_free: record.is_ascites_free.into(),
            amount_ug: record.amount_ug,
            concentration_mg_per_ml: record.concentration_mg_per_ml,
            volume_ul: record.volume_ul,
            best_amount_ug: best.map(|best| best.amount_ug),
            best_price: best.map(|best| best.price),
            best_currency: best.and_then(|best| best.currency.as_deref()),
            best_label: best.and_then(|best| best.label.as_deref()),
            citations_count: record.citations_count,
        }
    }
}

pub struct CsvOutput;

impl CsvOutput {
    pub fn to_bytes(entries: &[SearchEntry]) -> Result<Vec<u8>, AbSearchError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(CSV_HEADERS)
            .map_err(|err| AbSearchError::Csv(err.to_string()))?;
        for entry in entries {
            writer
                .serialize(CsvRow::from(entry))
                .map_err(|err| AbSearchError::Csv(err.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|err| AbSearchError::Csv(err.to_string()))
    }

    /// Write the CSV next to `path` first and move it into place once complete.
    pub fn write(path: &Utf8Path, entries: &[SearchEntry]) -> Result<(), AbSearchError> {
        let bytes = Self::to_bytes(entries)?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| AbSearchError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("absearch-csv")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| AbSearchError::Filesystem(err.to_string()))?;
        temp.write_all(&bytes)
            .map_err(|err| AbSearchError::Filesystem(err.to_string()))?;
        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| AbSearchError::Filesystem(err.to_string()))?;
        }
        temp.persist(path.as_std_path())
            .map_err(|err| AbSearchError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

const TABLE_HEADERS: [&str; 20] = [
    "Vendor",
    "Catalog",
    "Name",
    "Target",
    "Host",
    "Clonality",
    "Clone",
    "Apps",
    "Reactivity",
    "Conj",
    "Formulation",
    "BSA-free",
    "Gelatin-free",
    "Ascites-free",
    "Amount (ug)",
    "Conc (mg/mL)",
    "Vol (uL)",
    "Best Amount (ug)",
    "Best Price",
    "Citations",
];

/// Marker shown when no package reaches the minimum amount.
pub const NO_PACKAGE: &str = "-";

pub struct TableOutput;

impl TableOutput {
    pub fn render(entries: &[SearchEntry]) -> String {
        let rows: Vec<Vec<String>> = entries.iter().map(table_row).collect();
        let mut widths: Vec<usize> = TABLE_HEADERS.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
        push_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &rows {
            push_line(&mut out, row, &widths);
        }
        out
    }

    pub fn print(entries: &[SearchEntry]) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(Self::render(entries).as_bytes())
    }
}

fn table_row(entry: &SearchEntry) -> Vec<String> {
    let record = &entry.record;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let (best_amount, best_price) = match &entry.best_package {
        Some(best) => (
            format!("{:.0}", best.amount_ug),
            money(best.price, best.currency.as_deref()),
        ),
        None => (NO_PACKAGE.to_string(), NO_PACKAGE.to_string()),
    };
    vec![
        record.vendor.clone(),
        record.catalog_number.clone(),
        record.name.clone(),
        record.target.clone(),
        text(&record.host_species),
        text(&record.clonality),
        text(&record.clone),
        join_codes(entry),
        record.validated_reactivity.join(","),
        text(&record.conjugation),
        text(&record.formulation),
        yes_no(record.is_bsa_free),
        yes_no(record.is_gelatin_free),
        yes_no(record.is_ascites_free),
        record
            .amount_ug
            .map(|amount| format!("{amount:.0}"))
            .unwrap_or_default(),
        record
            .concentration_mg_per_ml
            .map(|value| value.to_string())
            .unwrap_or_default(),
        record
            .volume_ul
            .map(|value| value.to_string())
            .unwrap_or_default(),
        best_amount,
        best_price,
        record
            .citations_count
            .map(|count| count.to_string())
            .unwrap_or_default(),
    ]
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

fn join_codes(entry: &SearchEntry) -> String {
    entry
        .normalized_applications
        .iter()
        .map(|code| code.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn yes_no(flag: TriState) -> String {
    match flag {
        TriState::Yes => "Yes".to_string(),
        TriState::No => "No".to_string(),
        TriState::Unknown => String::new(),
    }
}

fn money(price: f64, currency: Option<&str>) -> String {
    format!("{price:.2} {}", currency.unwrap_or_default())
        .trim_end()
        .to_string()
}
