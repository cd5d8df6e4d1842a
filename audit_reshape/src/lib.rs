mod config;
pub mod builder;
pub mod quick_start;

use log::{debug, info};

pub use crate::config::*;

// **** Column resolution ****

/// The denominator value that marks an indicator as not applicable for a
/// submission.
pub const SENTINEL_NOT_APPLICABLE: &str = "999";

/// Resolves header names to physical column positions.
///
/// Matching is case-insensitive on trimmed text, a trailing underscore
/// variant of the name is accepted, and the first matching column wins.
pub struct ColumnResolver {
    lowered: Vec<String>,
}

impl ColumnResolver {
    pub fn from_header(header: &[String]) -> ColumnResolver {
        ColumnResolver {
            lowered: header.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    /// Looks up a column that may legitimately be absent from the export.
    pub fn optional(&self, name: &str) -> Option<usize> {
        let lower = name.to_lowercase();
        let underscored = format!("{}_", lower);
        self.lowered
            .iter()
            .position(|h| *h == lower || *h == underscored)
    }

    /// Looks up a column the export must carry. Absence is fatal for the
    /// whole run.
    pub fn require(&self, name: &str) -> Result<usize, ReshapeErrors> {
        self.optional(name).ok_or_else(|| ReshapeErrors::MissingHeader {
            name: name.to_string(),
        })
    }
}

// The positions of the pass-through columns, resolved once per run.
#[derive(Eq, PartialEq, Debug, Clone)]
struct FixedColumns {
    id: usize,
    zona_presidio: usize,
    professione: usize,
    data: usize,
    data_invio: usize,
    sos: usize,
    soc: usize,
    tipologia_presidio: usize,
    servizio: usize,
    sede_presidio: usize,
}

impl FixedColumns {
    fn resolve(resolver: &ColumnResolver) -> Result<FixedColumns, ReshapeErrors> {
        Ok(FixedColumns {
            id: resolver.require("id")?,
            zona_presidio: resolver.require("zona_presidio")?,
            professione: resolver.require("Professione")?,
            data: resolver.require("data")?,
            // The submission date is exported under the platform's own name.
            data_invio: resolver.require("created")?,
            sos: resolver.require("SOS")?,
            soc: resolver.require("SOC")?,
            tipologia_presidio: resolver.require("presidio")?,
            servizio: resolver.require("servizio")?,
            sede_presidio: resolver.require("sede_presidio")?,
        })
    }
}

// The positions of one indicator's value columns.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ValueColumns {
    num: usize,
    den: usize,
    percentage: usize,
}

impl ValueColumns {
    fn resolve(resolver: &ColumnResolver, key: &str) -> Option<ValueColumns> {
        Some(ValueColumns {
            num: resolver.optional(&format!("num_{}", key))?,
            den: resolver.optional(&format!("den_{}", key))?,
            percentage: resolver.optional(&format!("%_{}", key))?,
        })
    }
}

// **** Scoring ****

/// The state of the denominator cell, decided from its raw text before any
/// numeric parsing is attempted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DenominatorStatus {
    Applicable(String),
    NotApplicable,
}

impl DenominatorStatus {
    pub fn from_raw(raw: &str) -> DenominatorStatus {
        if raw.trim() == SENTINEL_NOT_APPLICABLE {
            DenominatorStatus::NotApplicable
        } else {
            DenominatorStatus::Applicable(raw.trim().to_string())
        }
    }
}

/// Computes the output percentage and the weighted percentage for one
/// indicator cell.
///
/// A not-applicable denominator or an unparseable percentage yields the null
/// pair; a parse failure is absorbed, never propagated as an error.
pub fn weighted_score(
    den: &DenominatorStatus,
    percentage_raw: &str,
    weight: u32,
) -> (Option<f64>, Option<f64>) {
    match den {
        DenominatorStatus::NotApplicable => (None, None),
        DenominatorStatus::Applicable(_) => match percentage_raw.trim().parse::<f64>() {
            Ok(percentage) => (Some(percentage), Some(percentage * weight as f64 / 100.0)),
            Err(_) => (None, None),
        },
    }
}

// **** Row expansion ****

// The pass-through fields of one submission, read once per row.
#[derive(Eq, PartialEq, Debug, Clone)]
struct FixedFields {
    id: String,
    data: String,
    data_invio: String,
    professione: String,
    soc: String,
    sos: String,
    zona: String,
    tipologia_presidio: String,
    setting: String,
    sede: String,
}

impl FixedFields {
    fn read(row: &[String], cols: &FixedColumns) -> FixedFields {
        FixedFields {
            id: cell(row, cols.id),
            data: cell(row, cols.data),
            data_invio: cell(row, cols.data_invio),
            professione: cell(row, cols.professione),
            soc: cell(row, cols.soc),
            sos: cell(row, cols.sos),
            zona: strip_label(&cell(row, cols.zona_presidio), "zona "),
            tipologia_presidio: capitalize(&strip_label(
                &cell(row, cols.tipologia_presidio),
                "presidio ",
            )),
            setting: cell(row, cols.servizio),
            sede: cell(row, cols.sede_presidio),
        }
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

// The export repeats the field name inside the value ("zona Firenze",
// "presidio Ospedaliero"). Values without the label pass through unchanged.
fn strip_label(value: &str, label: &str) -> String {
    value.strip_prefix(label).unwrap_or(value).to_string()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Expands the wide submission table into the long per-indicator table.
///
/// Arguments:
/// * `table` the submission export, header row first
/// * `catalog` the requisito catalog driving the expansion
///
/// The fixed columns must all be present or the run fails before any record
/// is produced. An indicator whose `num_/den_/%_` column triple is
/// incomplete is skipped for the whole run.
pub fn run_reshape(table: &Table, catalog: &Catalog) -> Result<Vec<OutputRecord>, ReshapeErrors> {
    let header = table.header().ok_or(ReshapeErrors::EmptyTable)?;
    let resolver = ColumnResolver::from_header(header);
    let fixed = FixedColumns::resolve(&resolver)?;

    // Resolve every indicator's value columns up front. The skip below is
    // deliberate: an export only carries the question sets of the audited
    // setting.
    let mut plan: Vec<(&str, &Indicator, ValueColumns)> = Vec::new();
    for (requisito, indicators) in catalog.iter() {
        for indicator in indicators {
            match ValueColumns::resolve(&resolver, &indicator.key) {
                Some(cols) => plan.push((requisito.as_str(), indicator, cols)),
                None => {
                    debug!(
                        "run_reshape: indicator {:?} has an incomplete column triple, skipping",
                        indicator.key
                    );
                }
            }
        }
    }
    info!(
        "run_reshape: resolved {} of {} indicators over {} requisiti",
        plan.len(),
        catalog.num_indicators(),
        catalog.num_requisiti()
    );

    let mut records: Vec<OutputRecord> = Vec::new();
    for row in table.data_rows() {
        let fields = FixedFields::read(row, &fixed);
        for (requisito, indicator, cols) in plan.iter() {
            let denominatore = cell(row, cols.den);
            let den = DenominatorStatus::from_raw(&denominatore);
            let (percentuale, percentuale_pesata) =
                weighted_score(&den, &cell(row, cols.percentage), indicator.weight);
            records.push(OutputRecord {
                id: fields.id.clone(),
                data: fields.data.clone(),
                data_invio: fields.data_invio.clone(),
                professione: fields.professione.clone(),
                soc: fields.soc.clone(),
                sos: fields.sos.clone(),
                zona: fields.zona.clone(),
                tipologia_presidio: fields.tipologia_presidio.clone(),
                setting: fields.setting.clone(),
                sede: fields.sede.clone(),
                requisito: requisito.to_string(),
                indicatore: indicator.label.clone(),
                numeratore: cell(row, cols.num),
                denominatore,
                percentuale,
                peso: indicator.weight,
                percentuale_pesata,
            });
        }
    }
    info!("run_reshape: emitted {} records", records.len());
    Ok(records)
}
