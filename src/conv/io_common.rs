use snafu::prelude::*;
use std::path::Path;

use audit_reshape::{OutputField, OutputRecord};

use crate::conv::*;

/// The supported input formats.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Excel,
}

/// Decides how to read the input: an explicit request wins, otherwise the
/// file extension is used.
pub fn detect_input_type(path: &str, requested: Option<&str>) -> ConvResult<InputType> {
    match requested {
        Some(t) if t.eq_ignore_ascii_case("csv") => Ok(InputType::Csv),
        Some(t) if t.eq_ignore_ascii_case("xlsx") || t.eq_ignore_ascii_case("excel") => {
            Ok(InputType::Excel)
        }
        Some(t) => UnknownInputTypeSnafu { input_type: t }.fail(),
        None if is_excel_path(path) => Ok(InputType::Excel),
        None => Ok(InputType::Csv),
    }
}

pub fn is_excel_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

/// The header titles of the long table, in output order.
pub fn header_titles() -> Vec<String> {
    OutputField::ALL
        .iter()
        .map(|f| f.title().to_string())
        .collect()
}

/// The Excel name of a zero-based column index (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letter(mut idx: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    name
}

/// Renders the whole long table as CSV text. This is the rendition compared
/// against a reference file.
pub fn render_csv(records: &[OutputRecord]) -> ConvResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&header_titles())
        .context(RenderingCsvSnafu {})?;
    for record in records {
        wtr.write_record(&record.cells())
            .context(RenderingCsvSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(bytes) => bytes,
        Err(e) => whatever!("Could not finalize the CSV rendition: {}", e),
    };
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => whatever!("The CSV rendition is not valid UTF-8: {}", e),
    }
}
