// Primitives for reading and writing CSV tables.

use log::debug;
use snafu::prelude::*;

use audit_reshape::{OutputRecord, Table};

use crate::conv::io_common::header_titles;
use crate::conv::*;

/// Reads a submission export in CSV form. The first row is the header; a
/// UTF-8 byte order mark on the first cell is dropped, as the submission
/// platform emits one.
pub fn read_csv_table(path: &str) -> BConvResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut table = Table::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let line = line_r.context(CsvLineParseSnafu {})?;
        let mut row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if idx == 0 {
            if let Some(first) = row.first_mut() {
                if let Some(stripped) = first.strip_prefix('\u{feff}') {
                    *first = stripped.to_string();
                }
            }
        }
        table.push_row(row);
    }
    debug!("read_csv_table: {} rows read from {:?}", table.num_rows(), path);
    Ok(table)
}

/// Writes the long table as CSV, header row first.
pub fn write_csv_table(path: &str, records: &[OutputRecord]) -> BConvResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path })?;
    wtr.write_record(&header_titles())
        .context(WritingCsvSnafu { path })?;
    for record in records {
        wtr.write_record(&record.cells())
            .context(WritingCsvSnafu { path })?;
    }
    wtr.flush().context(FlushingCsvSnafu { path })?;
    Ok(())
}
