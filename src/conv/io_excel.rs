use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;
use std::path::Path;

use audit_reshape::{OutputRecord, Table};

use crate::conv::io_common::{column_letter, header_titles};
use crate::conv::*;

/// Reads a submission export from an xlsx workbook. The first worksheet is
/// used unless a name is given.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> BConvResult<Table> {
    let p = path.to_string();
    let mut workbook: Xlsx<_> = open_workbook(p).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    debug!(
        "read_excel_table: {} rows in {:?} worksheet {:?}",
        wrange.height(),
        path,
        worksheet_name
    );

    let mut table = Table::new();
    for row in wrange.rows() {
        table.push_row(row.iter().map(cell_to_string).collect());
    }
    Ok(table)
}

// Normalizes a workbook cell to plain text. Whole counts lose the decimal
// point the float representation would add.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => format!("{}", f),
        DataType::Int(i) => format!("{}", i),
        DataType::Bool(b) => format!("{}", b),
        DataType::DateTime(f) => format!("{}", f),
        DataType::Empty => String::new(),
        DataType::Error(_) => String::new(),
    }
}

/// Writes the long table as an xlsx workbook. Row 1 carries the titles and
/// the records are numbered from row 2, one row per emitted record.
pub fn write_excel_table(path: &str, records: &[OutputRecord]) -> ConvResult<()> {
    let mut book = umya_spreadsheet::new_file();
    // A new workbook always carries its default worksheet.
    let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();

    let titles = header_titles();
    for (col, title) in titles.iter().enumerate() {
        sheet
            .get_cell_mut(format!("{}1", column_letter(col)).as_str())
            .set_value(title.as_str());
    }

    let mut row_idx: usize = 2;
    for record in records {
        for (col, value) in record.cells().iter().enumerate() {
            sheet
                .get_cell_mut(format!("{}{}", column_letter(col), row_idx).as_str())
                .set_value(value.as_str());
        }
        row_idx += 1;
    }

    // Cosmetic sizing only: nothing downstream depends on the widths.
    for (col, width) in column_widths(&titles, records).iter().enumerate() {
        sheet
            .get_column_dimension_mut(column_letter(col).as_str())
            .set_width(*width);
    }

    if let Err(e) = umya_spreadsheet::writer::xlsx::write(&book, Path::new(path)) {
        return WritingExcelSnafu {
            path,
            detail: format!("{:?}", e),
        }
        .fail();
    }
    Ok(())
}

// Longest cell of the column, padded and scaled as the reporting templates
// expect.
fn column_widths(titles: &[String], records: &[OutputRecord]) -> Vec<f64> {
    let mut max_lens: Vec<usize> = titles.iter().map(|t| t.chars().count()).collect();
    for record in records {
        for (col, value) in record.cells().iter().enumerate() {
            if let Some(len) = max_lens.get_mut(col) {
                *len = (*len).max(value.chars().count());
            }
        }
    }
    max_lens.iter().map(|len| (len + 2) as f64 * 1.1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> OutputRecord {
        OutputRecord {
            id: "12".to_string(),
            data: "2023-05-12".to_string(),
            data_invio: "2023-05-29".to_string(),
            professione: "Infermiere".to_string(),
            soc: "SOC A".to_string(),
            sos: "SOS B".to_string(),
            zona: "Firenze".to_string(),
            tipologia_presidio: "Ospedaliero".to_string(),
            setting: "Domiciliare".to_string(),
            sede: "Careggi".to_string(),
            requisito: "IDENTIFICAZIONE UTENTE".to_string(),
            indicatore: "IDENTIFICAZIONE ATTIVA".to_string(),
            numeratore: "34".to_string(),
            denominatore: "40".to_string(),
            percentuale: Some(85.0),
            peso: 2,
            percentuale_pesata: Some(1.7),
        }
    }

    #[test]
    fn written_workbooks_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        write_excel_table(path.to_str().unwrap(), &[record()]).unwrap();

        let table = read_excel_table(path.to_str().unwrap(), None).unwrap();
        assert_eq!(table.num_rows(), 2);
        let header = table.header().unwrap();
        assert_eq!(header[0], "ID");
        assert_eq!(header[14], "%");
        assert_eq!(header[16], "% PESATA");
        let row = table.data_rows().next().unwrap();
        assert_eq!(row[0], "12");
        assert_eq!(row[10], "IDENTIFICAZIONE UTENTE");
        assert_eq!(row[14], "85");
        assert_eq!(row[16], "1.7");
    }

    #[test]
    fn widths_follow_the_longest_cell() {
        let titles = header_titles();
        let widths = column_widths(&titles, &[record()]);
        assert_eq!(widths.len(), titles.len());
        // The REQUISITO column is dominated by its value, the ID column by
        // its two-letter title.
        assert!((widths[10] - 24.0 * 1.1).abs() < 1e-9);
        assert!((widths[0] - 4.0 * 1.1).abs() < 1e-9);
    }
}
