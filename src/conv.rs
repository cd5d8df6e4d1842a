// Conversion glue: reads the submission export, runs the reshape engine and
// persists the long table.

use log::{info, warn};
use snafu::{prelude::*, Snafu};

use std::fs;

use audit_reshape::{run_reshape, Catalog, OutputRecord, ReshapeErrors};

use text_diff::print_diff;

use crate::args::Args;

pub mod catalog_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

use crate::conv::io_common::InputType;

#[derive(Debug, Snafu)]
pub enum ConvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet to read"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook has no worksheet named {name}"))]
    MissingWorksheet { name: String },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a line of the CSV file"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error opening the catalog file {path}"))]
    OpeningCatalog {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the catalog file"))]
    ParsingCatalog { source: serde_json::Error },
    #[snafu(display("Error opening the reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The conversion failed: {source}"))]
    Reshape { source: ReshapeErrors },
    #[snafu(display("Error writing the output file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error rendering the table as CSV"))]
    RenderingCsv { source: csv::Error },
    #[snafu(display("Error flushing the output file {path}"))]
    FlushingCsv {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the workbook {path}: {detail}"))]
    WritingExcel { path: String, detail: String },
    #[snafu(display("Unknown input type {input_type} (expected 'csv' or 'xlsx')"))]
    UnknownInputType { input_type: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ConvResult<T> = Result<T, ConvError>;
pub type BConvResult<T> = Result<T, Box<ConvError>>;

/// Runs one conversion: reads the export, reshapes it with the configured
/// catalog and writes the long table. Returns the number of emitted records.
///
/// The whole record set is computed before the destination file is created,
/// so a fatal failure leaves no partially-written output behind.
pub fn run_conversion(args: &Args) -> BConvResult<usize> {
    let input_type = io_common::detect_input_type(&args.input, args.input_type.as_deref())?;
    info!(
        "run_conversion: reading {:?} as {:?}",
        args.input, input_type
    );
    let table = match input_type {
        InputType::Csv => io_csv::read_csv_table(&args.input)?,
        InputType::Excel => {
            io_excel::read_excel_table(&args.input, args.excel_worksheet_name.as_deref())?
        }
    };
    info!("run_conversion: input table has {} rows", table.num_rows());

    let catalog = match &args.catalog {
        Some(path) => catalog_reader::read_catalog(path)?,
        None => Catalog::standard(),
    };

    let records = run_reshape(&table, &catalog).context(ReshapeSnafu {})?;

    if io_common::is_excel_path(&args.out) {
        io_excel::write_excel_table(&args.out, &records)?;
    } else {
        io_csv::write_csv_table(&args.out, &records)?;
    }
    info!(
        "run_conversion: wrote {} records to {:?}",
        records.len(),
        args.out
    );

    // The reference table, if provided for comparison.
    if let Some(reference_path) = &args.reference {
        check_reference(&records, reference_path)?;
    }

    Ok(records.len())
}

// Compares the CSV rendition of the converted table against a reference
// file, printing a diff on mismatch.
fn check_reference(records: &[OutputRecord], path: &str) -> ConvResult<()> {
    let produced = io_common::render_csv(records)?;
    let reference = fs::read_to_string(path).context(OpeningReferenceSnafu { path })?;
    if produced != reference {
        warn!("Found differences with the reference table {:?}", path);
        print_diff(reference.as_str(), produced.as_str(), "\n");
        whatever!("The converted table differs from the reference {}", path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use std::fs;
    use std::path::Path;

    fn args(input: &Path, out: &Path) -> Args {
        Args {
            input: input.display().to_string(),
            out: out.display().to_string(),
            input_type: None,
            catalog: None,
            reference: None,
            excel_worksheet_name: None,
            verbose: false,
        }
    }

    const INPUT_CSV: &str = "\
id,data,created,Professione,SOC,SOS,zona_presidio,presidio,servizio,sede_presidio,num_ident_utente,den_ident_utente,%_ident_utente,num_gel,den_gel,%_gel
12,2023-05-12,2023-05-29,Infermiere,SOC A,SOS B,zona Firenze,presidio OSPEDALIERO,Domiciliare,Careggi,34,40,85,0,999,
";

    const TITLES: &str = "ID,DATA,DATA INVIO,PROFESSIONE,SOC,SOS,ZONA,\
TIPOLOGIA PRESIDIO,SETTING,SEDE,REQUISITO,INDICATORE,NUMERATORE,DENOMINATORE,\
%,PESO,% PESATA";

    #[test]
    fn csv_to_csv_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out = dir.path().join("long.csv");
        fs::write(&input, INPUT_CSV).unwrap();

        let num_records = run_conversion(&args(&input, &out)).unwrap();
        assert_eq!(num_records, 2);

        let written = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TITLES);
        assert_eq!(
            lines[1],
            "12,2023-05-12,2023-05-29,Infermiere,SOC A,SOS B,Firenze,Ospedaliero,\
Domiciliare,Careggi,IDENTIFICAZIONE UTENTE,IDENTIFICAZIONE ATTIVA,34,40,85,2,1.7"
        );
        assert_eq!(
            lines[2],
            "12,2023-05-12,2023-05-29,Infermiere,SOC A,SOS B,Firenze,Ospedaliero,\
Domiciliare,Careggi,SORVEGLIANZA INFEZIONI,GEL LAVAMANI POSTAZIONE,0,999,null,4,null"
        );
    }

    #[test]
    fn a_byte_order_mark_on_the_header_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out = dir.path().join("long.csv");
        fs::write(&input, format!("\u{feff}{}", INPUT_CSV)).unwrap();

        let num_records = run_conversion(&args(&input, &out)).unwrap();
        assert_eq!(num_records, 2);
    }

    #[test]
    fn missing_required_column_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out = dir.path().join("long.csv");
        // No 'created' column in the export.
        fs::write(
            &input,
            "id,data,Professione,SOC,SOS,zona_presidio,presidio,servizio,sede_presidio\n\
12,2023-05-12,Infermiere,a,b,zona Firenze,presidio OSPEDALIERO,Domiciliare,Careggi\n",
        )
        .unwrap();

        let res = run_conversion(&args(&input, &out));
        assert!(res.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn catalog_override_restricts_the_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out = dir.path().join("long.csv");
        let catalog = dir.path().join("catalog.json");
        fs::write(&input, INPUT_CSV).unwrap();
        fs::write(
            &catalog,
            r#"[
  {
    "requisito": "SORVEGLIANZA INFEZIONI",
    "indicators": [{"label": "GEL LAVAMANI POSTAZIONE", "key": "gel", "weight": 4}]
  }
]"#,
        )
        .unwrap();

        let mut a = args(&input, &out);
        a.catalog = Some(catalog.display().to_string());
        let num_records = run_conversion(&a).unwrap();
        assert_eq!(num_records, 1);

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("GEL LAVAMANI POSTAZIONE"));
        assert!(!written.contains("IDENTIFICAZIONE ATTIVA"));
    }

    #[test]
    fn a_matching_reference_passes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out = dir.path().join("long.csv");
        fs::write(&input, INPUT_CSV).unwrap();
        run_conversion(&args(&input, &out)).unwrap();

        // The produced table is its own reference.
        let mut a = args(&input, &dir.path().join("long2.csv"));
        a.reference = Some(out.display().to_string());
        run_conversion(&a).unwrap();
    }

    #[test]
    fn a_mismatching_reference_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out = dir.path().join("long.csv");
        let reference = dir.path().join("reference.csv");
        fs::write(&input, INPUT_CSV).unwrap();
        fs::write(&reference, "something else entirely\n").unwrap();

        let mut a = args(&input, &out);
        a.reference = Some(reference.display().to_string());
        let res = run_conversion(&a);
        assert!(res.is_err());
    }

    #[test]
    fn runs_on_identical_input_produce_identical_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("submissions.csv");
        let out1 = dir.path().join("long1.csv");
        let out2 = dir.path().join("long2.csv");
        fs::write(&input, INPUT_CSV).unwrap();

        run_conversion(&args(&input, &out1)).unwrap();
        run_conversion(&args(&input, &out2)).unwrap();
        assert_eq!(
            fs::read(&out1).unwrap(),
            fs::read(&out2).unwrap()
        );
    }
}
