use clap::Parser;

/// This program converts a wide audit-submission export into the long
/// per-indicator reporting table.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The submission export to convert. CSV and Excel (xlsx) files are
    /// supported; the type is guessed from the extension unless --input-type is given.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path) Where the converted table is written. An .xlsx extension selects the
    /// Excel writer, any other extension selects CSV.
    #[clap(short, long, value_parser)]
    pub out: String,

    /// (default: guessed from the extension) The type of the input: 'csv' or 'xlsx'.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) A JSON file overriding the built-in requisito catalog. The
    /// file is an ordered array of {requisito, indicators: [{label, key, weight}]}
    /// objects.
    #[clap(long, value_parser)]
    pub catalog: Option<String>,

    /// (file path, optional) A reference CSV rendition of the expected output. If
    /// provided, the program checks that the converted table matches the reference and
    /// fails with a diff when it does not.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (optional) When using an Excel file, indicates the name of the worksheet to
    /// read. The first worksheet is used when not specified.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
