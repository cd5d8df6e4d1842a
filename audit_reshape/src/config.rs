// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A weighted metric declared inside a requisito.
///
/// Each indicator owns three columns in the wide input, named by convention
/// `num_<key>`, `den_<key>` and `%_<key>`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Indicator {
    /// The label written in the INDICATORE column of the output.
    pub label: String,
    /// The internal key used to locate the value columns in the input.
    pub key: String,
    /// The scaling factor applied to the percentage (PESO).
    pub weight: u32,
}

/// The ordered mapping from requisito name to its indicators.
///
/// This is pure configuration: the declaration order drives the output row
/// order and is preserved exactly.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<(String, Vec<Indicator>)>,
}

impl Catalog {
    pub fn new(entries: Vec<(String, Vec<Indicator>)>) -> Catalog {
        Catalog { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Vec<Indicator>)> {
        self.entries.iter()
    }

    pub fn num_requisiti(&self) -> usize {
        self.entries.len()
    }

    pub fn num_indicators(&self) -> usize {
        self.entries.iter().map(|(_, inds)| inds.len()).sum()
    }

    /// The built-in catalog of the regional audit campaign.
    pub fn standard() -> Catalog {
        fn ind(label: &str, key: &str, weight: u32) -> Indicator {
            Indicator {
                label: label.to_string(),
                key: key.to_string(),
                weight,
            }
        }
        Catalog::new(vec![
            (
                "IDENTIFICAZIONE UTENTE".to_string(),
                vec![ind("IDENTIFICAZIONE ATTIVA", "ident_utente", 2)],
            ),
            (
                "PREVENZIONE CADUTE".to_string(),
                vec![
                    ind("SICUREZZA AMBIENTIE PRESIDI", "lista_item", 3),
                    ind("POST CADUTA", "cadute", 3),
                ],
            ),
            (
                "SORVEGLIANZA INFEZIONI".to_string(),
                vec![
                    ind("GEL LAVAMANI POSTAZIONE", "gel", 4),
                    ind("GEL LAVAMANI BORSE", "borse", 4),
                    ind("GUANTI POSTAZIONE", "guanti", 4),
                    ind("GUANTI BORSE", "guanti_borse", 4),
                    ind("POSTER MANI PULITE", "poster", 4),
                    ind("POSTER MANI NUDE", "maninude", 4),
                    ind("AZIONI POST MONITORAGGIO", "azioni_mani", 4),
                ],
            ),
            (
                "DISPOSITIVI MEDICI".to_string(),
                vec![
                    ind("MANUALE IN ITALIANO", "lingua", 4),
                    ind("PROGRAMMAZIONE MANUTENZIONE ESTERNA", "piano", 4),
                    ind("EFFETTUAZIONE MANUTENZIONE ESTERNA", "manutenzione", 4),
                    ind("MANUTENZIONE TSLB", "tslb", 4),
                ],
            ),
            (
                "SICUREZZA EMOCOMPONENTI".to_string(),
                vec![
                    ind("CONFORMITA' RICHIESTE", "nc", 3),
                    ind("ETICHETTATURA CAMPIONE STOCCATO", "stoc", 3),
                ],
            ),
            (
                "SICUREZZA PZ ONCOLOGICO".to_string(),
                vec![
                    ind("PRESCRIZIONE FARMACI CTA", "presc_CTA", 5),
                    ind("PREPARAZIONE CTA", "prep_CTA", 5),
                ],
            ),
            (
                "RISCHIO FARMACI".to_string(),
                vec![
                    ind("ETICHETTATURA LASA", "nc_LASA", 5),
                    ind("ALLOCAZIONE LASA", "stoc_LASA", 5),
                ],
            ),
            (
                "CONTROLLO QUALITA'".to_string(),
                vec![ind("CQ APPARECCHIATURE", "checklist", 10)],
            ),
            (
                "NEOASSUNTO/NEOINSERITO".to_string(),
                vec![
                    ind("PIANO INSERIMENTO NEOASSUNTO", "neoassunto", 1),
                    ind("PIANO INSERIMENTO NEOINSERITO", "neoinserito", 1),
                ],
            ),
        ])
    }
}

/// An in-memory tabular value. The first row is the header, every following
/// row is one submission. All cells are plain text: the file readers are in
/// charge of normalizing typed cells to strings.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Table {
        Table::default()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// The submission rows, header excluded.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().skip(1).map(|r| r.as_slice())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

// ******** Output data structures *********

/// The fields of one output row, in the order they are written.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputField {
    Id,
    Data,
    DataInvio,
    Professione,
    Soc,
    Sos,
    Zona,
    TipologiaPresidio,
    Setting,
    Sede,
    Requisito,
    Indicatore,
    Numeratore,
    Denominatore,
    Percentuale,
    Peso,
    PercentualePesata,
}

impl OutputField {
    pub const ALL: [OutputField; 17] = [
        OutputField::Id,
        OutputField::Data,
        OutputField::DataInvio,
        OutputField::Professione,
        OutputField::Soc,
        OutputField::Sos,
        OutputField::Zona,
        OutputField::TipologiaPresidio,
        OutputField::Setting,
        OutputField::Sede,
        OutputField::Requisito,
        OutputField::Indicatore,
        OutputField::Numeratore,
        OutputField::Denominatore,
        OutputField::Percentuale,
        OutputField::Peso,
        OutputField::PercentualePesata,
    ];

    /// The title written in the header row: the field name with separators
    /// as spaces and the PERCENTUALE token rendered as '%'.
    pub fn title(&self) -> &'static str {
        match self {
            OutputField::Id => "ID",
            OutputField::Data => "DATA",
            OutputField::DataInvio => "DATA INVIO",
            OutputField::Professione => "PROFESSIONE",
            OutputField::Soc => "SOC",
            OutputField::Sos => "SOS",
            OutputField::Zona => "ZONA",
            OutputField::TipologiaPresidio => "TIPOLOGIA PRESIDIO",
            OutputField::Setting => "SETTING",
            OutputField::Sede => "SEDE",
            OutputField::Requisito => "REQUISITO",
            OutputField::Indicatore => "INDICATORE",
            OutputField::Numeratore => "NUMERATORE",
            OutputField::Denominatore => "DENOMINATORE",
            OutputField::Percentuale => "%",
            OutputField::Peso => "PESO",
            OutputField::PercentualePesata => "% PESATA",
        }
    }
}

/// One row of the long table: the submission's pass-through fields plus the
/// computed values for a single indicator.
#[derive(PartialEq, Debug, Clone)]
pub struct OutputRecord {
    pub id: String,
    pub data: String,
    pub data_invio: String,
    pub professione: String,
    pub soc: String,
    pub sos: String,
    pub zona: String,
    pub tipologia_presidio: String,
    pub setting: String,
    pub sede: String,
    pub requisito: String,
    pub indicatore: String,
    pub numeratore: String,
    pub denominatore: String,
    pub percentuale: Option<f64>,
    pub peso: u32,
    pub percentuale_pesata: Option<f64>,
}

impl OutputRecord {
    /// Renders one field as cell text. Absent numeric values become the
    /// literal marker 'null'.
    pub fn field(&self, field: OutputField) -> String {
        match field {
            OutputField::Id => self.id.clone(),
            OutputField::Data => self.data.clone(),
            OutputField::DataInvio => self.data_invio.clone(),
            OutputField::Professione => self.professione.clone(),
            OutputField::Soc => self.soc.clone(),
            OutputField::Sos => self.sos.clone(),
            OutputField::Zona => self.zona.clone(),
            OutputField::TipologiaPresidio => self.tipologia_presidio.clone(),
            OutputField::Setting => self.setting.clone(),
            OutputField::Sede => self.sede.clone(),
            OutputField::Requisito => self.requisito.clone(),
            OutputField::Indicatore => self.indicatore.clone(),
            OutputField::Numeratore => self.numeratore.clone(),
            OutputField::Denominatore => self.denominatore.clone(),
            OutputField::Percentuale => render_number(self.percentuale),
            OutputField::Peso => self.peso.to_string(),
            OutputField::PercentualePesata => render_number(self.percentuale_pesata),
        }
    }

    /// All the cells of this record, in output order.
    pub fn cells(&self) -> Vec<String> {
        OutputField::ALL.iter().map(|f| self.field(*f)).collect()
    }
}

/// The null marker written for not-applicable or unparseable values.
pub const NULL_MARKER: &str = "null";

fn render_number(x: Option<f64>) -> String {
    match x {
        None => NULL_MARKER.to_string(),
        // Integral values are written without a decimal point, as the
        // submission platform emits them.
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
    }
}

/// Errors that prevent the reshape from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReshapeErrors {
    /// The input table has no header row at all.
    EmptyTable,
    /// A required top-level header is absent from the input.
    MissingHeader { name: String },
    /// A catalog builder received an indicator before any requisito.
    MisplacedIndicator { key: String },
}

impl Error for ReshapeErrors {}

impl Display for ReshapeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReshapeErrors::EmptyTable => write!(f, "the input table has no header row"),
            ReshapeErrors::MissingHeader { name } => {
                write!(f, "could not find the required column {:?}", name)
            }
            ReshapeErrors::MisplacedIndicator { key } => {
                write!(f, "indicator {:?} declared outside of a requisito", key)
            }
        }
    }
}
