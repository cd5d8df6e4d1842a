use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;

use audit_reshape::{Catalog, Indicator};

use crate::conv::*;

/// One indicator as declared in a catalog file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CatalogIndicator {
    pub label: String,
    pub key: String,
    pub weight: u32,
}

/// One requisito with its indicators, as declared in a catalog file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRequisito {
    pub requisito: String,
    pub indicators: Vec<CatalogIndicator>,
}

/// Reads a catalog override: an ordered JSON array of requisiti. The
/// declaration order drives the output row order and is preserved.
pub fn read_catalog(path: &str) -> BConvResult<Catalog> {
    let contents = fs::read_to_string(path).context(OpeningCatalogSnafu { path })?;
    let entries: Vec<CatalogRequisito> =
        serde_json::from_str(contents.as_str()).context(ParsingCatalogSnafu {})?;
    let catalog = Catalog::new(
        entries
            .into_iter()
            .map(|entry| {
                (
                    entry.requisito,
                    entry
                        .indicators
                        .into_iter()
                        .map(|ind| Indicator {
                            label: ind.label,
                            key: ind.key,
                            weight: ind.weight,
                        })
                        .collect(),
                )
            })
            .collect(),
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_files_preserve_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[
  {"requisito": "B", "indicators": [{"label": "DUE", "key": "due", "weight": 3}]},
  {"requisito": "A", "indicators": [{"label": "UNO", "key": "uno", "weight": 1}]}
]"#,
        )
        .unwrap();
        let catalog = read_catalog(path.to_str().unwrap()).unwrap();
        let names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(catalog.num_indicators(), 2);
    }
}
