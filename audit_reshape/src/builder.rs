pub use crate::config::*;

/// A builder for assembling a custom requisito catalog.
///
/// The declaration order is preserved: it drives the order of the output
/// rows.
///
/// ```
/// pub use audit_reshape::builder::CatalogBuilder;
/// # use audit_reshape::ReshapeErrors;
///
/// let catalog = CatalogBuilder::new()
///     .requisito("SORVEGLIANZA INFEZIONI")
///     .indicator("GEL LAVAMANI POSTAZIONE", "gel", 4)?
///     .indicator("GUANTI POSTAZIONE", "guanti", 4)?
///     .build();
///
/// assert_eq!(catalog.num_indicators(), 2);
/// # Ok::<(), ReshapeErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    entries: Vec<(String, Vec<Indicator>)>,
}

impl CatalogBuilder {
    pub fn new() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Opens a new requisito. Following indicators are attached to it.
    pub fn requisito(mut self, name: &str) -> CatalogBuilder {
        self.entries.push((name.to_string(), Vec::new()));
        self
    }

    /// Adds an indicator to the requisito opened last.
    pub fn indicator(
        mut self,
        label: &str,
        key: &str,
        weight: u32,
    ) -> Result<CatalogBuilder, ReshapeErrors> {
        match self.entries.last_mut() {
            Some((_, indicators)) => {
                indicators.push(Indicator {
                    label: label.to_string(),
                    key: key.to_string(),
                    weight,
                });
                Ok(self)
            }
            None => Err(ReshapeErrors::MisplacedIndicator {
                key: key.to_string(),
            }),
        }
    }

    pub fn build(self) -> Catalog {
        Catalog::new(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_without_requisito_is_rejected() {
        let res = CatalogBuilder::new().indicator("GEL LAVAMANI POSTAZIONE", "gel", 4);
        assert_eq!(
            res.err(),
            Some(ReshapeErrors::MisplacedIndicator {
                key: "gel".to_string()
            })
        );
    }

    #[test]
    fn declaration_order_is_preserved() {
        let catalog = CatalogBuilder::new()
            .requisito("B")
            .indicator("DUE", "due", 1)
            .unwrap()
            .requisito("A")
            .indicator("UNO", "uno", 1)
            .unwrap()
            .build();
        let names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
