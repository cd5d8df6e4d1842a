/*!

# Quick start

This example shows how to run a conversion end to end, starting from the
submission platform and ending with the long per-indicator table.

**Exporting the submissions** In the survey platform, open the form that
collects the audit submissions and export the responses. Both the CSV export
and the Excel (xlsx) export are supported; the CSV export is the one produced
by the platform's `Submissions` page. Do not rework the file: the converter
locates every column by the header text of the first row, so the export can
be fed in as downloaded, whatever the column order.

**Running the converter** Run `reqconv` with the downloaded file and a
destination path:

```bash
reqconv -i ConvertForms_Submissions__2023-05-29.csv -o audit_lungo.xlsx
```

The destination extension selects the format: `.xlsx` produces a workbook
with sized columns, any other extension produces a CSV file. The output has
one row per submission and indicator, with the requisito, the indicator
label, the numerator, denominator and percentage values, the weight and the
weighted percentage. A denominator of `999` in the export marks an indicator
as not applicable for that submission: its percentage cells are written as
`null`.

**Using the library** The same engine is available programmatically. Feed it
a [Table](crate::Table) (header row first) and a catalog:

```
use audit_reshape::{run_reshape, Catalog, Table};

let mut table = Table::new();
table.push_row(vec![
    "id".to_string(),
    "zona_presidio".to_string(),
    "Professione".to_string(),
    "data".to_string(),
    "created".to_string(),
    "SOS".to_string(),
    "SOC".to_string(),
    "presidio".to_string(),
    "servizio".to_string(),
    "sede_presidio".to_string(),
    "num_gel".to_string(),
    "den_gel".to_string(),
    "%_gel".to_string(),
]);
table.push_row(vec![
    "1".to_string(),
    "zona Firenze".to_string(),
    "Infermiere".to_string(),
    "2023-05-12".to_string(),
    "2023-05-29".to_string(),
    "".to_string(),
    "".to_string(),
    "presidio Ospedaliero".to_string(),
    "Ambulatoriale".to_string(),
    "Careggi".to_string(),
    "18".to_string(),
    "20".to_string(),
    "90".to_string(),
]);

let records = run_reshape(&table, &Catalog::standard()).unwrap();
assert_eq!(records.len(), 1);
assert_eq!(records[0].percentuale_pesata, Some(3.6));
```

A custom catalog can be assembled with the
[CatalogBuilder](crate::builder::CatalogBuilder) when the audit campaign
changes its indicator set.

*/
