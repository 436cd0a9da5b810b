//! Bulk student import from comma-separated text.
//!
//! The first non-blank line is a header naming the columns `name`, `email`,
//! `department` and `rollNumber` in any order and any letter case. Extra
//! columns are ignored. Fields are split on every comma: quoted fields are not
//! recognised, so a value containing a comma shifts the columns after it.

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::model::{Collection, Fields};
use crate::{Error, RecordWriter, Result};

/// Header line of the downloadable template.
pub const TEMPLATE_HEADER: &str = "name,email,department,rollNumber";

/// Required columns, compared against the lower-cased header.
pub const REQUIRED_HEADERS: [&str; 4] = ["name", "email", "department", "rollnumber"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_count: usize,
}

/// Imports every data row with a non-empty name and email as a new student.
///
/// Rows with fewer than four values, or without a name or email, are skipped
/// without being reported. Rows created before a failure are kept, and the
/// failure is reported as [`Error::PartialImport`] carrying their count.
pub fn import_students(store: &dyn RecordWriter, raw: &str) -> Result<ImportSummary> {
    let lines: Vec<&str> = raw
        .split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(Error::EmptyOrInvalid);
    }

    let text = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_lowercase).collect();
    let positions: Vec<Option<usize>> = REQUIRED_HEADERS
        .iter()
        .map(|required| header.iter().position(|column| column == required))
        .collect();
    let (name_col, email_col, department_col, roll_col) = match positions.as_slice() {
        [Some(n), Some(e), Some(d), Some(r)] => (*n, *e, *d, *r),
        _ => {
            let missing = REQUIRED_HEADERS
                .iter()
                .zip(&positions)
                .filter(|(_, pos)| pos.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(Error::MissingHeaders(missing));
        }
    };

    let mut imported_count = 0;
    for row in reader.records() {
        let row = row.map_err(|e| Error::PartialImport {
            imported_count,
            source: Box::new(e.into()),
        })?;
        if row.len() < REQUIRED_HEADERS.len() {
            continue;
        }
        let value = |col: usize| row.get(col).unwrap_or_default().to_string();
        let name = value(name_col);
        let email = value(email_col);
        if name.is_empty() || email.is_empty() {
            continue;
        }

        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("email".to_string(), Value::from(email));
        fields.insert("department".to_string(), Value::from(value(department_col)));
        fields.insert("rollNumber".to_string(), Value::from(value(roll_col)));
        if let Err(e) = store.create(Collection::Students, fields) {
            warn!("Import stopped after {} students: {}", imported_count, e);
            return Err(Error::PartialImport {
                imported_count,
                source: Box::new(e),
            });
        }
        imported_count += 1;
    }

    info!("Imported {} students", imported_count);
    Ok(ImportSummary { imported_count })
}
