//! Column-set validation for ESG data files

use std::collections::HashSet;

use crate::errors::{Error, Result};

/// Columns every ESG data file must carry
pub const SCHEMA_FIELDS: [&str; 15] = [
    "reported_date",
    "company_name",
    "perm_id",
    "data_type",
    "disclosure",
    "metric_description",
    "metric_name",
    "metric_unit",
    "metric_value",
    "metric_year",
    "nb_points_of_observations",
    "metric_period",
    "provider_name",
    "pillar",
    "headquarter_country",
];

/// Required columns absent from `headers`, in required order
pub fn missing_columns<S: AsRef<str>>(headers: &[String], required: &[S]) -> Vec<String> {
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|column| !present.contains(column))
        .map(str::to_string)
        .collect()
}

/// Fails with [`Error::MissingColumns`] unless `headers` is a superset of `required`
pub fn validate_columns<S: AsRef<str>>(headers: &[String], required: &[S]) -> Result<()> {
    let missing = missing_columns(headers, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingColumns(missing))
    }
}
