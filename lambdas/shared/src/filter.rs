//! Metric-name allow-list filtering

use std::collections::BTreeSet;

use crate::config::Delimiter;
use crate::errors::{Error, Result};
use crate::models::CsvTable;

pub const METRIC_NAME_FIELD: &str = "metric_name";

/// Environmental metrics kept by the CSV filter
pub const DEFAULT_METRICS: [&str; 18] = [
    "CO2DIRECTSCOPE1",
    "CO2INDIRECTSCOPE2",
    "CO2INDIRECTSCOPE3",
    "CO2_NO_EQUIVALENTS",
    "NOXEMISSIONS",
    "SOXEMISSIONS",
    "VOCEMISSIONS",
    "WASTETOTAL",
    "HAZARDOUSWASTE",
    "PARTICULATE_MATTER_EMISSIONS",
    "AIRPOLLUTANTS_DIRECT",
    "AIRPOLLUTANTS_INDIRECT",
    "NATURAL_RESOURCE_USE_DIRECT",
    "WATERWITHDRAWALTOTAL",
    "WATER_USE_PAI_M10",
    "TOXIC_CHEMICALS_REDUCTION",
    "VOC_EMISSIONS_REDUCTION",
    "N_OXS_OX_EMISSIONS_REDUCTION",
];

/// Exact-match set of metric names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricAllowList {
    names: BTreeSet<String>,
}

impl Default for MetricAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS.iter().map(|m| m.to_string()))
    }
}

impl MetricAllowList {
    pub fn new<I: IntoIterator<Item = String>>(names: I) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn contains(&self, metric_name: &str) -> bool {
        self.names.contains(metric_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keep rows whose `metric_name` is allowed, preserving order.
    ///
    /// The header must declare `metric_name`, and every row must carry it.
    pub fn filter(&self, table: &CsvTable) -> Result<CsvTable> {
        if !table.headers.iter().any(|h| h == METRIC_NAME_FIELD) {
            return Err(Error::MissingColumns(vec![METRIC_NAME_FIELD.to_string()]));
        }

        let mut rows = Vec::new();
        for (index, row) in table.rows.iter().enumerate() {
            let metric_name = row.get(METRIC_NAME_FIELD).ok_or_else(|| Error::MissingField {
                row: index + 1,
                field: METRIC_NAME_FIELD.to_string(),
            })?;
            if self.contains(metric_name) {
                rows.push(row.clone());
            }
        }

        Ok(CsvTable {
            headers: table.headers.clone(),
            rows,
        })
    }
}

impl CsvTable {
    /// Serialize back to delimited text, header first
    pub fn to_csv_bytes(&self, delimiter: Delimiter) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter.as_byte())
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.values())?;
        }

        writer
            .into_inner()
            .map_err(|e| Error::Internal(format!("failed to flush CSV writer: {}", e)))
    }
}
