//! CSV rows to normalized ESG event log
//!
//! Each row becomes one `"ESG data"` event. Values are copied verbatim: no
//! trimming, no date parsing, no numeric coercion.
//!
//! The batch timestamp is rendered in the offset named by the timezone label
//! (`GMT+11`, `UTC-05:30`, ...). Labels that are not a fixed offset leave it
//! in UTC.

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::EventLogSettings;
use crate::errors::{Error, Result};
use crate::models::{Attribute, CsvTable, Event, EventLog, EventTime, LogTime, Row};

pub const EVENT_TYPE: &str = "ESG data";
pub const EVENT_DURATION: u32 = 1;
pub const EVENT_DURATION_UNIT: &str = "day";

/// Format of the batch timestamp on the event log header
pub const BATCH_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Fixed offset encoded in a `GMT`/`UTC` style label
pub fn label_offset(label: &str) -> Option<FixedOffset> {
    let label = label.trim();
    let rest = label
        .strip_prefix("GMT")
        .or_else(|| label.strip_prefix("UTC"))?;
    if rest.is_empty() {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Map a single row. `index` is the zero-based data row number, used only
/// for error reporting.
pub fn normalize_row(row: &Row, index: usize, timezone: &str) -> Result<Event> {
    let field = |name: &str| -> Result<String> {
        row.get(name)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingField {
                row: index + 1,
                field: name.to_string(),
            })
    };

    Ok(Event {
        time_object: EventTime {
            timestamp: field("reported_date")?,
            duration: EVENT_DURATION,
            duration_unit: EVENT_DURATION_UNIT.to_string(),
            timezone: timezone.to_string(),
        },
        event_type: EVENT_TYPE.to_string(),
        attribute: Attribute {
            company_name: field("company_name")?,
            perm_id: field("perm_id")?,
            data_type: field("data_type")?,
            disclosure: field("disclosure")?,
            metric_description: field("metric_description")?,
            metric_name: field("metric_name")?,
            metric_unit: field("metric_unit")?,
            metric_value: field("metric_value")?,
            metric_year: field("metric_year")?,
            nb_points_of_observations: field("nb_points_of_observations")?,
            metric_period: field("metric_period")?,
            provider_name: field("provider_name")?,
            pillar: field("pillar")?,
            headquarter_country: field("headquarter_country")?,
        },
    })
}

fn batch_timestamp(generated_at: DateTime<Utc>, timezone: &str) -> String {
    match label_offset(timezone) {
        Some(offset) => generated_at
            .with_timezone(&offset)
            .format(BATCH_TIMESTAMP_FORMAT)
            .to_string(),
        None => generated_at.format(BATCH_TIMESTAMP_FORMAT).to_string(),
    }
}

impl EventLog {
    /// Build the event log for a validated table.
    ///
    /// `generated_at` stamps the batch; callers pass the invocation time.
    pub fn from_table(
        table: &CsvTable,
        settings: &EventLogSettings,
        generated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let events = table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| normalize_row(row, index, &settings.timezone))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            data_source: settings.data_source.clone(),
            dataset_type: settings.dataset_type.clone(),
            dataset_id: settings.dataset_id.clone(),
            time_object: LogTime {
                timestamp: batch_timestamp(generated_at, &settings.timezone),
                timezone: settings.timezone.clone(),
            },
            events,
        })
    }

    /// Pretty JSON with four-space indentation
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        serde::Serialize::serialize(self, &mut serializer)?;
        Ok(out)
    }
}
