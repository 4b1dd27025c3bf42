//! Environment configuration shared by all handlers

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{Error, Result};
use crate::filter::MetricAllowList;
use crate::models::Destination;
use crate::presign::UploadPolicy;
use crate::schema::SCHEMA_FIELDS;

const BUCKET_NAME_ENV: &str = "BUCKET_NAME";
const ALLOWED_BUCKETS_ENV: &str = "ALLOWED_BUCKETS";
const CSV_DELIMITER_ENV: &str = "CSV_DELIMITER";
const TIMEZONE_ENV: &str = "TIMEZONE_LABEL";
const METRIC_ALLOW_LIST_ENV: &str = "METRIC_ALLOW_LIST";
const REQUIRED_COLUMNS_ENV: &str = "REQUIRED_COLUMNS";
const DATA_SOURCE_ENV: &str = "DATA_SOURCE";
const DATASET_TYPE_ENV: &str = "DATASET_TYPE";
const DATASET_ID_ENV: &str = "DATASET_ID";

const DEFAULT_BUCKET_NAME: &str = "dev-sierra-e-bucket";
const DEFAULT_TIMEZONE: &str = "GMT+11";
const DEFAULT_DATA_SOURCE: &str = "ClarityAI_Dataset";
const DEFAULT_DATASET_TYPE: &str = "Environmental_Risk";
const DEFAULT_DATASET_ID: &str =
    "https://ap-southeast-2.console.aws.amazon.com/s3/buckets/sierra-e-bucket";

pub const UPLOAD_PREFIX: &str = "rawCSV/";
pub const JSON_OUTPUT_PREFIX: &str = "processedJSON/";
pub const CSV_OUTPUT_PREFIX: &str = "processedCSV/";
pub const OUTPUT_FILENAME: &str = "environmental_risk";
pub const UPLOAD_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// Headers attached to responses served to browser clients
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "OPTIONS, GET, POST"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization, file, bucket",
    ),
];

/// CSV field delimiter for a data source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Comma,
    Pipe,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Pipe => b'|',
        }
    }
}

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "," | "comma" => Ok(Delimiter::Comma),
            "|" | "pipe" => Ok(Delimiter::Pipe),
            other => Err(Error::Config(format!("unsupported CSV delimiter '{}'", other))),
        }
    }
}

/// Header fields of the generated event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogSettings {
    pub data_source: String,
    pub dataset_type: String,
    pub dataset_id: String,
    pub timezone: String,
}

impl Default for EventLogSettings {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            dataset_type: DEFAULT_DATASET_TYPE.to_string(),
            dataset_id: DEFAULT_DATASET_ID.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// Everything a handler needs to know about its deployment
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub delimiter: Delimiter,
    pub required_columns: Vec<String>,
    pub metric_allow_list: MetricAllowList,
    pub event_log: EventLogSettings,
    pub upload: UploadPolicy,
    pub json_output: Destination,
    pub csv_output: Destination,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            required_columns: SCHEMA_FIELDS.iter().map(|f| f.to_string()).collect(),
            metric_allow_list: MetricAllowList::default(),
            event_log: EventLogSettings::default(),
            upload: UploadPolicy::single_tenant(DEFAULT_BUCKET_NAME),
            json_output: Destination::new(JSON_OUTPUT_PREFIX, format!("{}.json", OUTPUT_FILENAME)),
            csv_output: Destination::new(CSV_OUTPUT_PREFIX, format!("{}.csv", OUTPUT_FILENAME)),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(delimiter) = get(CSV_DELIMITER_ENV) {
            config.delimiter = delimiter.parse()?;
        }

        if let Some(extra) = get(REQUIRED_COLUMNS_ENV) {
            for column in split_list(&extra) {
                if !config.required_columns.contains(&column) {
                    config.required_columns.push(column);
                }
            }
        }

        if let Some(metrics) = get(METRIC_ALLOW_LIST_ENV) {
            let names = split_list(&metrics);
            if names.is_empty() {
                return Err(Error::Config(format!("{} is empty", METRIC_ALLOW_LIST_ENV)));
            }
            config.metric_allow_list = MetricAllowList::new(names);
        }

        let settings = &mut config.event_log;
        if let Some(v) = get(DATA_SOURCE_ENV) {
            settings.data_source = v;
        }
        if let Some(v) = get(DATASET_TYPE_ENV) {
            settings.dataset_type = v;
        }
        if let Some(v) = get(DATASET_ID_ENV) {
            settings.dataset_id = v;
        }
        if let Some(v) = get(TIMEZONE_ENV) {
            settings.timezone = v;
        }

        config.upload = match get(ALLOWED_BUCKETS_ENV) {
            Some(list) => {
                let buckets = split_list(&list);
                if buckets.is_empty() {
                    return Err(Error::Config(format!("{} is empty", ALLOWED_BUCKETS_ENV)));
                }
                UploadPolicy::multi_tenant(buckets)
            }
            None => {
                let bucket = get(BUCKET_NAME_ENV).unwrap_or_else(|| DEFAULT_BUCKET_NAME.to_string());
                UploadPolicy::single_tenant(bucket)
            }
        };

        Ok(config)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
