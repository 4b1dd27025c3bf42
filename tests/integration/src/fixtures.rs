//! Test fixtures and utilities

use uuid::Uuid;

pub const API_URL_ENV: &str = "CSVPIPE_API_URL";

/// Header of a schema-complete ESG file
pub const ESG_HEADER: &str = "reported_date,company_name,perm_id,data_type,disclosure,metric_description,metric_name,metric_unit,metric_value,metric_year,nb_points_of_observations,metric_period,provider_name,pillar,headquarter_country";

/// Generate a unique upload file name for testing
pub fn unique_file_name() -> String {
    format!("test-{}.csv", &Uuid::new_v4().to_string()[..8])
}

/// A schema-complete CSV with one row per metric name
pub fn esg_csv(metric_names: &[&str]) -> String {
    let mut csv = ESG_HEADER.to_string();
    for metric in metric_names {
        csv.push('\n');
        csv.push_str(&format!(
            "2024-01-01,Acme,123,E,Y,desc,{},tons,42,2024,1,annual,ProviderX,Environmental,AU",
            metric
        ));
    }
    csv.push('\n');
    csv
}

/// API base URL, loading `.env` first
pub fn api_url() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var(API_URL_ENV).ok()
}

/// Skip test if API URL is not configured
#[macro_export]
macro_rules! skip_if_no_api {
    () => {
        match $crate::fixtures::api_url() {
            Some(url) => $crate::client::CsvPipeClient::new(&url),
            None => {
                eprintln!("Skipping test: CSVPIPE_API_URL not set");
                return;
            }
        }
    };
}
