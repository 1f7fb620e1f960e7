use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Year → CSV download URL for the 311 service-request dumps on the city's
/// CKAN portal. Each year is a separate datastore resource.
pub static DATASETS: &[(&str, &str)] = &[
    (
        "2019",
        "https://data.boston.gov/datastore/dump/ea2e4696-4a2d-429c-9807-d02c9443fa88?format=csv",
    ),
    (
        "2020",
        "https://data.boston.gov/datastore/dump/6ff6a6fd-3141-4440-a880-6f60a37fe789?format=csv",
    ),
    (
        "2021",
        "https://data.boston.gov/datastore/dump/f53ebccd-bc61-49f9-83db-625f209c95f5?format=csv",
    ),
    (
        "2022",
        "https://data.boston.gov/datastore/dump/81a7b022-f8fc-4da5-80e4-b160058ca207?format=csv",
    ),
    (
        "2023",
        "https://data.boston.gov/datastore/dump/e6013a93-1321-4f2a-bf91-8d8a02f1e62f?format=csv",
    ),
    (
        "2024",
        "https://data.boston.gov/datastore/dump/dff4d804-5031-443a-8409-8344efd0e5c8?format=csv",
    ),
];

pub const DATA_DIR: &str = "data";
pub const BUCKET: &str = "city-311-lake";
pub const KEY_PREFIX: &str = "bronze";

/// The portal rejects requests with a default library user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Credentials and region the S3 client reads from the environment.
pub static REQUIRED_ENV_VARS: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_DEFAULT_REGION",
];

/// Local artifact path for one year's raw download.
pub fn artifact_path(dir: impl AsRef<Path>, year: &str) -> PathBuf {
    dir.as_ref().join(format!("data_{year}.csv"))
}

/// Object key for one year's parquet upload.
pub fn object_key(year: &str) -> String {
    format!("{KEY_PREFIX}/data_{year}.parquet")
}

fn missing_vars(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    REQUIRED_ENV_VARS
        .iter()
        .filter(|name| lookup(name).map_or(true, |v| v.trim().is_empty()))
        .copied()
        .collect()
}

/// Fail fast before any I/O if the run is missing credentials or a region.
pub fn ensure_env() -> Result<()> {
    let missing = missing_vars(|name| env::var(name).ok());
    if !missing.is_empty() {
        bail!("missing required environment variables: {}", missing.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn artifact_path_is_keyed_by_year() {
        let p = artifact_path("data", "2021");
        assert_eq!(p, PathBuf::from("data/data_2021.csv"));
    }

    #[test]
    fn object_key_lands_under_bronze_prefix() {
        assert_eq!(object_key("2024"), "bronze/data_2024.parquet");
    }

    #[test]
    fn six_distinct_years_configured() {
        assert_eq!(DATASETS.len(), 6);
        let mut years: Vec<&str> = DATASETS.iter().map(|(y, _)| *y).collect();
        years.dedup();
        assert_eq!(years.len(), 6);
    }

    #[test]
    fn missing_vars_reports_unset_and_blank() {
        let mut env = HashMap::new();
        env.insert("AWS_ACCESS_KEY_ID", "AKIA123".to_string());
        env.insert("AWS_SECRET_ACCESS_KEY", "   ".to_string());

        let missing = missing_vars(|name| env.get(name).cloned());
        assert_eq!(missing, vec!["AWS_SECRET_ACCESS_KEY", "AWS_DEFAULT_REGION"]);
    }

    #[test]
    fn missing_vars_empty_when_all_present() {
        let missing = missing_vars(|_| Some("x".to_string()));
        assert!(missing.is_empty());
    }
}
