use anyhow::Result;
use reqwest::Client;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

use crate::config::{self, DATASETS};

/// Download one year's CSV and save it under `data_dir`, overwriting any
/// previous run's artifact. Returns the saved path.
pub async fn download_year(
    client: &Client,
    year: &str,
    url: &str,
    data_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_path = config::artifact_path(data_dir, year);

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client.get(url).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(&dest_path, &bytes).await?;

    Ok(dest_path)
}

/// Download every configured year in sequence. A failed download is logged
/// and its year left out of the result; the remaining years still run.
pub async fn fetch_all(client: &Client, data_dir: impl AsRef<Path>) -> BTreeMap<String, PathBuf> {
    let data_dir = data_dir.as_ref();
    let mut artifacts = BTreeMap::new();

    for &(year, url) in DATASETS {
        match download_year(client, year, url, data_dir).await {
            Ok(path) => {
                info!(year, path = %path.display(), "downloaded");
                artifacts.insert(year.to_string(), path);
            }
            Err(err) => {
                error!(year, "download failed: {}", err);
            }
        }
    }

    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn failed_download_leaves_no_artifact() {
        let dir = tempdir().unwrap();
        let client = Client::new();

        let res = download_year(&client, "2019", "not a url", dir.path()).await;
        assert!(res.is_err());
        assert!(!config::artifact_path(dir.path(), "2019").exists());
    }
}
