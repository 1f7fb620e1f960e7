use anyhow::{Context, Result};
use bronze_etl::{config, fetch, load, publish};
use reqwest::Client;
use std::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) credentials, checked before any I/O ──────────────────────
    dotenvy::dotenv().ok();
    config::ensure_env()?;

    fs::create_dir_all(config::DATA_DIR)?;

    let client = Client::builder()
        .user_agent(config::USER_AGENT)
        .build()
        .context("building HTTP client")?;
    let aws_cfg = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3 = aws_sdk_s3::Client::new(&aws_cfg);

    // ─── 3) fetch → load → publish ───────────────────────────────────
    let artifacts = fetch::fetch_all(&client, config::DATA_DIR).await;
    info!(
        "{} of {} years downloaded",
        artifacts.len(),
        config::DATASETS.len()
    );

    let tables = load::load_all(&artifacts);
    info!("{} years loaded", tables.len());

    publish::publish_all(&s3, config::BUCKET, &tables).await?;

    info!("all done");
    Ok(())
}
