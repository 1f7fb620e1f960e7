use anyhow::{Context, Result};
use aws_sdk_s3::{primitives::ByteStream, Client};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::info;

use crate::config;
use crate::load::YearTable;

/// Serialize one year's table to parquet entirely in memory.
pub fn table_to_parquet_bytes(table: &YearTable) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let cursor = Cursor::new(&mut buffer);

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(cursor, table.schema.clone(), Some(props))
        .context("creating parquet writer")?;
    for batch in &table.batches {
        writer.write(batch).context("writing batch to parquet")?;
    }
    writer.close().context("closing parquet writer")?;

    Ok(buffer)
}

pub async fn upload_bytes(s3: &Client, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .send()
        .await
        .with_context(|| format!("uploading s3://{bucket}/{key}"))?;
    Ok(())
}

/// Upload every loaded table in year order, overwriting whatever key already
/// exists. The first failed upload aborts the rest of the batch.
pub async fn publish_all(
    s3: &Client,
    bucket: &str,
    tables: &BTreeMap<String, YearTable>,
) -> Result<()> {
    for (year, table) in tables {
        let key = config::object_key(year);
        let bytes = table_to_parquet_bytes(table)
            .with_context(|| format!("serializing year {year}"))?;
        let parquet_bytes = bytes.len();
        upload_bytes(s3, bucket, &key, bytes).await?;
        info!(year = %year, parquet_bytes, "uploaded to s3://{}/{}", bucket, key);
    }
    Ok(())
}
