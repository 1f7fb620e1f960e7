use anyhow::{bail, Context, Result};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Rows sampled per file when inferring column types.
const SCHEMA_SAMPLE_ROWS: usize = 1000;

const BATCH_SIZE: usize = 8192;

/// One year's dataset held in memory between download and upload.
pub struct YearTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl YearTable {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// Parse a downloaded CSV into record batches. Column types come from the
/// reader's own inference over a bounded sample; nothing is validated beyond
/// what the parser enforces.
pub fn load_csv(path: impl AsRef<Path>) -> Result<YearTable> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, Some(SCHEMA_SAMPLE_ROWS))
        .with_context(|| format!("inferring schema of {}", path.display()))?;
    if schema.fields().is_empty() {
        bail!("{} has no columns", path.display());
    }
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(BATCH_SIZE)
        .build(file)
        .context("creating CSV reader")?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;

    Ok(YearTable { schema, batches })
}

/// Load every fetched artifact. A file that fails to parse is logged and its
/// year dropped; the other years still load.
pub fn load_all(artifacts: &BTreeMap<String, PathBuf>) -> BTreeMap<String, YearTable> {
    let mut tables = BTreeMap::new();

    for (year, path) in artifacts {
        match load_csv(path) {
            Ok(table) => {
                info!(
                    year = %year,
                    rows = table.num_rows(),
                    cols = table.schema.fields().len(),
                    "loaded"
                );
                tables.insert(year.clone(), table);
            }
            Err(err) => {
                warn!(year = %year, "skipping unparseable file: {:#}", err);
            }
        }
    }

    tables
}
