use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::HarvestError;
use crate::sources::snpedia::{DEFAULT_PAGE_SIZE, SnpediaClient};

pub const ANNOTATION_HEADERS: [&str; 5] = ["rsid", "genotype", "magnitude", "reputation", "summary"];

pub const DEFAULT_MAGNITUDE: &str = "1";
pub const DEFAULT_REPUTATION: &str = "";
pub const DEFAULT_SUMMARY: &str = "";
const PARSE_FAILURE_KEY: &str = "none";

pub const DEFAULT_MAX_OFFSET: usize = 5000;

/// One `(rsid, genotype)` entry of the catalog's genotype table.
///
/// `(rsid, genotype)` is the natural key but is not unique: the same genotype
/// can appear on more than one page of a harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseAnnotation {
    pub rsid: String,
    pub genotype: String,
    #[serde(default)]
    pub magnitude: String,
    #[serde(default)]
    pub reputation: String,
    #[serde(default)]
    pub summary: String,
}

impl DiseaseAnnotation {
    /// Placeholder emitted for a table row that could not be parsed.
    ///
    /// Distinct from [`crate::entities::snp_info::SnpLookup::Unmeasured`], which
    /// means the catalog has no data rather than that its markup was unreadable.
    pub fn parse_failure() -> Self {
        Self {
            rsid: PARSE_FAILURE_KEY.to_string(),
            genotype: PARSE_FAILURE_KEY.to_string(),
            magnitude: DEFAULT_MAGNITUDE.to_string(),
            reputation: DEFAULT_REPUTATION.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
        }
    }

    pub fn is_parse_failure(&self) -> bool {
        *self == Self::parse_failure()
    }
}

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Last offset requested, inclusive.
    pub max_offset: usize,
    pub page_size: usize,
    /// Maximum in-flight page requests; `0` is unbounded.
    pub concurrency: usize,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            max_offset: DEFAULT_MAX_OFFSET,
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: crate::entities::DEFAULT_CONCURRENCY,
        }
    }
}

/// Result of fetching one page of the table.
#[derive(Debug)]
pub struct PageOutcome {
    pub offset: usize,
    pub result: Result<Vec<DiseaseAnnotation>, HarvestError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    pub pages: usize,
    pub failed_pages: usize,
    pub records: usize,
    pub output: PathBuf,
}

/// Offsets `0, page_size, …` up to and including `max_offset`.
pub fn offsets(max_offset: usize, page_size: usize) -> Result<Vec<usize>, HarvestError> {
    if page_size == 0 {
        return Err(HarvestError::InvalidArgument(
            "--page-size must be greater than 0".into(),
        ));
    }
    Ok((0..=max_offset).step_by(page_size).collect())
}

/// Fetches every page concurrently. Outcomes are returned in offset order.
pub async fn fetch_pages(
    client: &SnpediaClient,
    options: &HarvestOptions,
) -> Result<Vec<PageOutcome>, HarvestError> {
    let offsets = offsets(options.max_offset, options.page_size)?;
    let page_size = options.page_size;

    let outcomes = crate::utils::fanout::fan_out(offsets, options.concurrency, |offset| async move {
        let result = client.ask_page(offset, page_size).await;
        if let Ok(rows) = &result {
            info!(offset, rows = rows.len(), "Fetched genotype table page");
        }
        PageOutcome { offset, result }
    })
    .await;

    Ok(outcomes)
}

/// Flattens page outcomes, keeping per-page row order. Failed pages contribute nothing.
pub fn merge_pages(outcomes: Vec<PageOutcome>) -> Vec<DiseaseAnnotation> {
    let mut out = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(rows) => out.extend(rows),
            Err(err) => warn!(
                offset = outcome.offset,
                error = %err,
                "Genotype table page failed; skipping"
            ),
        }
    }
    out
}

pub fn write_annotations(path: &Path, rows: &[DiseaseAnnotation]) -> Result<(), HarvestError> {
    crate::utils::csv_io::write_records(path, &ANNOTATION_HEADERS, rows)
}

pub fn read_annotations(path: &Path) -> Result<Vec<DiseaseAnnotation>, HarvestError> {
    crate::utils::csv_io::read_records(path)
}

/// Harvests the whole genotype table into `output`, replacing any existing file.
///
/// # Errors
///
/// Individual page failures are logged and skipped; only invalid options and
/// failures writing `output` are returned.
pub async fn harvest(
    client: &SnpediaClient,
    options: &HarvestOptions,
    output: &Path,
) -> Result<HarvestSummary, HarvestError> {
    let outcomes = fetch_pages(client, options).await?;
    let pages = outcomes.len();
    let failed_pages = outcomes.iter().filter(|o| o.result.is_err()).count();
    let rows = merge_pages(outcomes);

    write_annotations(output, &rows)?;
    info!(
        records = rows.len(),
        pages,
        failed_pages,
        output = %output.display(),
        "Saved genotype annotations"
    );

    Ok(HarvestSummary {
        pages,
        failed_pages,
        records: rows.len(),
        output: output.to_path_buf(),
    })
}
