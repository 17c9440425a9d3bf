use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entities::genome::{GenomeReading, normalize_genotype};
use crate::error::HarvestError;
use crate::sources::snpedia::SnpediaClient;

pub const SNP_INFO_HEADERS: [&str; 4] = ["rsid", "genotype", "magnitude", "reputation"];

pub const UNMEASURED_MAGNITUDE: &str = "-1";
pub const UNMEASURED_REPUTATION: &str = "unmeasured";

/// Outcome of looking up one genotype article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnpLookup {
    Measured {
        magnitude: String,
        reputation: String,
    },
    /// No article, no infobox, or the fetch failed.
    Unmeasured,
}

impl SnpLookup {
    pub(crate) fn measured(magnitude: Option<String>, reputation: Option<String>) -> Self {
        Self::Measured {
            magnitude: magnitude.unwrap_or_else(|| UNMEASURED_MAGNITUDE.to_string()),
            reputation: reputation.unwrap_or_else(|| UNMEASURED_REPUTATION.to_string()),
        }
    }
}

/// Flat row written by the lookup pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpInfo {
    pub rsid: String,
    pub genotype: String,
    pub magnitude: String,
    pub reputation: String,
}

impl SnpInfo {
    pub fn new(rsid: &str, genotype: &str, lookup: SnpLookup) -> Self {
        let (magnitude, reputation) = match lookup {
            SnpLookup::Measured {
                magnitude,
                reputation,
            } => (magnitude, reputation),
            SnpLookup::Unmeasured => (
                UNMEASURED_MAGNITUDE.to_string(),
                UNMEASURED_REPUTATION.to_string(),
            ),
        };
        Self {
            rsid: rsid.to_string(),
            genotype: genotype.to_string(),
            magnitude,
            reputation,
        }
    }

    pub fn is_unmeasured(&self) -> bool {
        self.magnitude == UNMEASURED_MAGNITUDE && self.reputation == UNMEASURED_REPUTATION
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupSummary {
    pub lookups: usize,
    pub unmeasured: usize,
    pub output: PathBuf,
}

/// Looks up one pair; any failure is logged and reported as unmeasured.
pub async fn lookup_one(client: &SnpediaClient, rsid: &str, genotype: &str) -> SnpInfo {
    let genotype = normalize_genotype(genotype);
    let lookup = match client.genotype_page(rsid, &genotype).await {
        Ok(lookup) => lookup,
        Err(err) => {
            warn!(rsid, genotype = %genotype, error = %err, "Genotype lookup failed");
            SnpLookup::Unmeasured
        }
    };
    SnpInfo::new(rsid, &genotype, lookup)
}

/// Looks up every pair concurrently, returning results in input order.
pub async fn lookup_all(
    client: &SnpediaClient,
    pairs: &[(String, String)],
    concurrency: usize,
) -> Vec<SnpInfo> {
    crate::utils::fanout::fan_out(pairs, concurrency, |(rsid, genotype)| {
        lookup_one(client, rsid, genotype)
    })
    .await
}

/// Looks up every reading of a genome table and writes one row per reading.
pub async fn lookup_genome(
    client: &SnpediaClient,
    genome: &[GenomeReading],
    concurrency: usize,
    output: &Path,
) -> Result<LookupSummary, HarvestError> {
    let pairs: Vec<(String, String)> = genome
        .iter()
        .map(|r| (r.rsid.clone(), r.genotype.clone()))
        .collect();
    let rows = lookup_all(client, &pairs, concurrency).await;
    let unmeasured = rows.iter().filter(|r| r.is_unmeasured()).count();

    crate::utils::csv_io::write_records(output, &SNP_INFO_HEADERS, &rows)?;
    info!(
        lookups = rows.len(),
        unmeasured,
        output = %output.display(),
        "Saved genotype lookups"
    );

    Ok(LookupSummary {
        lookups: rows.len(),
        unmeasured,
        output: output.to_path_buf(),
    })
}
