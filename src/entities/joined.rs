use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entities::annotation::{DiseaseAnnotation, read_annotations};
use crate::entities::genome::{ALLELE_SEPARATOR, GenomeReading, read_genome};
use crate::error::HarvestError;

pub const JOINED_HEADERS: [&str; 7] = [
    "rsid",
    "chromosome",
    "position",
    "genotype",
    "magnitude",
    "reputation",
    "summary",
];

/// A genome reading extended with its catalog annotation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub rsid: String,
    pub chromosome: String,
    pub position: u64,
    pub genotype: String,
    pub magnitude: String,
    pub reputation: String,
    pub summary: String,
}

impl JoinedRecord {
    fn new(reading: &GenomeReading, annotation: Option<&DiseaseAnnotation>) -> Self {
        let (magnitude, reputation, summary) = match annotation {
            Some(a) => (a.magnitude.clone(), a.reputation.clone(), a.summary.clone()),
            None => Default::default(),
        };
        Self {
            rsid: reading.rsid.clone(),
            chromosome: reading.chromosome.clone(),
            position: reading.position,
            genotype: reading.genotype.clone(),
            magnitude,
            reputation,
            summary,
        }
    }

    pub fn is_annotated(&self) -> bool {
        !(self.magnitude.is_empty() && self.reputation.is_empty() && self.summary.is_empty())
    }
}

/// Composite join key: rsid lower-cased, genotype upper-cased with separators
/// removed and alleles sorted.
///
/// Genome rows carry `A;G` after normalization while harvested annotations carry
/// `AG`, so both sides reduce to the same key. A genotype is an unordered allele
/// pair, so `G;A` and `AG` share a key too.
pub fn join_key(rsid: &str, genotype: &str) -> (String, String) {
    let mut alleles: Vec<char> = genotype
        .chars()
        .filter(|c| *c != ALLELE_SEPARATOR && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    alleles.sort_unstable();
    (rsid.trim().to_ascii_lowercase(), alleles.into_iter().collect())
}

/// Left join of `genome` against `annotations` on [`join_key`].
///
/// Emits exactly one record per genome reading, in genome order. When several
/// annotations share a key the first one wins.
pub fn left_join(genome: &[GenomeReading], annotations: &[DiseaseAnnotation]) -> Vec<JoinedRecord> {
    let mut index: HashMap<(String, String), &DiseaseAnnotation> =
        HashMap::with_capacity(annotations.len());
    for annotation in annotations {
        if let Entry::Vacant(slot) = index.entry(join_key(&annotation.rsid, &annotation.genotype)) {
            slot.insert(annotation);
        }
    }

    genome
        .iter()
        .map(|reading| {
            let key = join_key(&reading.rsid, &reading.genotype);
            JoinedRecord::new(reading, index.get(&key).copied())
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinSummary {
    pub rows: usize,
    pub annotated: usize,
    pub output: PathBuf,
}

/// Joins the genome and annotation CSV files into `output`.
pub fn join_files(genome: &Path, disease: &Path, output: &Path) -> Result<JoinSummary, HarvestError> {
    let readings = read_genome(genome)?;
    let annotations = read_annotations(disease)?;
    let joined = left_join(&readings, &annotations);
    let annotated = joined.iter().filter(|r| r.is_annotated()).count();

    crate::utils::csv_io::write_records(output, &JOINED_HEADERS, &joined)?;
    info!(
        rows = joined.len(),
        annotated,
        output = %output.display(),
        "Saved joined genome annotations"
    );

    Ok(JoinSummary {
        rows: joined.len(),
        annotated,
        output: output.to_path_buf(),
    })
}
