use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

pub const GENOME_HEADERS: [&str; 4] = ["rsid", "chromosome", "position", "genotype"];

/// Separator the catalog uses between the two alleles of a genotype (`A;G`).
pub const ALLELE_SEPARATOR: char = ';';

/// One marker from a subject's raw genome export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeReading {
    pub rsid: String,
    pub chromosome: String,
    pub position: u64,
    pub genotype: String,
}

/// `AG` → `A;G`. Existing separators and whitespace are dropped first, so the
/// operation is idempotent; alleles are upper-cased.
pub fn normalize_genotype(genotype: &str) -> String {
    let mut out = String::with_capacity(genotype.len() * 2);
    for allele in genotype
        .chars()
        .filter(|c| *c != ALLELE_SEPARATOR && !c.is_whitespace())
    {
        if !out.is_empty() {
            out.push(ALLELE_SEPARATOR);
        }
        out.push(allele.to_ascii_uppercase());
    }
    out
}

/// Identifiers are stored upper-case (`RS53576`); lookups compare them
/// case-insensitively.
pub fn normalize_rsid(rsid: &str) -> String {
    rsid.trim().to_ascii_uppercase()
}

pub fn normalize(reading: &GenomeReading) -> GenomeReading {
    GenomeReading {
        rsid: normalize_rsid(&reading.rsid),
        chromosome: reading.chromosome.clone(),
        position: reading.position,
        genotype: normalize_genotype(&reading.genotype),
    }
}

pub fn normalize_all(readings: &[GenomeReading]) -> Vec<GenomeReading> {
    readings.iter().map(normalize).collect()
}

pub fn read_genome(path: &Path) -> Result<Vec<GenomeReading>, HarvestError> {
    crate::utils::csv_io::read_records(path)
}

pub fn write_genome(path: &Path, readings: &[GenomeReading]) -> Result<(), HarvestError> {
    crate::utils::csv_io::write_records(path, &GENOME_HEADERS, readings)
}

/// Reads `input`, normalizes every reading and writes the result to `output`.
pub fn normalize_file(input: &Path, output: &Path) -> Result<usize, HarvestError> {
    let readings = normalize_all(&read_genome(input)?);
    write_genome(output, &readings)?;
    Ok(readings.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(rsid: &str, genotype: &str) -> GenomeReading {
        GenomeReading {
            rsid: rsid.into(),
            chromosome: "1".into(),
            position: 100,
            genotype: genotype.into(),
        }
    }

    #[test]
    fn normalize_genotype_inserts_separator() {
        assert_eq!(normalize_genotype("AG"), "A;G");
        assert_eq!(normalize_genotype("ag"), "A;G");
        assert_eq!(normalize_genotype("--"), "-;-");
        assert_eq!(normalize_genotype("A"), "A");
        assert_eq!(normalize_genotype(""), "");
    }

    #[test]
    fn normalize_genotype_is_idempotent() {
        assert_eq!(normalize_genotype("A;G"), "A;G");
        assert_eq!(normalize_genotype(&normalize_genotype("CT")), "C;T");
        assert_eq!(normalize_genotype(" C ; T "), "C;T");
    }

    #[test]
    fn normalize_upper_cases_rsid_and_keeps_location() {
        let out = normalize(&reading("rs123", "AG"));
        assert_eq!(out.rsid, "RS123");
        assert_eq!(out.genotype, "A;G");
        assert_eq!(out.chromosome, "1");
        assert_eq!(out.position, 100);
    }

    #[test]
    fn normalize_file_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("genome_raw.csv");
        let output = dir.path().join("genome.csv");
        std::fs::write(
            &input,
            "rsid,chromosome,position,genotype\nrs4477212,1,82154,AA\ni3000001,MT,16519,c\n",
        )
        .unwrap();

        let count = normalize_file(&input, &output).unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            content,
            "rsid,chromosome,position,genotype\nRS4477212,1,82154,A;A\nI3000001,MT,16519,C\n"
        );
    }

    #[test]
    fn read_genome_rejects_non_numeric_position() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("genome.csv");
        std::fs::write(&input, "rsid,chromosome,position,genotype\nrs1,1,abc,AA\n").unwrap();
        assert!(matches!(read_genome(&input), Err(HarvestError::Csv(_))));
    }
}
