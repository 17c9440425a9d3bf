//! Command-line interface: one subcommand per pipeline stage plus the API server.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::entities::{DEFAULT_CONCURRENCY, annotation, genome, joined, snp_info};
use crate::sources::snpedia::{DEFAULT_PAGE_SIZE, SnpediaClient};
use crate::sources::{DEFAULT_TIMEOUT_SECS, HttpOptions};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const HOST_ENV: &str = "SNP_HARVEST_HOST";
const PORT_ENV: &str = "SNP_HARVEST_PORT";

#[derive(Parser, Debug)]
#[command(
    name = "snp-harvest",
    version,
    about = "Build a genotype/disease training set from SNPedia and serve predictions"
)]
pub struct Cli {
    /// Output summaries as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Transport flags shared by the commands that talk to the catalog.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Maximum concurrent requests (0 = unbounded)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds (0 = no timeout)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Verify the catalog's TLS certificate chain
    #[arg(long)]
    pub strict_tls: bool,
}

impl FetchArgs {
    fn http_options(&self) -> HttpOptions {
        HttpOptions::new(self.timeout_secs, self.strict_tls)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape every page of the catalog's genotype table into a CSV file
    Harvest {
        /// Output CSV path
        #[arg(long, default_value = "training/disease.csv")]
        output: PathBuf,

        /// Last table offset to request (inclusive)
        #[arg(long, default_value_t = annotation::DEFAULT_MAX_OFFSET)]
        max_offset: usize,

        /// Rows per table page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Rewrite a genome CSV into the catalog's genotype form (A;G, upper-case rsid)
    Normalize {
        /// Raw genome CSV (rsid,chromosome,position,genotype)
        #[arg(long, default_value = "training/genome_raw.csv")]
        input: PathBuf,

        /// Normalized genome CSV
        #[arg(long, default_value = "training/genome.csv")]
        output: PathBuf,
    },

    /// Look up magnitude and repute for every genome reading, one article per reading
    Lookup {
        /// Normalized genome CSV
        #[arg(long, default_value = "training/genome.csv")]
        genome: PathBuf,

        /// Output CSV path
        #[arg(long, default_value = "training/snp_info.csv")]
        output: PathBuf,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Left-join the genome CSV with harvested annotations
    Join {
        /// Normalized genome CSV
        #[arg(long, default_value = "training/genome.csv")]
        genome: PathBuf,

        /// Harvested annotation CSV
        #[arg(long, default_value = "training/disease.csv")]
        disease: PathBuf,

        /// Output CSV path
        #[arg(long, default_value = "training/genomeTrainDisease.csv")]
        output: PathBuf,
    },

    /// Run the status/predict HTTP API
    Serve {
        /// Bind address (falls back to SNP_HARVEST_HOST, then 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (falls back to SNP_HARVEST_PORT, then 8000)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Resolves the bind address for `serve` after `.env` has been loaded.
pub fn serve_address(host: Option<String>, port: Option<u16>) -> anyhow::Result<(String, u16)> {
    let host = host
        .or_else(|| std::env::var(HOST_ENV).ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match port {
        Some(port) => port,
        None => match std::env::var(PORT_ENV) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {PORT_ENV} value '{raw}': {e}"))?,
            _ => DEFAULT_PORT,
        },
    };

    Ok((host, port))
}

fn render<T: serde::Serialize>(json: bool, value: &T, text: String) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text)
    }
}

/// Runs a pipeline subcommand and returns the text to print.
///
/// `serve` is long-running and handled by the binary instead.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let json = cli.json;
    match cli.command {
        Commands::Harvest {
            output,
            max_offset,
            page_size,
            fetch,
        } => {
            let client = SnpediaClient::new(&fetch.http_options())?;
            let options = annotation::HarvestOptions {
                max_offset,
                page_size,
                concurrency: fetch.concurrency,
            };
            let summary = annotation::harvest(&client, &options, &output).await?;
            let text = format!(
                "Saved {} annotations from {}/{} pages to {}",
                summary.records,
                summary.pages - summary.failed_pages,
                summary.pages,
                summary.output.display()
            );
            render(json, &summary, text)
        }
        Commands::Normalize { input, output } => {
            let count = genome::normalize_file(&input, &output)?;
            let text = format!("Normalized {count} genome readings into {}", output.display());
            render(
                json,
                &serde_json::json!({ "readings": count, "output": output }),
                text,
            )
        }
        Commands::Lookup {
            genome: genome_path,
            output,
            fetch,
        } => {
            let readings = genome::read_genome(&genome_path)?;
            let client = SnpediaClient::new(&fetch.http_options())?;
            let summary =
                snp_info::lookup_genome(&client, &readings, fetch.concurrency, &output).await?;
            let text = format!(
                "Saved {} lookups ({} unmeasured) to {}",
                summary.lookups,
                summary.unmeasured,
                summary.output.display()
            );
            render(json, &summary, text)
        }
        Commands::Join {
            genome,
            disease,
            output,
        } => {
            let summary = joined::join_files(&genome, &disease, &output)?;
            let text = format!(
                "Joined {} genome readings ({} annotated) into {}",
                summary.rows,
                summary.annotated,
                summary.output.display()
            );
            render(json, &summary, text)
        }
        Commands::Serve { .. } => Err(anyhow::anyhow!(
            "serve is a long-running command and cannot be run as a pipeline step"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn harvest_defaults_match_catalog_paging() {
        let cli = Cli::try_parse_from(["snp-harvest", "harvest"]).unwrap();
        let Commands::Harvest {
            output,
            max_offset,
            page_size,
            fetch,
        } = cli.command
        else {
            panic!("expected harvest command");
        };
        assert_eq!(output, PathBuf::from("training/disease.csv"));
        assert_eq!(max_offset, 5000);
        assert_eq!(page_size, 500);
        assert_eq!(fetch.concurrency, 0);
        assert_eq!(fetch.timeout_secs, 30);
        assert!(!fetch.strict_tls);
    }

    #[test]
    fn lookup_fans_out_without_a_bound_by_default() {
        let cli = Cli::try_parse_from(["snp-harvest", "lookup"]).unwrap();
        let Commands::Lookup { fetch, .. } = cli.command else {
            panic!("expected lookup command");
        };
        assert_eq!(fetch.concurrency, 0);
    }

    #[test]
    fn fetch_flags_parse_into_http_options() {
        let cli = Cli::try_parse_from([
            "snp-harvest",
            "lookup",
            "--concurrency",
            "8",
            "--timeout-secs",
            "0",
            "--strict-tls",
        ])
        .unwrap();
        let Commands::Lookup { fetch, .. } = cli.command else {
            panic!("expected lookup command");
        };
        let opts = fetch.http_options();
        assert_eq!(fetch.concurrency, 8);
        assert_eq!(opts.timeout, None);
        assert!(!opts.accept_invalid_certs);
    }

    #[test]
    fn serve_address_prefers_explicit_flags() {
        let (host, port) = serve_address(Some("127.0.0.1".into()), Some(9000)).unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 9000);
    }

    #[tokio::test]
    async fn run_join_reports_summary() {
        let dir = tempfile::tempdir().unwrap();
        let genome = dir.path().join("genome.csv");
        let disease = dir.path().join("disease.csv");
        let output = dir.path().join("joined.csv");
        std::fs::write(&genome, "rsid,chromosome,position,genotype\nRS1,1,10,A;A\n").unwrap();
        std::fs::write(
            &disease,
            "rsid,genotype,magnitude,reputation,summary\nrs1,AA,2,Good,ok\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            OsString::from("snp-harvest"),
            OsString::from("join"),
            OsString::from("--genome"),
            genome.into_os_string(),
            OsString::from("--disease"),
            disease.into_os_string(),
            OsString::from("--output"),
            output.clone().into_os_string(),
        ])
        .unwrap();
        let text = run(cli).await.unwrap();
        assert!(text.contains("Joined 1 genome readings (1 annotated)"));
        assert!(output.exists());
    }

    #[tokio::test]
    async fn run_join_missing_genome_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            OsString::from("snp-harvest"),
            OsString::from("join"),
            OsString::from("--genome"),
            dir.path().join("missing.csv").into_os_string(),
        ])
        .unwrap();
        assert!(run(cli).await.is_err());
    }
}
