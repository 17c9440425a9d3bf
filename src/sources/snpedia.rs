use std::borrow::Cow;
use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use crate::entities::annotation::DiseaseAnnotation;
use crate::entities::snp_info::SnpLookup;
use crate::error::HarvestError;
use crate::sources::HttpOptions;

// SNPedia (Semantic MediaWiki)
// Docs: https://www.snpedia.com/index.php/Bulk
const SNPEDIA_BASE: &str = "https://www.snpedia.com/index.php";
const SNPEDIA_API: &str = "snpedia";
const SNPEDIA_BASE_ENV: &str = "SNP_HARVEST_SNPEDIA_BASE";

pub(crate) const DEFAULT_PAGE_SIZE: usize = 500;
const GENOTYPE_QUERY: &str = "[[Category:Is a genotype]]";
const TABLE_PRINTOUTS: &str = "?Magnitude\n?Repute\n?Summary\n";

#[derive(Clone)]
pub struct SnpediaClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
    timeout: Option<Duration>,
}

impl SnpediaClient {
    pub fn new(options: &HttpOptions) -> Result<Self, HarvestError> {
        Ok(Self {
            client: crate::sources::http_client(options)?,
            base: crate::sources::env_base(SNPEDIA_BASE, SNPEDIA_BASE_ENV),
            timeout: options.timeout,
        })
    }

    pub fn with_base(base: impl Into<String>, options: &HttpOptions) -> Result<Self, HarvestError> {
        Ok(Self {
            client: crate::sources::http_client(options)?,
            base: Cow::Owned(base.into()),
            timeout: options.timeout,
        })
    }

    fn base(&self) -> &str {
        self.base.as_ref().trim_end_matches('/')
    }

    /// Paginated `Special:Ask` table of every genotype page, highest magnitude first.
    pub(crate) fn ask_url(&self, offset: usize, page_size: usize) -> Result<Url, HarvestError> {
        let limit = page_size.to_string();
        let offset = offset.to_string();
        Url::parse_with_params(
            self.base(),
            &[
                ("title", "Special:Ask"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("q", GENOTYPE_QUERY),
                ("p", "mainlabel=/format=table"),
                ("po", TABLE_PRINTOUTS),
                ("sort", "Magnitude"),
                ("order", "desc"),
                ("eq", "no"),
            ],
        )
        .map_err(|err| HarvestError::InvalidArgument(format!("Invalid SNPedia base URL: {err}")))
    }

    /// Direct genotype article, e.g. `{base}/Rs53576(A;G)`.
    pub(crate) fn genotype_url(&self, rsid: &str, genotype: &str) -> String {
        format!("{}/{}({})", self.base(), page_title_rsid(rsid), genotype)
    }

    async fn get_text(&self, url: &str) -> Result<String, HarvestError> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.classify(err, url))?;
        let status = resp.status();
        let bytes = crate::sources::read_limited_body(resp, SNPEDIA_API)
            .await
            .map_err(|err| match err {
                HarvestError::Http(err) => self.classify(err, url),
                other => other,
            })?;
        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(HarvestError::Api {
                api: SNPEDIA_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn classify(&self, err: reqwest::Error, url: &str) -> HarvestError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => HarvestError::Timeout {
                api: SNPEDIA_API.to_string(),
                url: url.to_string(),
                seconds: timeout.as_secs(),
            },
            _ => HarvestError::Http(err),
        }
    }

    /// Fetches one page of the genotype table and parses every `row-*` row.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout or a non-success status.
    pub async fn ask_page(
        &self,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<DiseaseAnnotation>, HarvestError> {
        let url = self.ask_url(offset, page_size)?;
        let html = self.get_text(url.as_str()).await?;
        Ok(crate::transform::annotation::from_ask_table(&html))
    }

    /// Fetches the article for one `(rsid, genotype)` pair.
    ///
    /// `genotype` is expected in the catalog's `A;G` form.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout or a non-success status.
    pub async fn genotype_page(
        &self,
        rsid: &str,
        genotype: &str,
    ) -> Result<SnpLookup, HarvestError> {
        let rsid = rsid.trim();
        if rsid.is_empty() {
            return Err(HarvestError::InvalidArgument("rsid is required".into()));
        }
        let url = self.genotype_url(rsid, genotype);
        let html = self.get_text(&url).await?;
        Ok(crate::transform::genotype_page::from_genotype_page(&html))
    }
}

/// MediaWiki titles capitalise only the first letter (`Rs53576`).
fn page_title_rsid(rsid: &str) -> String {
    let lower = rsid.trim().to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
