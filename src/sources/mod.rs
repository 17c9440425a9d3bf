//! Source clients and shared HTTP utilities for the upstream genotype catalog.

use std::borrow::Cow;
use std::time::Duration;

use crate::error::HarvestError;

pub mod snpedia;

const ERROR_BODY_MAX_BYTES: usize = 2048;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport settings shared by every catalog request of one run.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Skip certificate chain validation. The catalog's chain fails standard
    /// validation in the deployments this tool targets, so this defaults to on.
    pub accept_invalid_certs: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            accept_invalid_certs: true,
        }
    }
}

impl HttpOptions {
    /// Builds options from CLI-style values: `timeout_secs == 0` disables the timeout.
    pub fn new(timeout_secs: u64, strict_tls: bool) -> Self {
        Self {
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            accept_invalid_certs: !strict_tls,
        }
    }
}

pub(crate) fn env_base(default: &'static str, env_var: &str) -> Cow<'static, str> {
    std::env::var(env_var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(Cow::Owned)
        .unwrap_or_else(|| Cow::Borrowed(default))
}

/// Builds an HTTP client for one harvesting run.
///
/// No retry, cache or rate-limit layers are installed: each fetch is a single
/// attempt and failures are handled by the calling workflow.
pub(crate) fn http_client(options: &HttpOptions) -> Result<reqwest::Client, HarvestError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("snp-harvest/", env!("CARGO_PKG_VERSION")))
        .danger_accept_invalid_certs(options.accept_invalid_certs);

    if let Some(timeout) = options.timeout {
        builder = builder
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)));
    }

    builder.build().map_err(HarvestError::HttpClientInit)
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}

pub(crate) async fn read_limited_body(
    mut resp: reqwest::Response,
    api: &str,
) -> Result<Vec<u8>, HarvestError> {
    let mut body: Vec<u8> = Vec::new();

    while let Some(chunk) = resp.chunk().await? {
        let next_len = body.len().saturating_add(chunk.len());
        if next_len > DEFAULT_MAX_BODY_BYTES {
            return Err(HarvestError::Api {
                api: api.to_string(),
                message: format!("Response body exceeded {DEFAULT_MAX_BODY_BYTES} bytes"),
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
