#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum HarvestError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {api}: {message}")]
    Api { api: String, message: String },

    #[error("Request to {api} timed out after {seconds}s: {url}")]
    Timeout {
        api: String,
        url: String,
        seconds: u64,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::HarvestError;

    #[test]
    fn api_error_display_includes_api_name() {
        let err = HarvestError::Api {
            api: "snpedia".to_string(),
            message: "HTTP 503".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("snpedia"));
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn timeout_display_includes_url_and_seconds() {
        let err = HarvestError::Timeout {
            api: "snpedia".to_string(),
            url: "https://www.snpedia.com/index.php/Rs53576(A;G)".to_string(),
            seconds: 30,
        };

        let msg = err.to_string();
        assert!(msg.contains("30s"));
        assert!(msg.contains("Rs53576(A;G)"));
    }

    #[test]
    fn invalid_argument_display_includes_reason() {
        let err = HarvestError::InvalidArgument("--page-size must be positive".into());
        assert!(err.to_string().contains("--page-size must be positive"));
    }
}
