use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url} ({reason})")]
    #[diagnostic(
        code(yanked_dl::invalid_url),
        help("Use a full http(s) URL such as https://raw.githubusercontent.com/owner/repo/main/script.sh")
    )]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(yanked_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(
        code(yanked_dl::http_error),
        help("Make sure the file exists on the `main` branch and the repository is public")
    )]
    HttpError { status: u16, url: String },

    #[error("Timed out after {seconds}s while fetching {url}")]
    #[diagnostic(
        code(yanked_dl::timeout),
        help("Raise `download_timeout` in the config file or retry later")
    )]
    Timeout { url: String, seconds: u64 },

    #[error("I/O error: {0}")]
    #[diagnostic(code(yanked_dl::io))]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<ureq::Error> for DownloadError {
    /// Converts a `ureq::Error` into a `DownloadError::Network` variant.
    ///
    /// Callers that know the request URL should prefer [`DownloadError::from_ureq`], which keeps
    /// the status code and the URL.
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

impl DownloadError {
    /// Classifies a `ureq` failure for the request to `url`.
    pub fn from_ureq(err: ureq::Error, url: &str, timeout: std::time::Duration) -> Self {
        match err {
            ureq::Error::StatusCode(status) => {
                Self::HttpError {
                    status,
                    url: url.to_string(),
                }
            }
            ureq::Error::Timeout(_) => {
                Self::Timeout {
                    url: url.to_string(),
                    seconds: timeout.as_secs(),
                }
            }
            ureq::Error::BadUri(reason) => {
                Self::InvalidUrl {
                    url: url.to_string(),
                    reason,
                }
            }
            ureq::Error::Http(err) => {
                Self::InvalidUrl {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            }
            ureq::Error::Io(err) => Self::Io(err),
            other => Self::Network(Box::new(other)),
        }
    }
}
