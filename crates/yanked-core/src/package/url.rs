//! Turning user-supplied GitHub references into download URLs.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    constants::{DEFAULT_BRANCH, RAW_CONTENT_HOST},
    error::YankedError,
    YankedResult,
};

fn repository_regex() -> &'static Regex {
    static REPO_RE: OnceLock<Regex> = OnceLock::new();
    REPO_RE.get_or_init(|| {
        Regex::new(r"^https?://github\.com/([^/?#\s]+)/([^/?#\s]+)")
            .expect("repository pattern is valid")
    })
}

/// Outcome of resolving a user-supplied reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The input already points at raw content; it is both the source and the download URL.
    Raw { url: String },
    /// A repository page. A relative file path is still needed to build the download URL.
    Repository {
        source_url: String,
        owner: String,
        repo: String,
    },
}

impl Resolved {
    pub fn source_url(&self) -> &str {
        match self {
            Resolved::Raw { url } => url,
            Resolved::Repository { source_url, .. } => source_url,
        }
    }

    /// The download URL, if no file path is required.
    pub fn raw_url(&self) -> Option<&str> {
        match self {
            Resolved::Raw { url } => Some(url),
            Resolved::Repository { .. } => None,
        }
    }

    pub fn needs_file_path(&self) -> bool {
        matches!(self, Resolved::Repository { .. })
    }
}

fn invalid_reference(input: &str, reason: &str) -> YankedError {
    YankedError::InvalidReference {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn split_repository(input: &str) -> Option<(String, String)> {
    let caps = repository_regex().captures(input)?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Classifies `input` as a raw-content URL or a repository page.
///
/// Surrounding whitespace is ignored. Raw-content URLs are recognised by their host and are
/// returned untouched.
///
/// # Errors
///
/// * [`YankedError::InvalidReference`] if the input is neither form.
pub fn resolve(input: &str) -> YankedResult<Resolved> {
    let input = input.trim();

    if input.is_empty() {
        return Err(invalid_reference(input, "the URL is empty"));
    }

    if input.contains(RAW_CONTENT_HOST) {
        return Ok(Resolved::Raw {
            url: input.to_string(),
        });
    }

    let (owner, repo) = split_repository(input).ok_or_else(|| {
        invalid_reference(
            input,
            "expected a github.com repository or raw.githubusercontent.com URL",
        )
    })?;

    Ok(Resolved::Repository {
        source_url: input.to_string(),
        owner,
        repo,
    })
}

/// Builds the raw-content URL for `relative_path` inside the repository at `source_url`.
///
/// Pure string transform: `https://github.com/u/r(.git)` and `p/f.sh` become
/// `https://raw.githubusercontent.com/u/r/main/p/f.sh`.
pub fn build_raw_url(source_url: &str, relative_path: &str) -> YankedResult<String> {
    let (owner, repo) = split_repository(source_url.trim())
        .ok_or_else(|| invalid_reference(source_url, "not a github.com repository URL"))?;

    let path = relative_path.trim().trim_start_matches('/');
    if path.is_empty() {
        return Err(invalid_reference(source_url, "the file path is empty"));
    }

    Ok(format!(
        "https://{RAW_CONTENT_HOST}/{owner}/{repo}/{DEFAULT_BRANCH}/{path}"
    ))
}

/// Returns true if `name` is non-empty and only holds ASCII letters, digits, `-` and `_`.
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Like [`validate_name`], but returns [`YankedError::InvalidName`] on failure.
pub fn ensure_valid_name(name: &str) -> YankedResult<()> {
    if validate_name(name) {
        Ok(())
    } else {
        Err(YankedError::InvalidName(name.to_string()))
    }
}

/// Suggests a package name from the last path segment, without its extension.
pub fn suggest_name(url: &str) -> Option<String> {
    let last = url
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .split(['?', '#'])
        .next()?;
    let stem = last.split('.').next().unwrap_or(last);
    validate_name(stem).then(|| stem.to_string())
}
