use anyhow::{Context, Result};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::{RepoId, VersionSpec};

pub const DEFAULT_HOST: &str = "https://github.com";

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Computes release download URLs for one project.
#[derive(Debug, Clone)]
pub struct ReleaseLocator {
    host: String,
    repo: RepoId,
}

impl ReleaseLocator {
    pub fn new(host: &str, repo: RepoId) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            repo,
        }
    }

    /// Prefix (with trailing slash) that asset names are appended to.
    pub fn url_prefix(&self, version: &VersionSpec) -> String {
        match version {
            VersionSpec::Latest => format!(
                "{}/{}/{}/releases/latest/download/",
                self.host, self.repo.owner, self.repo.repo
            ),
            VersionSpec::Tag(tag) => format!(
                "{}/{}/{}/releases/download/{}/",
                self.host, self.repo.owner, self.repo.repo, tag
            ),
        }
    }
}

/// Full URL of one candidate asset under `prefix`.
pub fn candidate_url(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, utf8_percent_encode(name, COMPONENT))
}

/// Headers for authenticated requests. Empty without a credential.
pub fn auth_headers(credential: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(token) = credential.filter(|t| !t.is_empty()) {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("GITHUB_TOKEN contains characters not allowed in an HTTP header")?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("Using GITHUB_TOKEN for authentication: {}", mask(token));
    }

    Ok(headers)
}

fn mask(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if token.chars().count() > 12 {
        format!("*********{}", tail)
    } else {
        "*********".to_string()
    }
}
