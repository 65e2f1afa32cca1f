//! Release addressing.
//!
//! Identifies a project (`owner/repo`) and the requested release, and turns
//! them into the download URL prefix under which asset names are looked up.

mod locator;

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

pub use locator::{DEFAULT_HOST, ReleaseLocator, auth_headers, candidate_url};

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: &str, repo: &str) -> Result<Self> {
        if owner.is_empty() || repo.is_empty() || owner.contains('/') || repo.contains('/') {
            anyhow::bail!(
                "Invalid repository '{}/{}'. Owner and repo must be non-empty and contain no '/'.",
                owner,
                repo
            );
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) => RepoId::new(owner, repo),
            None => anyhow::bail!("Invalid repository format. Expected 'owner/repo'."),
        }
    }
}

/// The requested release: a concrete tag or the `latest` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    Latest,
    Tag(String),
}

impl VersionSpec {
    pub const LATEST: &'static str = "latest";
}

impl From<&str> for VersionSpec {
    /// The tag is kept verbatim; no `v` prefix is added or stripped.
    fn from(s: &str) -> Self {
        if s == Self::LATEST {
            VersionSpec::Latest
        } else {
            VersionSpec::Tag(s.to_string())
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => f.write_str(Self::LATEST),
            VersionSpec::Tag(tag) => f.write_str(tag),
        }
    }
}
