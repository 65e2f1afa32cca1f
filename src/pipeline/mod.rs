//! Candidate search: try each guessed asset name in order until one installs.

use anyhow::Result;
use log::{debug, info, warn};
use reqwest::header::HeaderMap;
use std::path::PathBuf;

use crate::asset::{self, Candidate};
use crate::cleanup::SharedCleanupContext;
use crate::config::Config;
use crate::decompress::Compression;
use crate::error::FetchError;
use crate::http::{Fetch, RetrievalOutcome};
use crate::install::InstallWriter;
use crate::platform::Platform;
use crate::release::{ReleaseLocator, auth_headers, candidate_url};
use crate::runtime::Runtime;

/// The artifact that ended the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub candidate: String,
    pub compression: Compression,
    pub path: PathBuf,
    pub bytes: u64,
}

pub struct Orchestrator<'a, R: Runtime, F: Fetch> {
    runtime: &'a R,
    fetcher: &'a F,
    config: &'a Config,
    cleanup_ctx: SharedCleanupContext,
}

impl<'a, R: Runtime, F: Fetch> Orchestrator<'a, R, F> {
    pub fn new(
        runtime: &'a R,
        fetcher: &'a F,
        config: &'a Config,
        cleanup_ctx: SharedCleanupContext,
    ) -> Self {
        Self {
            runtime,
            fetcher,
            config,
            cleanup_ctx,
        }
    }

    /// Candidate names for `platform`, override first.
    pub fn candidates(&self, platform: &Platform) -> Vec<Candidate> {
        let generated = asset::candidates(
            &self.config.tool_name,
            &platform.os,
            &platform.arch,
            platform.is_windows(),
        );
        asset::with_override(self.config.asset.as_deref(), generated)
    }

    /// Tries every candidate in order and stops at the first one that
    /// installs. Fails with [`FetchError::ExhaustedCandidates`] otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, platform: &Platform) -> Result<Installed> {
        let locator = ReleaseLocator::new(&self.config.host, self.config.repo.clone());
        let prefix = locator.url_prefix(&self.config.version);
        let headers = auth_headers(self.config.token.as_deref())?;
        let candidates = self.candidates(platform);

        info!(
            "Looking for {} {} ({}-{}) under {}",
            self.config.repo, self.config.version, platform.os, platform.arch, prefix
        );

        for candidate in &candidates {
            match self.try_candidate(candidate, &prefix, &headers).await {
                Ok(Some(installed)) => return Ok(installed),
                Ok(None) => {}
                Err(e) => match e.downcast_ref::<FetchError>() {
                    Some(FetchError::UnsupportedFormat { .. }) => {
                        warn!("Skipping {}: {}", candidate.name(), e)
                    }
                    _ => warn!("{:#}", e),
                },
            }
        }

        Err(FetchError::ExhaustedCandidates {
            names: candidates.iter().map(|c| c.name().to_string()).collect(),
            prefix,
        }
        .into())
    }

    /// `Ok(None)` when the asset is absent; `Err` when it was found but could
    /// not be installed.
    async fn try_candidate(
        &self,
        candidate: &Candidate,
        prefix: &str,
        headers: &HeaderMap,
    ) -> Result<Option<Installed>> {
        let url = candidate_url(prefix, candidate.name());

        let body = match self.fetcher.fetch(&url, headers).await {
            RetrievalOutcome::Body(body) => body,
            RetrievalOutcome::Absent(reason) => {
                let absent = FetchError::CandidateAbsent {
                    name: candidate.name().to_string(),
                    reason,
                };
                debug!("{}", absent);
                return Ok(None);
            }
        };

        let compression = Compression::from_extension(candidate.extension())?;
        let writer = InstallWriter::new(self.runtime, self.cleanup_ctx.clone());
        let bytes = writer
            .install(
                body,
                compression,
                self.entry_names(candidate),
                &self.config.destination,
            )
            .await
            .map_err(|e| FetchError::StreamIo {
                name: candidate.name().to_string(),
                message: format!("{:#}", e),
            })?;

        info!(
            "Installed {} ({} decoder) to {:?}",
            candidate.name(),
            compression,
            self.config.destination
        );

        Ok(Some(Installed {
            candidate: candidate.name().to_string(),
            compression,
            path: self.config.destination.clone(),
            bytes,
        }))
    }

    /// Zip entry names worth extracting, most specific first.
    fn entry_names(&self, candidate: &Candidate) -> Vec<String> {
        vec![
            candidate.stem().to_string(),
            self.config.tool_name.clone(),
            format!("{}.exe", self.config.tool_name),
        ]
    }
}
