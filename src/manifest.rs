//! Local package manifest (`package.json`) lookup.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;

use crate::release::VersionSpec;
use crate::runtime::Runtime;

/// The fields of `package.json` we care about.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl PackageManifest {
    /// Reads the manifest at `path`. A missing file is `Ok(None)`; a file that
    /// is not valid JSON is an error.
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Option<Self>> {
        if !runtime.exists(path) {
            debug!("No package manifest at {:?}", path);
            return Ok(None);
        }
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read package manifest {:?}", path))?;
        let manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse package manifest {:?}", path))?;
        Ok(Some(manifest))
    }
}

/// Version recorded in the manifest, or `latest` when there is none.
pub fn default_version<R: Runtime>(runtime: &R, path: &Path) -> Result<VersionSpec> {
    let version = PackageManifest::load(runtime, path)?
        .and_then(|m| m.version)
        .filter(|v| !v.is_empty());

    Ok(match version {
        Some(version) => VersionSpec::from(version.as_str()),
        None => VersionSpec::Latest,
    })
}
