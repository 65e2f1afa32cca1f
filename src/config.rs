//! Run configuration.
//!
//! [`Options`] is what the user passes (flags or environment variables);
//! [`Config`] is the resolved value handed to the rest of the crate. Nothing
//! outside `main` reads the environment.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::manifest;
use crate::release::{DEFAULT_HOST, RepoId, VersionSpec};
use crate::runtime::Runtime;

pub const DEFAULT_MANIFEST: &str = "package.json";
pub const DEFAULT_BIN_DIR: &str = "bin";

#[derive(clap::Args, Debug, Clone, Default)]
pub struct Options {
    /// Owner of the repository publishing the releases
    #[arg(long, env = "OWNER")]
    pub owner: String,

    /// Repository publishing the releases
    #[arg(long, env = "REPO")]
    pub repo: String,

    /// Release tag to install, or "latest" (defaults to the version in the package manifest)
    #[arg(long, env = "VERSION", value_name = "TAG")]
    pub tag: Option<String>,

    /// Exact asset name to try before the generated candidates
    #[arg(long, env = "ASSET")]
    pub asset: Option<String>,

    /// Token sent as a bearer credential (useful for private repositories and rate limits)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base name of the binary in asset names (defaults to the repository name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Where to install the binary (defaults to bin/<name>)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Package manifest supplying the default version
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Release host
    #[arg(long, value_name = "URL", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Connect and read timeout per request, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub repo: RepoId,
    pub tool_name: String,
    pub version: VersionSpec,
    pub asset: Option<String>,
    pub token: Option<String>,
    pub destination: PathBuf,
    pub host: String,
    pub timeout: Duration,
}

impl Config {
    pub fn load<R: Runtime>(runtime: &R, options: &Options) -> Result<Self> {
        let repo = RepoId::new(&options.owner, &options.repo)?;

        let tool_name = options
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| repo.repo.clone());

        let version = match options.tag.as_deref().filter(|v| !v.is_empty()) {
            Some(version) => VersionSpec::from(version),
            None => manifest::default_version(runtime, &options.manifest)
                .context("Failed to determine the version to install")?,
        };

        let destination = options
            .out
            .clone()
            .unwrap_or_else(|| Path::new(DEFAULT_BIN_DIR).join(&tool_name));
        if destination.file_name().is_none() {
            anyhow::bail!("Install path {:?} does not name a file", destination);
        }

        if options.timeout == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }

        debug!(
            "Installing {} {} from {} into {:?}",
            repo, version, options.host, destination
        );

        Ok(Self {
            repo,
            tool_name,
            version,
            asset: options.asset.clone().filter(|a| !a.is_empty()),
            token: options.token.clone().filter(|t| !t.is_empty()),
            destination,
            host: options.host.clone(),
            timeout: Duration::from_secs(options.timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    fn options() -> Options {
        Options {
            owner: "andrioid".into(),
            repo: "md-social".into(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            host: DEFAULT_HOST.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            ..Default::default()
        }
    }

    fn runtime_without_manifest() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::load(&runtime_without_manifest(), &options()).unwrap();

        assert_eq!(config.repo.to_string(), "andrioid/md-social");
        assert_eq!(config.tool_name, "md-social");
        assert_eq!(config.version, VersionSpec::Latest);
        assert_eq!(config.destination, Path::new("bin").join("md-social"));
        assert_eq!(config.host, "https://github.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.asset.is_none());
        assert!(config.token.is_none());
    }

    #[test]
    fn test_explicit_version_skips_manifest() {
        // Strict mock: any runtime call would panic
        let runtime = MockRuntime::new();
        let opts = Options {
            tag: Some("v2.0.0".into()),
            ..options()
        };

        let config = Config::load(&runtime, &opts).unwrap();
        assert_eq!(config.version, VersionSpec::Tag("v2.0.0".into()));
    }

    #[test]
    fn test_version_from_manifest() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"version": "1.2.3"}"#.to_string()));

        let config = Config::load(&runtime, &options()).unwrap();
        assert_eq!(config.version, VersionSpec::Tag("1.2.3".into()));
    }

    #[test]
    fn test_name_and_out_overrides() {
        let opts = Options {
            name: Some("mds".into()),
            out: Some(PathBuf::from("/opt/tools/mds")),
            ..options()
        };

        let config = Config::load(&runtime_without_manifest(), &opts).unwrap();
        assert_eq!(config.tool_name, "mds");
        assert_eq!(config.destination, PathBuf::from("/opt/tools/mds"));
    }

    #[test]
    fn test_empty_token_and_asset_are_ignored() {
        let opts = Options {
            token: Some(String::new()),
            asset: Some(String::new()),
            ..options()
        };

        let config = Config::load(&runtime_without_manifest(), &opts).unwrap();
        assert!(config.token.is_none());
        assert!(config.asset.is_none());
    }

    #[test]
    fn test_invalid_repo_is_rejected() {
        let opts = Options {
            owner: String::new(),
            ..options()
        };
        assert!(Config::load(&runtime_without_manifest(), &opts).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let opts = Options {
            timeout: 0,
            ..options()
        };
        assert!(Config::load(&runtime_without_manifest(), &opts).is_err());
    }
}
