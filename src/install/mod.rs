//! Writes a retrieved asset to its final location.
//!
//! Bytes are decoded into a temporary file next to the destination and only
//! renamed onto it once the whole stream decoded cleanly, so the destination
//! never holds a truncated binary. The temporary file is registered with the
//! cleanup context while it exists so an interrupt can remove it.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::decompress::{Compression, Decoder};
use crate::http::ByteStream;
use crate::runtime::Runtime;

/// Mode of the installed binary on non-Windows hosts.
pub const EXECUTABLE_MODE: u32 = 0o755;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct InstallWriter<'a, R: Runtime> {
    runtime: &'a R,
    cleanup_ctx: SharedCleanupContext,
}

impl<'a, R: Runtime> InstallWriter<'a, R> {
    pub fn new(runtime: &'a R, cleanup_ctx: SharedCleanupContext) -> Self {
        Self {
            runtime,
            cleanup_ctx,
        }
    }

    /// Decodes `body` into `destination`. Returns the number of bytes
    /// received from the network.
    #[tracing::instrument(skip(self, body, entry_names))]
    pub async fn install(
        &self,
        body: ByteStream,
        compression: Compression,
        entry_names: Vec<String>,
        destination: &Path,
    ) -> Result<u64> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.runtime
                .create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let guard = CleanupGuard::new(Arc::clone(&self.cleanup_ctx), temp_path_for(destination));
        let temp_path = guard.path();

        let result = match self
            .write_temp(temp_path, body, compression, entry_names)
            .await
        {
            Ok(received) => self
                .mark_executable(temp_path)
                .and_then(|_| {
                    self.runtime
                        .rename(temp_path, destination)
                        .with_context(|| {
                            format!("Failed to move {:?} to {:?}", temp_path, destination)
                        })
                })
                .map(|_| received),
            Err(e) => Err(e),
        };

        let received = match result {
            Ok(received) => received,
            Err(e) => {
                self.discard(temp_path);
                return Err(e);
            }
        };
        drop(guard);

        Ok(received)
    }

    /// The mode is set on the temporary file and carried over by the rename.
    fn mark_executable(&self, temp_path: &Path) -> Result<()> {
        #[cfg(not(windows))]
        self.runtime
            .set_permissions(temp_path, EXECUTABLE_MODE)
            .with_context(|| format!("Failed to make {:?} executable", temp_path))?;
        #[cfg(windows)]
        let _ = temp_path;
        Ok(())
    }

    async fn write_temp(
        &self,
        temp_path: &Path,
        mut body: ByteStream,
        compression: Compression,
        entry_names: Vec<String>,
    ) -> Result<u64> {
        debug!("Writing {} stream to {:?}", compression, temp_path);
        let file = self
            .runtime
            .create_file(temp_path)
            .with_context(|| format!("Failed to create temporary file at {:?}", temp_path))?;

        let mut decoder = Decoder::new(compression, file, entry_names);
        let mut received: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            decoder
                .write_all(&chunk)
                .with_context(|| format!("Failed to decode {} stream", compression))?;
            received += chunk.len() as u64;
        }

        decoder.finish()?;

        debug!("Received {:.2} MB", received as f64 / (1024.0 * 1024.0));
        Ok(received)
    }

    fn discard(&self, temp_path: &Path) {
        if !self.runtime.exists(temp_path) {
            return;
        }
        if let Err(e) = self.runtime.remove_file(temp_path) {
            warn!("Failed to remove temporary file {:?}: {}", temp_path, e);
        }
    }
}

/// Unique sibling of `destination`, e.g. `bin/.tool.4242-0.tmp`. Being in the
/// same directory keeps the final rename on one file system.
fn temp_path_for(destination: &Path) -> PathBuf {
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    destination.with_file_name(format!(".{}.{}-{}.tmp", file_name, std::process::id(), seq))
}
