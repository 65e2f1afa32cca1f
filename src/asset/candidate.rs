use std::collections::HashSet;
use std::path::Path;

use crate::platform::{ArchToken, PlatformToken};

/// Extensions of archive formats we recognize but cannot decode. A name ending
/// in one of these is handed to the decoder selector as-is so it gets rejected
/// there instead of being installed as a raw binary.
const KNOWN_ARCHIVE_EXTENSIONS: &[&str] = &["tar", "tgz", "xz", "bz2", "zst", "7z", "rar"];

/// One guessed remote file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    name: String,
    extension: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = format_extension(&name);
        Self { name, extension }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compression extension without the leading dot; empty for a raw binary.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name with the compression extension stripped,
    /// e.g. `tool-windows-amd64.exe` for `tool-windows-amd64.exe.zip`.
    pub fn stem(&self) -> &str {
        if self.extension.is_empty() {
            return &self.name;
        }
        let end = self.name.len().saturating_sub(self.extension.len() + 1);
        self.name.get(..end).unwrap_or(&self.name)
    }
}

fn format_extension(name: &str) -> String {
    let lower = name.to_lowercase();
    // Compressed tarballs (`.tar.gz`, `.tar.xz`, ...) keep the whole compound
    // extension so they are never mistaken for a gzipped binary.
    if let Some(pos) = lower.rfind(".tar.") {
        let compression = &lower[pos + ".tar.".len()..];
        if !compression.is_empty() && !compression.contains('.') {
            return lower[pos + 1..].to_string();
        }
    }
    if lower.ends_with(".gz") {
        return "gz".to_string();
    }
    if lower.ends_with(".zip") {
        return "zip".to_string();
    }
    match Path::new(&lower).extension().and_then(|e| e.to_str()) {
        Some(ext) if KNOWN_ARCHIVE_EXTENSIONS.contains(&ext) => ext.to_string(),
        // Dots inside a raw binary name (e.g. `tool-1.2-linux-amd64`) are not
        // extensions.
        _ => String::new(),
    }
}

/// Builds the ordered candidate list for `base-platform-arch`:
///
/// 1. the raw binary
/// 2. `.gz`
/// 3. `.exe.zip` (Windows only)
/// 4. `.zip`
pub fn candidates(
    base: &str,
    platform: &PlatformToken,
    arch: &ArchToken,
    is_windows: bool,
) -> Vec<Candidate> {
    let stem = format!("{}-{}-{}", base, platform, arch);
    let names = [
        Some(stem.clone()),
        Some(format!("{}.gz", stem)),
        is_windows.then(|| format!("{}.exe.zip", stem)),
        Some(format!("{}.zip", stem)),
    ];

    dedup(names.into_iter().flatten())
}

/// Puts an exact asset name in front of the generated list.
pub fn with_override(asset: Option<&str>, generated: Vec<Candidate>) -> Vec<Candidate> {
    match asset {
        Some(asset) if !asset.is_empty() => dedup(
            std::iter::once(asset.to_string()).chain(generated.into_iter().map(|c| c.name)),
        ),
        _ => generated,
    }
}

fn dedup(names: impl IntoIterator<Item = String>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .map(Candidate::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(Candidate::name).collect()
    }

    #[test]
    fn test_candidates_non_windows_order() {
        let platform = Platform::from_raw("linux", "x64");
        let list = candidates("md-social", &platform.os, &platform.arch, false);

        assert_eq!(
            names(&list),
            vec![
                "md-social-linux-amd64",
                "md-social-linux-amd64.gz",
                "md-social-linux-amd64.zip",
            ]
        );
        assert!(list.iter().all(|c| !c.name().ends_with(".exe.zip")));
    }

    #[test]
    fn test_candidates_windows_exe_zip_in_third_position() {
        let platform = Platform::from_raw("win32", "x64");
        let list = candidates("md-social", &platform.os, &platform.arch, true);

        assert_eq!(list.len(), 4);
        assert_eq!(list[2].name(), "md-social-windows-amd64.exe.zip");
        assert_eq!(list[3].name(), "md-social-windows-amd64.zip");
    }

    #[test]
    fn test_candidates_have_no_duplicates() {
        for is_windows in [false, true] {
            let list = candidates("tool", &PlatformToken::Linux, &ArchToken::Arm64, is_windows);
            let unique: HashSet<_> = list.iter().map(Candidate::name).collect();
            assert_eq!(unique.len(), list.len());
        }
    }

    #[test]
    fn test_candidates_passthrough_tokens() {
        let platform = Platform::from_raw("freebsd", "mips64");
        let list = candidates("tool", &platform.os, &platform.arch, false);
        assert_eq!(list[0].name(), "tool-freebsd-mips64");
    }

    #[test]
    fn test_candidate_extension_and_stem() {
        let raw = Candidate::new("tool-linux-amd64");
        assert_eq!(raw.extension(), "");
        assert_eq!(raw.stem(), "tool-linux-amd64");

        let gz = Candidate::new("tool-linux-amd64.gz");
        assert_eq!(gz.extension(), "gz");
        assert_eq!(gz.stem(), "tool-linux-amd64");

        let exe_zip = Candidate::new("tool-windows-amd64.exe.zip");
        assert_eq!(exe_zip.extension(), "zip");
        assert_eq!(exe_zip.stem(), "tool-windows-amd64.exe");

        let upper = Candidate::new("TOOL-LINUX-AMD64.ZIP");
        assert_eq!(upper.extension(), "zip");
        assert_eq!(upper.stem(), "TOOL-LINUX-AMD64");
    }

    #[test]
    fn test_candidate_dotted_raw_name_has_no_extension() {
        let c = Candidate::new("tool-1.2-linux-amd64");
        assert_eq!(c.extension(), "");
    }

    #[test]
    fn test_candidate_known_archive_extension_is_kept() {
        assert_eq!(Candidate::new("tool-linux-amd64.tar.xz").extension(), "tar.xz");
        assert_eq!(Candidate::new("tool-linux-amd64.tgz").extension(), "tgz");
        assert_eq!(Candidate::new("tool-linux-amd64.tar").extension(), "tar");
    }

    #[test]
    fn test_candidate_tar_gz_is_not_plain_gzip() {
        let c = Candidate::new("tool-linux-amd64.tar.gz");
        assert_eq!(c.extension(), "tar.gz");
        assert_eq!(c.stem(), "tool-linux-amd64");
        assert!(crate::decompress::Compression::from_extension(c.extension()).is_err());
    }

    #[test]
    fn test_with_override_goes_first_and_dedups() {
        let generated = candidates("tool", &PlatformToken::Linux, &ArchToken::Amd64, false);
        let list = with_override(Some("tool-linux-amd64.gz"), generated);

        assert_eq!(
            names(&list),
            vec![
                "tool-linux-amd64.gz",
                "tool-linux-amd64",
                "tool-linux-amd64.zip",
            ]
        );
    }

    #[test]
    fn test_with_override_none_or_empty() {
        let generated = candidates("tool", &PlatformToken::Linux, &ArchToken::Amd64, false);
        assert_eq!(with_override(None, generated.clone()), generated);
        assert_eq!(with_override(Some(""), generated.clone()), generated);
    }
}
