//! Platform detection
//!
//! Maps the host's raw OS and CPU identifiers onto the tokens used in release
//! asset names (`darwin`, `linux`, `windows`, `amd64`, `arm64`, ...). Both the
//! Node.js spellings (`win32`, `x64`, `ia32`) and Rust's `std::env::consts`
//! spellings (`macos`, `x86_64`, `aarch64`) are recognized. Anything else is
//! passed through unchanged so unlisted hosts still produce a usable name.

use std::fmt;

/// Operating system token used in asset names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformToken {
    Darwin,
    Linux,
    Windows,
    /// Unrecognized raw identifier, passed through as-is.
    Other(String),
}

impl PlatformToken {
    pub fn as_str(&self) -> &str {
        match self {
            PlatformToken::Darwin => "darwin",
            PlatformToken::Linux => "linux",
            PlatformToken::Windows => "windows",
            PlatformToken::Other(raw) => raw,
        }
    }
}

impl fmt::Display for PlatformToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture token used in asset names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchToken {
    Amd64,
    Arm64,
    Arm,
    I386,
    Ppc64,
    S390x,
    Riscv64,
    /// Unrecognized raw identifier, passed through as-is.
    Other(String),
}

impl ArchToken {
    pub fn as_str(&self) -> &str {
        match self {
            ArchToken::Amd64 => "amd64",
            ArchToken::Arm64 => "arm64",
            // armv6 and armv7 are not told apart
            ArchToken::Arm => "arm",
            ArchToken::I386 => "386",
            ArchToken::Ppc64 => "ppc64",
            ArchToken::S390x => "s390x",
            ArchToken::Riscv64 => "riscv64",
            ArchToken::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ArchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn platform_token(raw_os: &str) -> PlatformToken {
    match raw_os {
        "darwin" | "macos" => PlatformToken::Darwin,
        "linux" => PlatformToken::Linux,
        "win32" | "windows" => PlatformToken::Windows,
        other => PlatformToken::Other(other.to_string()),
    }
}

pub fn arch_token(raw_arch: &str) -> ArchToken {
    match raw_arch {
        "x64" | "x86_64" => ArchToken::Amd64,
        "arm64" | "aarch64" => ArchToken::Arm64,
        "arm" => ArchToken::Arm,
        "ia32" | "x86" => ArchToken::I386,
        "ppc64" | "powerpc64" => ArchToken::Ppc64,
        "s390x" => ArchToken::S390x,
        "riscv64" => ArchToken::Riscv64,
        other => ArchToken::Other(other.to_string()),
    }
}

/// Platform information for asset selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: PlatformToken,
    pub arch: ArchToken,
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_raw(raw_os: &str, raw_arch: &str) -> Self {
        Self {
            os: platform_token(raw_os),
            arch: arch_token(raw_arch),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == PlatformToken::Windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_token_known_values() {
        assert_eq!(platform_token("darwin"), PlatformToken::Darwin);
        assert_eq!(platform_token("macos"), PlatformToken::Darwin);
        assert_eq!(platform_token("linux"), PlatformToken::Linux);
        assert_eq!(platform_token("win32"), PlatformToken::Windows);
        assert_eq!(platform_token("windows"), PlatformToken::Windows);
    }

    #[test]
    fn test_arch_token_known_values() {
        let cases = [
            ("x64", "amd64"),
            ("x86_64", "amd64"),
            ("arm64", "arm64"),
            ("aarch64", "arm64"),
            ("arm", "arm"),
            ("ia32", "386"),
            ("x86", "386"),
            ("ppc64", "ppc64"),
            ("powerpc64", "ppc64"),
            ("s390x", "s390x"),
            ("riscv64", "riscv64"),
        ];
        for (raw, expected) in cases {
            assert_eq!(arch_token(raw).as_str(), expected, "raw arch {}", raw);
        }
    }

    #[test]
    fn test_unknown_values_pass_through() {
        for raw in ["freebsd", "openbsd", "aix", "sunos", ""] {
            assert_eq!(platform_token(raw).as_str(), raw);
        }
        for raw in ["mips64el", "loong64", "sparc64"] {
            assert_eq!(arch_token(raw).as_str(), raw);
        }
        assert_eq!(
            platform_token("freebsd"),
            PlatformToken::Other("freebsd".into())
        );
    }

    #[test]
    fn test_platform_detect() {
        let platform = Platform::detect();

        assert!(!platform.os.as_str().is_empty());
        assert!(!platform.arch.as_str().is_empty());

        #[cfg(target_os = "macos")]
        assert_eq!(platform.os, PlatformToken::Darwin);

        #[cfg(target_os = "linux")]
        assert_eq!(platform.os, PlatformToken::Linux);

        #[cfg(target_os = "windows")]
        assert!(platform.is_windows());

        #[cfg(target_arch = "x86_64")]
        assert_eq!(platform.arch, ArchToken::Amd64);

        #[cfg(target_arch = "aarch64")]
        assert_eq!(platform.arch, ArchToken::Arm64);
    }

    #[test]
    fn test_is_windows() {
        assert!(Platform::from_raw("win32", "x64").is_windows());
        assert!(!Platform::from_raw("linux", "x64").is_windows());
        assert!(!Platform::from_raw("windows_nt", "x64").is_windows());
    }

    #[test]
    fn test_display_matches_as_str() {
        let platform = Platform::from_raw("darwin", "aarch64");
        assert_eq!(format!("{}-{}", platform.os, platform.arch), "darwin-arm64");
    }
}
