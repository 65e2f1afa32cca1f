//! Decoder selection.
//!
//! Every extension maps to exactly one decoder. There is no fallthrough from
//! one format into another: a `.gz` candidate is always gunzipped and a `.zip`
//! candidate is always opened as an archive.

mod zip;

use anyhow::{Context, Result};
use flate2::write::MultiGzDecoder;
use std::fmt;
use std::io::{self, Write};

use crate::error::FetchError;

pub use self::zip::ZipEntryDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw binary, bytes pass through unchanged.
    None,
    Gzip,
    /// Zip archive; one entry is extracted.
    Zip,
}

impl Compression {
    /// `extension` is given without the leading dot; empty means none.
    pub fn from_extension(extension: &str) -> Result<Self, FetchError> {
        match extension.to_ascii_lowercase().as_str() {
            "" => Ok(Compression::None),
            "gz" => Ok(Compression::Gzip),
            "zip" => Ok(Compression::Zip),
            other => Err(FetchError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zip => write!(f, "zip"),
        }
    }
}

/// Streaming transform in front of a writer. Feed it with [`Write`] and call
/// [`Decoder::finish`] once the input is complete.
pub enum Decoder<W: Write> {
    Identity(W),
    /// Accepts concatenated gzip members, as written by pigz or `cat a.gz b.gz`.
    Gzip(MultiGzDecoder<W>),
    Zip(ZipEntryDecoder<W>),
}

impl<W: Write> Decoder<W> {
    /// `entry_names` lists the zip entry file names to look for, in order of
    /// preference. Ignored by the other formats.
    pub fn new(kind: Compression, out: W, entry_names: Vec<String>) -> Self {
        match kind {
            Compression::None => Decoder::Identity(out),
            Compression::Gzip => Decoder::Gzip(MultiGzDecoder::new(out)),
            Compression::Zip => Decoder::Zip(ZipEntryDecoder::new(out, entry_names)),
        }
    }

    pub fn kind(&self) -> Compression {
        match self {
            Decoder::Identity(_) => Compression::None,
            Decoder::Gzip(_) => Compression::Gzip,
            Decoder::Zip(_) => Compression::Zip,
        }
    }

    /// Completes decoding and returns the flushed writer.
    pub fn finish(self) -> Result<W> {
        match self {
            Decoder::Identity(mut out) => {
                out.flush().context("Failed to flush output")?;
                Ok(out)
            }
            Decoder::Gzip(decoder) => {
                let mut out = decoder.finish().context("Failed to finish gzip stream")?;
                out.flush().context("Failed to flush output")?;
                Ok(out)
            }
            Decoder::Zip(decoder) => decoder.finish(),
        }
    }
}

impl<W: Write> Write for Decoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Decoder::Identity(out) => out.write(buf),
            Decoder::Gzip(decoder) => decoder.write(buf),
            Decoder::Zip(decoder) => decoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Decoder::Identity(out) => out.flush(),
            Decoder::Gzip(decoder) => decoder.flush(),
            Decoder::Zip(decoder) => decoder.flush(),
        }
    }
}

/// Selects the decoder for `extension`, failing for unknown formats.
pub fn transform_for<W: Write>(
    extension: &str,
    out: W,
    entry_names: Vec<String>,
) -> Result<Decoder<W>, FetchError> {
    let kind = Compression::from_extension(extension)?;
    Ok(Decoder::new(kind, out, entry_names))
}
