use anyhow::{Context, Result, anyhow};
use log::debug;
use std::io::{self, Cursor, Read, Seek, Write};
use zip::ZipArchive;

/// Extracts a single entry from a zip archive.
///
/// The zip central directory sits at the end of the file, so the archive is
/// buffered in memory while it streams in and unpacked on [`finish`].
///
/// [`finish`]: ZipEntryDecoder::finish
pub struct ZipEntryDecoder<W: Write> {
    buffer: Vec<u8>,
    entry_names: Vec<String>,
    out: W,
}

impl<W: Write> ZipEntryDecoder<W> {
    pub fn new(out: W, entry_names: Vec<String>) -> Self {
        Self {
            buffer: Vec::new(),
            entry_names,
            out,
        }
    }

    pub fn finish(self) -> Result<W> {
        let Self {
            buffer,
            entry_names,
            mut out,
        } = self;

        let mut archive =
            ZipArchive::new(Cursor::new(buffer)).context("Failed to parse ZIP archive")?;
        let index = select_entry(&mut archive, &entry_names)?;

        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("Failed to read ZIP entry {}", index))?;
        debug!("Extracting ZIP entry {}", entry.name());
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract ZIP entry {}", entry.name()))?;
        out.flush().context("Failed to flush output")?;

        Ok(out)
    }
}

impl<W: Write> Write for ZipEntryDecoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Picks the entry whose file name matches one of `wanted` (first match in
/// `wanted` order wins), or the only file if the archive holds exactly one.
fn select_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, wanted: &[String]) -> Result<usize> {
    let mut files = Vec::new();
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read ZIP entry {}", i))?;
        if entry.is_dir() {
            continue;
        }
        let file_name = match entry.enclosed_name() {
            Some(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => {
                debug!("Skipping entry with invalid path");
                continue;
            }
        };
        files.push((i, file_name));
    }

    for name in wanted {
        if let Some((i, _)) = files.iter().find(|(_, file_name)| file_name == name) {
            return Ok(*i);
        }
    }

    match files.as_slice() {
        [(i, _)] => Ok(*i),
        [] => Err(anyhow!("Archive appears to be empty.")),
        _ => Err(anyhow!(
            "ZIP archive holds {} files and none is named {}",
            files.len(),
            wanted.join(" or ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn create_test_archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    fn extract(archive: &[u8], wanted: &[&str]) -> Result<String> {
        let wanted = wanted.iter().map(|s| s.to_string()).collect();
        let mut decoder = ZipEntryDecoder::new(Vec::new(), wanted);
        decoder.write_all(archive)?;
        Ok(String::from_utf8(decoder.finish()?)?)
    }

    #[test]
    fn test_extract_named_entry() -> Result<()> {
        let archive = create_test_archive(&[
            ("README.md", "docs"),
            ("tool-windows-amd64.exe", "binary"),
            ("LICENSE", "license"),
        ]);

        assert_eq!(extract(&archive, &["tool-windows-amd64.exe"])?, "binary");
        Ok(())
    }

    #[test]
    fn test_extract_named_entry_in_subdirectory() -> Result<()> {
        let archive = create_test_archive(&[
            ("dist/tool", "binary"),
            ("dist/tool.1", "manpage"),
        ]);

        assert_eq!(extract(&archive, &["tool-linux-amd64", "tool"])?, "binary");
        Ok(())
    }

    #[test]
    fn test_extract_prefers_earlier_wanted_name() -> Result<()> {
        let archive = create_test_archive(&[("tool", "plain"), ("tool-linux-amd64", "exact")]);

        assert_eq!(extract(&archive, &["tool-linux-amd64", "tool"])?, "exact");
        Ok(())
    }

    #[test]
    fn test_extract_single_file_regardless_of_name() -> Result<()> {
        let archive = create_test_archive(&[("something-else", "only file")]);

        assert_eq!(extract(&archive, &["tool"])?, "only file");
        Ok(())
    }

    #[test]
    fn test_extract_skips_directory_entries() -> Result<()> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.add_directory("bin/", options)?;
        zip.start_file("bin/tool", options)?;
        zip.write_all(b"nested")?;
        let archive = zip.finish()?.into_inner();

        assert_eq!(extract(&archive, &[])?, "nested");
        Ok(())
    }

    #[test]
    fn test_extract_ambiguous_archive() {
        let archive = create_test_archive(&[("a", "1"), ("b", "2")]);

        let err = extract(&archive, &["tool"]).unwrap_err();
        assert!(err.to_string().contains("none is named tool"));
    }

    #[test]
    fn test_extract_empty_archive() {
        let archive = create_test_archive(&[]);
        assert!(extract(&archive, &["tool"]).is_err());
    }

    #[test]
    fn test_extract_corrupted_archive() {
        let err = extract(b"corrupted data", &["tool"]).unwrap_err();
        assert!(err.to_string().contains("Failed to parse ZIP archive"));
    }
}
