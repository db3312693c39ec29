use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Error};

/// Extract the task's test archive into `dest`, wiping any previous content
/// of that directory.
///
/// The tests are expected to sit flat at the root of the archive; an entry
/// inside a directory is a configuration error.
pub fn extract_tests(archive: &Path, dest: &Path) -> Result<(), Error> {
    if dest.exists() {
        std::fs::remove_dir_all(dest)
            .with_context(|| format!("cannot wipe old test directory {}", dest.display()))?;
    }
    std::fs::create_dir_all(dest)
        .with_context(|| format!("cannot create test directory {}", dest.display()))?;

    info!(
        "Extracting '{}' to '{}'",
        archive.display(),
        dest.display()
    );
    let file = File::open(archive)
        .with_context(|| format!("cannot open test archive {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("invalid test archive {}", archive.display()))?;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry
            .enclosed_name()
            .with_context(|| format!("unsafe path {:?} in test archive", entry.name()))?;
        if entry.is_dir() || name.parent() != Some(Path::new("")) {
            bail!("unexpected directory entry {:?} in test archive", entry.name());
        }
        let mut out = File::create(dest.join(&name))
            .with_context(|| format!("cannot write extracted file {}", name.display()))?;
        io::copy(&mut entry, &mut out)?;
    }
    Ok(())
}

/// Rewrite the CRLF and lone CR line endings to LF in every file of `dir`.
pub fn normalize_line_endings(dir: &Path) -> Result<(), Error> {
    info!("Normalizing line endings in '{}'", dir.display());
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("cannot read test directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            bail!("unexpected directory {}", path.display());
        }
        let content = std::fs::read(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let normalized = dos2unix(&content);
        if normalized != content {
            debug!("Rewriting the line endings of {}", path.display());
            std::fs::write(&path, normalized)
                .with_context(|| format!("cannot write {}", path.display()))?;
        }
    }
    Ok(())
}

/// Convert CRLF and lone CR to LF.
fn dos2unix(content: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(content.len());
    let mut bytes = content.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte == b'\r' {
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
            }
            result.push(b'\n');
        } else {
            result.push(byte);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn make_zip(path: &Path, entries: &[(&str, &[u8])], dirs: &[&str]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for dir in dirs {
            writer.add_directory(*dir, options).unwrap();
        }
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_flat_archive() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = dir.path().join("tests.zip");
        make_zip(
            &archive,
            &[("a.i00", b"1\n" as &[u8]), ("a.o00", b"2\n")],
            &[],
        );
        let dest = dir.path().join("tests");
        extract_tests(&archive, &dest).unwrap();
        assert_eq!(std::fs::read(dest.join("a.i00")).unwrap(), b"1\n");
        assert_eq!(std::fs::read(dest.join("a.o00")).unwrap(), b"2\n");
    }

    #[test]
    fn test_extract_wipes_previous_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = dir.path().join("tests.zip");
        make_zip(&archive, &[("a.i00", b"1\n" as &[u8])], &[]);
        let dest = dir.path().join("tests");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("stale.i99"), "old").unwrap();
        extract_tests(&archive, &dest).unwrap();
        assert!(!dest.join("stale.i99").exists());
        assert!(dest.join("a.i00").exists());
    }

    #[test]
    fn test_extract_rejects_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = dir.path().join("tests.zip");
        make_zip(&archive, &[("sub/a.i00", b"1\n" as &[u8])], &["sub"]);
        let dest = dir.path().join("tests");
        assert!(extract_tests(&archive, &dest).is_err());
    }

    #[test]
    fn test_dos2unix() {
        assert_eq!(dos2unix(b"a\r\nb\rc\n"), b"a\nb\nc\n");
        assert_eq!(dos2unix(b"plain\n"), b"plain\n");
        assert_eq!(dos2unix(b"\r\n\r\n"), b"\n\n");
    }

    #[test]
    fn test_normalize_line_endings() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.i00"), "1\r\n2\r\n").unwrap();
        std::fs::write(dir.path().join("a.i01"), "3\n").unwrap();
        normalize_line_endings(dir.path()).unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.i00")).unwrap(), b"1\n2\n");
        assert_eq!(std::fs::read(dir.path().join("a.i01")).unwrap(), b"3\n");
    }
}
