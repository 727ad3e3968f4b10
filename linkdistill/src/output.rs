/// This module turns the collected [`ResultSet`] into the output artifact.
///
/// # Atomic Replacement
///
/// The artifact is written to a temporary file in the destination's directory,
/// flushed, fsynced and then renamed over the destination. A reader of the
/// destination therefore sees either its previous content or the complete new
/// file:
/// ```text
/// idle → writing temp → commit (fsync + rename) → done
///                    ↘ any error → temp removed → failed
/// ```
/// The temporary file is a `tempfile::NamedTempFile`, which deletes itself when
/// dropped, so every early return on the error path discards it.
///
/// # Format
///
/// The artifact is a gzip stream containing one JSON array of
/// `{"binpackage", "from", "to"}` objects followed by a newline.
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::{DistillError, DistillResult};
use crate::results::{Record, ResultSet};

/// Sorts the set and atomically writes it to `destination`.
///
/// Returns the number of records written.
pub fn finalize(set: ResultSet, destination: &Path) -> DistillResult<usize> {
    let links = set.into_sorted();
    debug!("Writing {} links to {}", links.len(), destination.display());

    write_atomically(destination, true, |w| {
        serde_json::to_writer(&mut *w, &links)?;
        w.write_all(b"\n")
            .map_err(|e| DistillError::output(destination, e))?;
        Ok(())
    })?;

    info!("Wrote {} links to {}", links.len(), destination.display());
    Ok(links.len())
}

/// Writes `destination` through a temporary file, optionally gzip-compressed.
///
/// `write` receives the (compressing) writer. If it or any later step fails,
/// the destination is left untouched and the error is returned.
pub fn write_atomically<F>(destination: &Path, gzip: bool, write: F) -> DistillResult<()>
where
    F: FnOnce(&mut dyn Write) -> DistillResult<()>,
{
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir).map_err(|e| DistillError::output(destination, e))?;
    let mut writer = BufWriter::new(tmp);

    if gzip {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        write(&mut encoder)?;
        writer = encoder
            .finish()
            .map_err(|e| DistillError::output(destination, e))?;
    } else {
        write(&mut writer)?;
    }

    let tmp = writer
        .into_inner()
        .map_err(|e| DistillError::output(destination, e.into_error()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| DistillError::output(destination, e))?;

    // NamedTempFile is created 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o644))
            .map_err(|e| DistillError::output(destination, e))?;
    }

    tmp.persist(destination)
        .map_err(|e| DistillError::output(destination, e.error))?;
    Ok(())
}

/// Reads an artifact written by [`finalize`]
pub fn read_links(path: &Path) -> DistillResult<Vec<Record>> {
    let file = File::open(path).map_err(|e| DistillError::from_io(path, e))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    Ok(serde_json::from_reader(decoder)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_finalize_writes_sorted_gzip_json() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("links.json.gz");

        let set: ResultSet = vec![
            Record::new("zsh", "/bin/sh", "/bin/zsh"),
            Record::new("bash", "/bin/sh", "/bin/bash"),
        ]
        .into_iter()
        .collect();

        assert_eq!(finalize(set, &dest).unwrap(), 2);

        let links = read_links(&dest).unwrap();
        assert_eq!(links[0].subject, "bash");
        assert_eq!(links[1].subject, "zsh");
        assert_eq!(entries(dir.path()), vec!["links.json.gz"]);
    }

    #[test]
    fn test_finalize_empty_set() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("links.json.gz");

        assert_eq!(finalize(ResultSet::new(), &dest).unwrap(), 0);
        assert!(read_links(&dest).unwrap().is_empty());
    }

    #[test]
    fn test_plain_write_replaces_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("plain.json");
        fs::write(&dest, "old").unwrap();

        write_atomically(&dest, false, |w| {
            w.write_all(b"new content")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new content");
        assert_eq!(entries(dir.path()), vec!["plain.json"]);
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("links.json.gz");
        fs::write(&dest, "previous run").unwrap();

        let err = write_atomically(&dest, true, |w| {
            w.write_all(&[b'x'; 100_000])?;
            Err(DistillError::IoError(io::Error::new(
                io::ErrorKind::Other,
                "simulated failure",
            )))
        })
        .unwrap_err();

        assert!(matches!(err, DistillError::IoError(_)));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous run");
        // The temporary file is gone too
        assert_eq!(entries(dir.path()), vec!["links.json.gz"]);
    }

    #[test]
    fn test_failed_write_leaves_no_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("links.json.gz");

        let result = write_atomically(&dest, true, |_| {
            Err(DistillError::IoError(io::Error::new(
                io::ErrorKind::Other,
                "simulated failure",
            )))
        });

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_output_error() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("no/such/dir/links.json.gz");

        let err = finalize(ResultSet::new(), &dest).unwrap_err();
        assert!(matches!(err, DistillError::Output { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_committed_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("links.json.gz");
        finalize(ResultSet::new(), &dest).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
