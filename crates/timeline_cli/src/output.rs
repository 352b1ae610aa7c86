use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;
use timeline_core::NormalizedPost;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Write posts as CSV with a header row taken from the field names.
pub fn write_csv<W: Write>(writer: W, posts: &[NormalizedPost]) -> Result<(), OutputError> {
    let mut csv = csv::Writer::from_writer(writer);
    for post in posts {
        csv.serialize(post)?;
    }
    csv.flush()?;
    Ok(())
}

/// Atomically write the CSV to `path` by writing a temp file next to it then renaming.
pub fn write_csv_file(path: &Path, posts: &[NormalizedPost]) -> Result<(), OutputError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_csv(tmp.as_file_mut(), posts)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|err| OutputError::Io(err.error))?;
    Ok(())
}
