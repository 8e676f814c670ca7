//! Header-described CSV tables.
//!
//! Every table is written with a fixed header row (even when empty) and
//! replaced atomically, so a rerun never leaves half a table behind.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// A row type with a fixed column order.
pub trait Row: Serialize + DeserializeOwned {
    /// Column names, in the order the fields serialize.
    const HEADERS: &'static [&'static str];
}

/// Read every row of a table written by [`write_table`].
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_table<T: Row>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    read_csv(path.as_ref())
}

/// Read any headered CSV file, deserializing rows by column name.
pub(crate) fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| ErrorKind::from_io(&e, path))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(file);
    reader
        .deserialize()
        .map(|row| row.or_raise(|| ErrorKind::Table(path.to_path_buf())))
        .collect()
}

/// Replace `path` with a table holding `rows`, creating parent directories.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_table<'a, T: Row + 'a>(path: impl AsRef<Path>, rows: impl IntoIterator<Item = &'a T>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(&e, parent))?;
    }
    let partial = partial_path(path);
    let count = write_rows(&partial, rows)?;
    fs::rename(&partial, path).map_err(|e| ErrorKind::from_io(&e, path))?;
    Ok(count)
}

fn write_rows<'a, T: Row + 'a>(path: &Path, rows: impl IntoIterator<Item = &'a T>) -> Result<usize> {
    let file = File::create(path).map_err(|e| ErrorKind::from_io(&e, path))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    writer.write_record(T::HEADERS).or_raise(|| ErrorKind::Table(path.to_path_buf()))?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row).or_raise(|| ErrorKind::Table(path.to_path_buf()))?;
        count += 1;
    }
    writer.flush().map_err(|e| ErrorKind::from_io(&e, path))?;
    Ok(count)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pair {
        name: String,
        count: Option<u32>,
    }
    impl Row for Pair {
        const HEADERS: &'static [&'static str] = &["name", "count"];
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/pairs.csv");
        let rows = vec![Pair { name: "a".into(), count: Some(1) }, Pair { name: "b, c".into(), count: None }];
        assert_eq!(write_table(&path, &rows).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,count\na,1\n\"b, c\",\n");
        assert_eq!(read_table::<Pair>(&path).unwrap(), rows);
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn empty_table_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.csv");
        write_table::<Pair>(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,count\n");
        assert!(read_table::<Pair>(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_table_is_not_found() {
        let err = read_table::<Pair>("/nowhere/pairs.csv").unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound("/nowhere/pairs.csv".into()));
    }

    #[test]
    fn malformed_row_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.csv");
        fs::write(&path, "name,count\na,notanumber\n").unwrap();
        assert!(matches!(*read_table::<Pair>(&path).unwrap_err(), ErrorKind::Table(_)));
    }
}
