//! Recursive directory walking.

use crate::error::{ErrorKind, Result};
use crate::path::to_slash;
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(String),
    Descend(PathBuf),
    Skip,
}

async fn process_entry(root: &Path, entry: DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(&e, &path))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    // Follow symlinks to regular files; drop anything else (broken links, sockets).
    let is_file = file_type.is_file() || fs::metadata(&path).await.is_ok_and(|m| m.is_file());
    if !is_file {
        return Ok(WalkEntry::Skip);
    }
    let relative = path.strip_prefix(root).or_raise(|| ErrorKind::InvalidPath(path.clone()))?;
    Ok(WalkEntry::File(to_slash(relative)?))
}

/// Stream the relative path (forward slashes) of every regular file under `root`.
///
/// A missing root yields nothing. Directories that can't be read yield an
/// error and the walk carries on with the rest of the tree.
pub fn walk_files(root: &Path) -> impl Stream<Item = Result<String>> + Send + '_ {
    let mut stack = vec![root.to_path_buf()];
    stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(&err, &current)));
                    continue 'dirs;
                }
            };
            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(e) => { yield Err(exn::Exn::from(ErrorKind::from_io(&e, &current))); continue 'dirs; },
                };
                match process_entry(root, entry).await {
                    Ok(WalkEntry::File(f)) => yield Ok(f),
                    Ok(WalkEntry::Descend(d)) => stack.push(d),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                };
            }
        }
    }
}
