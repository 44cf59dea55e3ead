//! Append-only file persistence.
//!
//! Every write command that succeeds is appended to the file in its request form, RESP encoded.
//! On startup the file is read back from the beginning and each entry is applied again, through
//! the same dispatcher clients use, to rebuild the store.

use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::config::AppendFsync;
use crate::dispatch;
use crate::frame::{self, Frame};
use crate::store::Store;

#[derive(Debug, ThisError)]
pub enum AofError {
    #[error("append-only file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("append-only file is corrupt at byte {offset}: {source}")]
    Corrupt {
        offset: u64,
        #[source]
        source: frame::Error,
    },
}

/// Open handle for appending entries.
#[derive(Debug)]
pub struct Aof {
    file: File,
    path: PathBuf,
    fsync: AppendFsync,
}

impl Aof {
    /// Opens `path` for appending, creating it when it does not exist.
    pub async fn open(path: impl AsRef<Path>, fsync: AppendFsync) -> Result<Aof, AofError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        debug!(path = %path.display(), ?fsync, "Opened append-only file");

        Ok(Aof { file, path, fsync })
    }

    /// Appends one request. With [`AppendFsync::Always`] the entry is on disk when this returns.
    pub async fn append(&mut self, entry: &Frame) -> Result<(), AofError> {
        self.file.write_all(&entry.serialize()).await?;
        self.file.flush().await?;

        if self.fsync == AppendFsync::Always {
            self.file.sync_data().await?;
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of a replay.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Entries applied to the store.
    pub applied: usize,
    /// Entries that did not name a known command or had bad arguments.
    pub skipped: usize,
    /// Size of the incomplete entry cut from the end of the file, if any.
    pub truncated_bytes: u64,
}

/// Rebuilds `store` from the append-only file at `path`.
///
/// A missing file is an empty log. An entry cut short at the end of the file, which is what a
/// crash in the middle of an append leaves behind, is dropped and the file is truncated to the
/// last complete entry. Anything else that fails to decode stops the replay with
/// [`AofError::Corrupt`].
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn replay(path: impl AsRef<Path>, store: &Store) -> Result<ReplayStats, AofError> {
    let path = path.as_ref();
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("No append-only file found, starting with an empty store");
            return Ok(ReplayStats::default());
        }
        Err(err) => return Err(err.into()),
    };

    let mut stats = ReplayStats::default();
    let mut cursor = Cursor::new(&data[..]);

    while (cursor.position() as usize) < data.len() {
        let offset = cursor.position();

        match Frame::parse(&mut cursor) {
            Ok(entry) => match dispatch::apply_from_log(entry, store) {
                Ok(()) => stats.applied += 1,
                Err(err) => {
                    warn!(offset, "Skipping append-only file entry: {}", err);
                    stats.skipped += 1;
                }
            },
            Err(frame::Error::Incomplete) => {
                stats.truncated_bytes = data.len() as u64 - offset;
                warn!(
                    offset,
                    bytes = stats.truncated_bytes,
                    "Incomplete entry at the end of the append-only file, truncating"
                );
                truncate(path, offset).await?;
                break;
            }
            Err(source) => return Err(AofError::Corrupt { offset, source }),
        }
    }

    info!(
        applied = stats.applied,
        skipped = stats.skipped,
        keys = store.strings().size(),
        hashes = store.hashes().size(),
        "Replayed append-only file"
    );

    Ok(stats)
}

async fn truncate(path: &Path, len: u64) -> Result<(), AofError> {
    let file = OpenOptions::new().write(true).open(path).await?;
    file.set_len(len).await?;
    file.sync_all().await?;

    Ok(())
}
