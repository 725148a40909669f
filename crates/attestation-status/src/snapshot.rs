//! Local status-list snapshot
//!
//! The snapshot is the known-good status list as of build time. It backs the
//! remote endpoint whenever the network is unavailable or the fetch fails.

use super::error::StatusError;
use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

/// Status list bundled into the binary at build time
pub static EMBEDDED_SNAPSHOT: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/status.json"));

/// Source of the raw local status document
pub trait SnapshotSource: Send + Sync {
    /// Raw snapshot bytes
    fn load(&self) -> Result<Cow<'_, [u8]>, StatusError>;
}

/// Where the local snapshot is read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SnapshotLoader {
    /// Build-time embedded document
    #[default]
    Embedded,
    /// Document shipped next to the binary
    File(PathBuf),
    /// In-memory document
    Bytes(Vec<u8>),
}

/// Only the `File` variant can fail; a missing file is a packaging defect
/// and is reported as [`StatusError::IoError`].
impl SnapshotSource for SnapshotLoader {
    fn load(&self) -> Result<Cow<'_, [u8]>, StatusError> {
        match self {
            SnapshotLoader::Embedded => Ok(Cow::Borrowed(EMBEDDED_SNAPSHOT)),
            SnapshotLoader::File(path) => Ok(Cow::Owned(fs::read(path)?)),
            SnapshotLoader::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}
