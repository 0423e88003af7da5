//! Error types for filesystem operations and archive extraction.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures from strict filesystem operations.
///
/// The best-effort helpers in [`crate::fs`] (size queries, deletion, the
/// filesystem walk) never surface errors; everything here belongs to the
/// operations later pipeline stages depend on.
#[derive(Debug, Error)]
pub enum FsError {
    /// Renaming `from` to `to` failed.
    #[error("unable to move {from} to {to}")]
    Move {
        /// Source path of the move
        from: PathBuf,
        /// Destination path of the move
        to: PathBuf,
        /// Underlying cause
        source: io::Error,
    },

    /// Creating a directory chain failed for a reason other than "already exists".
    #[error("unable to create directories {path}")]
    CreateDirectory {
        /// The directory that could not be created
        path: PathBuf,
        /// Underlying cause
        source: io::Error,
    },

    /// Creating the parent chain of a path failed.
    #[error("unable to create parent directories for {path}")]
    CreateParents {
        /// The path whose parents could not be created
        path: PathBuf,
        /// Underlying cause
        source: io::Error,
    },

    /// No ancestor of the path, up to and including the filesystem root,
    /// resolved to a mounted file store.
    #[error("cannot get file store for {path}")]
    FileStore {
        /// The path the lookup started from
        path: PathBuf,
        /// Last error seen while walking ancestors
        source: io::Error,
    },
}

/// Failures raised while extracting a zip archive.
///
/// The path-safety rejection and the three zip-bomb thresholds are distinct
/// variants so diagnostics keep the offending value.
#[derive(Debug, Error)]
pub enum UnzipError {
    /// Entry name is absolute or escapes the destination directory.
    #[error("bad zip entry: {name}")]
    BadEntry {
        /// The stored entry name
        name: String,
    },

    /// A single entry decompressed to more than
    /// [`MAX_COMPRESSION_RATIO`](crate::unzip::MAX_COMPRESSION_RATIO) times
    /// its declared compressed size.
    #[error("ratio between compressed and uncompressed data is highly suspicious {ratio:.1}x, looks like a zip bomb attack")]
    SuspiciousRatio {
        /// The offending decompressed-to-compressed ratio
        ratio: f64,
    },

    /// The archive decompressed to more than
    /// [`MAX_TOTAL_BYTES`](crate::unzip::MAX_TOTAL_BYTES) bytes in total.
    #[error("the uncompressed data size {bytes}B is too much for the application resource capacity")]
    CapacityExceeded {
        /// Cumulative decompressed bytes written when the limit tripped
        bytes: u64,
    },

    /// The archive contained more than
    /// [`MAX_ENTRIES`](crate::unzip::MAX_ENTRIES) file entries.
    #[error("too many entries in this archive ({count}), can lead to inodes exhaustion of the system")]
    TooManyEntries {
        /// Entries processed when the limit tripped
        count: u64,
    },

    /// No bundled resource with the given name could be located.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A strict filesystem operation failed while materializing entries.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The input is not a well-formed zip stream.
    #[error("malformed zip stream: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An I/O error occurred during extraction.
    #[error(transparent)]
    Io(#[from] io::Error),
}
