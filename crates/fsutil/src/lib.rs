//! # fsutil
//!
//! Filesystem helpers and zip-bomb-safe archive extraction for the tile
//! pipeline.
//!
//! The [`fs`] module wraps the handful of file operations the pipeline
//! needs — size queries, recursive deletion, directory creation, moves,
//! file-store resolution, filesystem walking — with a deliberate split
//! between best-effort helpers (which log a diagnostic and return a safe
//! default) and strict operations (which return [`FsError`]).
//!
//! The [`unzip`] module decompresses a zip byte stream into a destination
//! directory while rejecting entries that would escape it and enforcing a
//! bounded entry count, bounded total output, and bounded per-entry
//! compression ratio.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dest = Path::new("build/sources");
//! let archive = BufReader::new(File::open("downloads/sources.zip")?);
//! let stats = fsutil::unzip(archive, dest)?;
//! println!(
//!     "unpacked {} files ({} bytes)",
//!     stats.entries_written, stats.bytes_written
//! );
//!
//! let store = fsutil::fs::get_file_store(dest)?;
//! println!(
//!     "{} of {} bytes free on {}",
//!     store.available_space,
//!     store.total_space,
//!     store.path.display()
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fs;
pub mod unzip;

// Re-export main types
pub use error::{FsError, UnzipError};
pub use fs::{DeleteOnDrop, FileStore};
pub use unzip::{unzip, unzip_resource, UnzipStats};
