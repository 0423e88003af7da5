//! Zip extraction hardened against zip bombs and path traversal.
//!
//! Entries are streamed in archive order and written in fixed-size chunks so
//! peak memory stays bounded regardless of the sizes an archive declares.
//! Three fixed thresholds bound the damage a malicious archive can do: a cap
//! on file entries, a cap on cumulative decompressed output, and a cap on the
//! per-entry compression ratio. The ratio is checked after every chunk, so a
//! bomb is rejected long before it is fully decompressed.

use crate::error::UnzipError;
use crate::fs;
use serde::Serialize;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use zip::read::read_zipfile_from_stream;

/// Maximum number of file entries a single archive may contain.
pub const MAX_ENTRIES: u64 = 10_000;

/// Maximum cumulative decompressed size of a single archive, in bytes.
pub const MAX_TOTAL_BYTES: u64 = 1_000_000_000;

/// Maximum ratio between an entry's decompressed output and its declared
/// compressed size.
pub const MAX_COMPRESSION_RATIO: f64 = 1_000.0;

/// Entries are decompressed in chunks of this many bytes.
const CHUNK_SIZE: usize = 2048;

/// Environment variable overriding where [`unzip_resource`] looks for
/// bundled archives. When unset, resources are resolved from a `resources`
/// directory next to the running executable.
pub const RESOURCE_DIR_VAR: &str = "FSUTIL_RESOURCE_DIR";

/// Statistics about a completed extraction.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UnzipStats {
    /// Number of file entries written.
    pub entries_written: u64,
    /// Total decompressed bytes written to disk.
    pub bytes_written: u64,
}

/// Extracts a zip-formatted byte stream into `dest_dir`.
///
/// Entry names are validated before anything is written: absolute names and
/// names that escape `dest_dir` through `..` segments abort the whole
/// extraction. Output files are opened with exclusive-create semantics, so
/// an entry whose destination already exists fails rather than silently
/// overwriting it. `dest_dir` need not pre-exist; missing directories are
/// created as entries require them.
///
/// No cleanup is performed on failure; entries written before the failing
/// one remain on disk.
///
/// # Errors
///
/// Returns an error if:
/// - an entry name is absolute or escapes the destination directory
/// - a zip-bomb threshold is exceeded ([`MAX_ENTRIES`], [`MAX_TOTAL_BYTES`],
///   [`MAX_COMPRESSION_RATIO`])
/// - the input is not a well-formed zip stream
/// - an I/O error occurs
pub fn unzip<R: Read>(mut input: R, dest_dir: &Path) -> Result<UnzipStats, UnzipError> {
    let mut stats = UnzipStats::default();
    while let Some(mut entry) = read_zipfile_from_stream(&mut input)? {
        let name = entry.name().to_string();
        let destination = dest_dir.join(sanitize_entry_name(&name)?);

        if entry.is_dir() {
            fs::create_directory(&destination)?;
            continue;
        }

        debug!("extracting {name}");
        fs::create_parent_directories([&destination])?;
        let mut output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)?;
        stats.entries_written += 1;

        let declared_size = entry.compressed_size();
        let mut entry_bytes: u64 = 0;
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            let read = match entry.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            output.write_all(&buffer[..read])?;
            entry_bytes += read as u64;
            stats.bytes_written += read as u64;

            let ratio = compression_ratio(entry_bytes, declared_size);
            if ratio > MAX_COMPRESSION_RATIO {
                return Err(UnzipError::SuspiciousRatio { ratio });
            }
        }

        if stats.bytes_written > MAX_TOTAL_BYTES {
            return Err(UnzipError::CapacityExceeded {
                bytes: stats.bytes_written,
            });
        }
        if stats.entries_written > MAX_ENTRIES {
            return Err(UnzipError::TooManyEntries {
                count: stats.entries_written,
            });
        }
    }
    Ok(stats)
}

/// Extracts a zip archive bundled with the running application.
///
/// Resources live in the directory named by [`RESOURCE_DIR_VAR`] when set,
/// falling back to a `resources` directory next to the running executable.
/// A leading `/` in `resource` is ignored, matching resource-style names
/// like `"/fonts.zip"`.
///
/// # Errors
///
/// Fails with [`UnzipError::ResourceNotFound`] if no such resource exists,
/// and otherwise like [`unzip`].
pub fn unzip_resource(resource: &str, dest_dir: &Path) -> Result<UnzipStats, UnzipError> {
    let path = resource_path(resource)
        .ok_or_else(|| UnzipError::ResourceNotFound(resource.to_string()))?;
    unzip(BufReader::new(File::open(path)?), dest_dir)
}

fn resource_path(resource: &str) -> Option<PathBuf> {
    let root = match env::var_os(RESOURCE_DIR_VAR) {
        Some(dir) => PathBuf::from(dir),
        None => env::current_exe().ok()?.parent()?.join("resources"),
    };
    let path = root.join(resource.trim_start_matches('/'));
    path.is_file().then_some(path)
}

/// Normalizes an entry's stored name into a relative path that stays inside
/// the destination directory.
///
/// `.` segments are dropped and `..` segments collapse against preceding
/// ones; a name that is absolute, climbs above the destination, or
/// normalizes to nothing is rejected.
fn sanitize_entry_name(name: &str) -> Result<PathBuf, UnzipError> {
    let mut normalized = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(UnzipError::BadEntry {
                        name: name.to_string(),
                    });
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(UnzipError::BadEntry {
                    name: name.to_string(),
                });
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(UnzipError::BadEntry {
            name: name.to_string(),
        });
    }
    Ok(normalized)
}

/// Decompressed-to-declared-compressed ratio for one entry. A declared
/// compressed size of zero with any produced output counts as infinitely
/// suspicious rather than a division by zero.
fn compression_ratio(entry_bytes: u64, declared_size: u64) -> f64 {
    if declared_size == 0 {
        return f64::INFINITY;
    }
    entry_bytes as f64 / declared_size as f64
}
