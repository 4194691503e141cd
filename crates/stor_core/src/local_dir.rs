//! Local directory storage.

use crate::backend::{Listing, Meta, Storage};
use crate::config::Config;
use crate::error::{StorageError, StorageResult};
use crate::path::{clean_blob_path, clean_path, join_path, segments};
use crate::storage_type::StorageType;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};
use tempfile::NamedTempFile;

/// The storage type of [`LocalDir`].
pub const LOCAL_DIR_STORAGE_TYPE: StorageType = StorageType::from_static("LocalDir");

/// A storage that keeps blobs as files below a base directory.
///
/// Storage paths map onto the directory tree: `dir1/file2` is stored at
/// `<base_dir>/dir1/file2`. Directories are created on save and removed again
/// once the last blob inside them is deleted. The base directory itself is
/// never removed.
///
/// # Confinement
///
/// Every resolved path is checked to lie within the base directory, in
/// addition to the checks of [`crate::clean_path`]. The check runs twice:
/// lexically on the joined path, then physically on the deepest part of it
/// that exists, with symbolic links resolved. A path that would escape
/// either way fails with [`StorageError::InvalidPath`], so a link below the
/// base directory never grants access outside it.
///
/// A blob cannot replace a directory and cannot be nested below another
/// blob; such saves fail with [`StorageError::InvalidPath`].
///
/// # Durability
///
/// `save` writes to a temporary file next to the target, syncs it, renames
/// it into place and syncs the directory, so a crash never leaves a truncated
/// blob behind.
///
/// # Permissions
///
/// On Unix, blobs get mode `0o660` and directories created for them get mode
/// `0o700`, less the umask.
///
/// # Concurrency
///
/// No in-process locking is done. Concurrent writers are only as safe as the
/// file system makes them; in particular the size check and the read in
/// `load`, directory creation and the write in `save`, and the link check
/// and the access that follows it, are not atomic.
///
/// # Example
///
/// ```no_run
/// use stor_core::{LocalDir, Storage};
///
/// let mut storage = LocalDir::open("/tmp/store").unwrap();
/// storage.save("d1/d2/f", b"data").unwrap();
/// storage.delete("d1/d2/f").unwrap(); // also removes d1/d2 and d1
/// ```
#[derive(Debug, Clone)]
pub struct LocalDir {
    base_dir: PathBuf,
}

impl LocalDir {
    /// Opens a storage on an existing directory.
    ///
    /// A relative `base_dir` is resolved against the current directory, and
    /// symbolic links in it are resolved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidBaseDir`] if the path cannot be
    /// canonicalized, does not exist, or is not a directory.
    pub fn open(base_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let configured = base_dir.as_ref();
        let absolute = fs::canonicalize(configured)
            .map_err(|e| StorageError::invalid_base_dir(configured, e.to_string()))?;

        let metadata = fs::metadata(&absolute)
            .map_err(|e| StorageError::invalid_base_dir(&absolute, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(StorageError::invalid_base_dir(absolute, "not a directory"));
        }

        tracing::debug!(base_dir = %absolute.display(), "opened local directory storage");
        Ok(Self { base_dir: absolute })
    }

    /// Registry constructor. Uses `config.path` as the base directory.
    pub fn from_config(config: &Config) -> StorageResult<Box<dyn Storage>> {
        Ok(Box::new(Self::open(&config.path)?))
    }

    /// Returns the canonical base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves a storage path to an absolute file system path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] if the path is rejected by the
    /// sanitizer or escapes the base directory, lexically or through a
    /// symbolic link.
    pub fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let clean = clean_path(path)?;
        self.resolve_clean(path, &clean)
    }

    fn resolve_clean(&self, raw: &str, clean: &str) -> StorageResult<PathBuf> {
        let mut full = self.base_dir.clone();
        for segment in segments(clean) {
            full.push(segment);
        }
        let full = normalize(&full);

        if escapes_dir(&full, &self.base_dir) {
            return Err(StorageError::invalid_path(
                raw,
                "escapes the base directory",
            ));
        }
        self.check_links(raw, &full)?;
        Ok(full)
    }

    /// Canonicalizes the deepest existing ancestor of `full` (itself
    /// included) and checks that it stays below the base directory.
    ///
    /// Ancestors that don't exist yet cannot be links, so checking the
    /// deepest existing one covers every link on the way.
    fn check_links(&self, raw: &str, full: &Path) -> StorageResult<()> {
        for existing in full.ancestors() {
            if existing == self.base_dir.as_path() {
                break;
            }

            match fs::canonicalize(existing) {
                Ok(real) => {
                    if escapes_dir(&real, &self.base_dir) {
                        tracing::warn!(path = %raw, target = %real.display(), "rejected link out of the base directory");
                        return Err(StorageError::invalid_path(
                            raw,
                            "resolves outside the base directory",
                        ));
                    }
                    return Ok(());
                }
                Err(e) if is_not_found(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Rejects saving `clean` over a directory or below an existing blob.
    fn check_blob_target(raw: &str, clean: &str, full: &Path) -> StorageResult<()> {
        match fs::metadata(full) {
            Ok(metadata) if metadata.is_dir() => {
                return Err(StorageError::invalid_path(raw, "is a directory"));
            }
            Ok(_) => return Ok(()),
            Err(e) if is_not_found(&e) => {}
            Err(e) => return Err(e.into()),
        }

        let depth = segments(clean).count().saturating_sub(1);
        for dir in full.ancestors().skip(1).take(depth) {
            match fs::metadata(dir) {
                Ok(metadata) if metadata.is_dir() => break,
                Ok(_) => {
                    return Err(StorageError::invalid_path(raw, "is below a blob"));
                }
                Err(e) if is_not_found(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Stats a blob. Directories are not blobs.
    fn stat_blob(clean: &str, full: &Path) -> StorageResult<fs::Metadata> {
        let metadata = fs::metadata(full).map_err(|e| not_found_or_io(clean, e))?;
        if !metadata.is_file() {
            return Err(StorageError::path_does_not_exist(clean));
        }
        Ok(metadata)
    }

    /// Removes the now-empty directories between a deleted blob and the base
    /// directory, innermost first.
    ///
    /// Walks at most one directory per segment of `clean` above the blob and
    /// stops at the first directory that is not empty.
    fn prune_empty_parents(&self, clean: &str, full: &Path) {
        let depth = segments(clean).count().saturating_sub(1);

        for dir in full.ancestors().skip(1).take(depth) {
            if dir == self.base_dir.as_path() || escapes_dir(dir, &self.base_dir) {
                break;
            }

            let is_empty = match fs::read_dir(dir) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "cannot inspect directory, stopped pruning");
                    break;
                }
            };
            if !is_empty {
                break;
            }

            // Another writer may have populated the directory in the meantime.
            if let Err(e) = fs::remove_dir(dir) {
                tracing::debug!(dir = %dir.display(), error = %e, "stopped pruning");
                break;
            }
            tracing::debug!(dir = %dir.display(), "pruned empty directory");
        }
    }
}

impl Storage for LocalDir {
    fn meta(&self, path: &str) -> StorageResult<Meta> {
        let clean = clean_path(path)?;
        let full = self.resolve_clean(path, &clean)?;
        let metadata = Self::stat_blob(&clean, &full)?;
        Ok(Meta::with_size(metadata.len()))
    }

    fn list(&self, path: &str) -> StorageResult<Listing> {
        let clean = clean_path(path)?;
        let full = self.resolve_clean(path, &clean)?;

        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(e) if is_not_found(&e) => return Ok(Listing::default()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::warn!(dir = %full.display(), name = ?file_name, "skipping non UTF-8 entry");
                continue;
            };

            let logical = join_path(&clean, name);
            if entry.file_type()?.is_dir() {
                dirs.push(logical);
            } else {
                files.push(logical);
            }
        }

        Ok(Listing::new(files, dirs))
    }

    fn exist(&self, path: &str) -> StorageResult<bool> {
        let clean = clean_path(path)?;
        let full = self.resolve_clean(path, &clean)?;
        match fs::metadata(&full) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self, path: &str, max_size: u64) -> StorageResult<Vec<u8>> {
        let clean = clean_path(path)?;
        let full = self.resolve_clean(path, &clean)?;

        let size = Self::stat_blob(&clean, &full)?.len();
        if size > max_size {
            return Err(StorageError::TooLarge {
                what: clean,
                size,
                max_size,
            });
        }

        // The file may change between the stat above and this read.
        fs::read(&full).map_err(|e| not_found_or_io(&clean, e))
    }

    fn save(&mut self, path: &str, data: &[u8]) -> StorageResult<()> {
        let clean = clean_blob_path(path)?;
        let full = self.resolve_clean(path, &clean)?;
        let parent = full
            .parent()
            .ok_or_else(|| StorageError::invalid_path(path, "has no parent directory"))?;
        Self::check_blob_target(path, &clean, &full)?;

        create_dirs(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(data)?;
        set_blob_permissions(file.as_file())?;
        file.as_file().sync_all()?;
        file.persist(&full).map_err(|e| e.error)?;
        sync_dir(parent)?;

        tracing::debug!(path = %clean, len = data.len(), "LocalDir::save");
        Ok(())
    }

    fn delete(&mut self, path: &str) -> StorageResult<()> {
        let clean = clean_path(path)?;
        if clean.is_empty() {
            return Err(StorageError::path_does_not_exist(clean));
        }
        let full = self.resolve_clean(path, &clean)?;

        Self::stat_blob(&clean, &full)?;
        fs::remove_file(&full).map_err(|e| not_found_or_io(&clean, e))?;
        tracing::debug!(path = %clean, "LocalDir::delete");

        self.prune_empty_parents(&clean, &full);
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        LOCAL_DIR_STORAGE_TYPE
    }
}

/// Mode of saved blobs.
#[cfg(unix)]
const BLOB_MODE: u32 = 0o660;

/// Mode of directories created by `save`.
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

#[cfg(unix)]
fn create_dirs(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(DIR_MODE).create(dir)
}

#[cfg(not(unix))]
fn create_dirs(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Temporary files start out owner-only; blobs get [`BLOB_MODE`] before they
/// are renamed into place.
#[cfg(unix)]
fn set_blob_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(BLOB_MODE))
}

#[cfg(not(unix))]
fn set_blob_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// Syncs a directory so that a rename into it is durable.
///
/// Windows has no directory fsync; NTFS journals the metadata instead.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

fn is_not_found(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn not_found_or_io(clean: &str, e: io::Error) -> StorageError {
    if is_not_found(&e) {
        StorageError::path_does_not_exist(clean)
    } else {
        StorageError::Io(e)
    }
}

/// Resolves `.` and `..` components without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Returns true if `path` is neither `base_dir` nor nested below it.
///
/// Both sides get a trailing separator before the prefix comparison, so
/// `/a/b` does not contain `/a/bc`.
fn escapes_dir(path: &Path, base_dir: &Path) -> bool {
    let path = with_trailing_separator(path);
    let base_dir = with_trailing_separator(base_dir);
    !path.starts_with(&base_dir)
}

fn with_trailing_separator(path: &Path) -> Vec<u8> {
    let mut bytes = path.as_os_str().as_encoded_bytes().to_vec();
    let separator = MAIN_SEPARATOR_STR.as_bytes();
    if !bytes.ends_with(separator) {
        bytes.extend_from_slice(separator);
    }
    bytes
}
