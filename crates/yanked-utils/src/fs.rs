use std::{
    fs::{self, Permissions},
    io::Write,
    os::unix::fs::PermissionsExt,
    path::Path,
};

use crate::error::{FileSystemError, FileSystemResult};

/// Mode given to files that did not exist before they were written.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Owner execute bit.
pub const OWNER_EXEC: u32 = 0o100;

pub trait FileSystemProvider {
    /// Creates a directory structure if it doesn't exist.
    ///
    /// If the directory already exists, this function does nothing. If the path exists but is
    /// not a directory, this function returns an error.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::Directory`] if the directory could not be created.
    /// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()>;

    /// Writes `contents` to `path` so that readers only ever see the old or the new content.
    ///
    /// The data goes to a temporary file in the same directory, is synced, and is then renamed
    /// over the destination. If the destination already exists its permission bits are carried
    /// over to the new file, otherwise the new file gets [`DEFAULT_FILE_MODE`].
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::NoParent`] if `path` has no parent directory.
    /// * [`FileSystemError::File`] if creating, writing or renaming the temporary file fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use yanked_utils::error::FileSystemResult;
    /// use yanked_utils::fs::{FileSystemProvider, StandardFileSystemProvider};
    ///
    /// fn main() -> FileSystemResult<()> {
    ///     let fs = StandardFileSystemProvider;
    ///     fs.atomic_write("/tmp/records.json", b"{}")?;
    ///     Ok(())
    /// }
    /// ```
    fn atomic_write<P: AsRef<Path>>(&self, path: P, contents: &[u8]) -> FileSystemResult<()>;

    /// Adds the owner execute bit to `path`, keeping every other mode bit.
    ///
    /// Returns the resulting mode.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::File`] if the metadata cannot be read or the mode cannot be set.
    fn make_executable<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<u32>;
}

#[derive(Default, Clone)]
pub struct StandardFileSystemProvider;

impl FileSystemProvider for StandardFileSystemProvider {
    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "create",
                source: err,
            })?;
        } else if !path.is_dir() {
            return Err(FileSystemError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }

    fn atomic_write<P: AsRef<Path>>(&self, path: P, contents: &[u8]) -> FileSystemResult<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => {
                return Err(FileSystemError::NoParent {
                    path: path.to_path_buf(),
                })
            }
        };

        let file_err = |action: &'static str| {
            let path = path.to_path_buf();
            move |err: std::io::Error| FileSystemError::File {
                path,
                action,
                source: err,
            }
        };

        let mode = match fs::metadata(path) {
            Ok(meta) => meta.permissions().mode() & 0o7777,
            Err(_) => DEFAULT_FILE_MODE,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".yanked-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(file_err("create temporary"))?;

        tmp.write_all(contents).map_err(file_err("write"))?;
        tmp.flush().map_err(file_err("flush"))?;
        tmp.as_file()
            .set_permissions(Permissions::from_mode(mode))
            .map_err(file_err("set permissions on"))?;
        tmp.as_file().sync_all().map_err(file_err("sync"))?;

        tmp.persist(path)
            .map_err(|err| file_err("replace")(err.error))?;

        Ok(())
    }

    fn make_executable<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<u32> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|err| FileSystemError::File {
            path: path.to_path_buf(),
            action: "inspect",
            source: err,
        })?;

        let mode = meta.permissions().mode() | OWNER_EXEC;
        fs::set_permissions(path, Permissions::from_mode(mode)).map_err(|err| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "set permissions on",
                source: err,
            }
        })?;

        Ok(mode)
    }
}

/// Creates a directory structure if it doesn't exist.
///
/// See [`FileSystemProvider::ensure_dir_exists`] for detailed documentation.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    StandardFileSystemProvider.ensure_dir_exists(path)
}

/// Replaces the content of `path` through a temporary file and a rename.
///
/// See [`FileSystemProvider::atomic_write`] for detailed documentation.
pub fn atomic_write<P: AsRef<Path>>(path: P, contents: &[u8]) -> FileSystemResult<()> {
    StandardFileSystemProvider.atomic_write(path, contents)
}

/// Sets the owner execute bit on `path`.
///
/// See [`FileSystemProvider::make_executable`] for detailed documentation.
pub fn make_executable<P: AsRef<Path>>(path: P) -> FileSystemResult<u32> {
    StandardFileSystemProvider.make_executable(path)
}
