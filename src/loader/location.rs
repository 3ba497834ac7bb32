//! Locations — the concrete sources a loader draws bytes from.
//!
//! A location is either a directory or a zip archive. The set of locations
//! given to a loader is ordered and immutable; earlier locations shadow later
//! ones. Archive locations parse their entry index once at construction and
//! keep the archive handle open for the lifetime of the owning loader, so
//! membership checks never touch the filesystem and entry reads never reopen
//! the file.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::trace;
use zip::result::ZipError;
use zip::ZipArchive;

use super::error::ConfigurationError;
use super::resources::ResourceHandle;

/// One source of unit bytes and resources.
///
/// Built through [`Location::open`], which validates the path eagerly so a
/// malformed location fails loader construction instead of silently
/// resolving nothing.
#[derive(Debug)]
pub enum Location {
    /// A directory; names are resolved as relative paths beneath it.
    Directory(PathBuf),
    /// A zip archive; names are resolved against its entry index.
    Archive(ArchiveLocation),
}

impl Location {
    /// Open a path as a location, classifying it as a directory or archive.
    ///
    /// Fails with [`ConfigurationError`] if the path is missing, unreadable,
    /// or a file that is not a well-formed zip archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Location, ConfigurationError> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigurationError::Missing(path.to_path_buf())
            } else {
                ConfigurationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        if meta.is_dir() {
            trace!("opened directory location {}", path.display());
            return Ok(Location::Directory(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let archive =
            ZipArchive::new(file).map_err(|source| ConfigurationError::MalformedArchive {
                path: path.to_path_buf(),
                source,
            })?;
        let entries = archive.file_names().map(str::to_owned).collect();
        trace!("opened archive location {}", path.display());
        Ok(Location::Archive(ArchiveLocation {
            path: path.to_path_buf(),
            entries,
            archive: Mutex::new(archive),
        }))
    }

    /// The filesystem path this location was opened from.
    pub fn path(&self) -> &Path {
        match self {
            Location::Directory(path) => path,
            Location::Archive(archive) => &archive.path,
        }
    }

    /// Cheap membership check; never reads bytes.
    pub(crate) fn contains(&self, name: &str) -> bool {
        match self {
            Location::Directory(root) => match resolve_beneath(root, name) {
                Some(path) => path.is_file(),
                None => false,
            },
            Location::Archive(archive) => archive.entries.contains(name),
        }
    }

    /// Read the bytes stored under `name`. Call only after [`Location::contains`].
    pub(crate) fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        match self {
            Location::Directory(root) => {
                let path = resolve_beneath(root, name).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("invalid name `{}`", name))
                })?;
                fs::read(path)
            }
            Location::Archive(archive) => archive.read(name),
        }
    }

    /// An addressable handle for the resource `name`, if this location has it.
    pub(crate) fn resource(&self, name: &str) -> Option<ResourceHandle> {
        match self {
            Location::Directory(root) => {
                let path = resolve_beneath(root, name)?;
                if path.is_file() {
                    Some(ResourceHandle::File(path))
                } else {
                    None
                }
            }
            Location::Archive(archive) => {
                if archive.entries.contains(name) {
                    Some(ResourceHandle::ArchiveEntry {
                        archive: archive.path.clone(),
                        entry: name.to_owned(),
                    })
                } else {
                    None
                }
            }
        }
    }
}

/// A zip archive location with its entry index snapshotted at open time.
#[derive(Debug)]
pub struct ArchiveLocation {
    path: PathBuf,
    entries: HashSet<String>,
    archive: Mutex<ZipArchive<File>>,
}

impl ArchiveLocation {
    fn read(&self, entry: &str) -> io::Result<Vec<u8>> {
        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = archive.by_name(entry).map_err(zip_error_to_io)?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Join `name` under `root`, refusing names that would escape the root.
fn resolve_beneath(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    if relative.is_absolute() {
        return None;
    }
    let escapes = relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return None;
    }
    Some(root.join(relative))
}

pub(crate) fn zip_error_to_io(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(source) => source,
        ZipError::FileNotFound => {
            io::Error::new(io::ErrorKind::NotFound, "entry not found in archive")
        }
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
