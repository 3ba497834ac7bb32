//! Resource handles and the merged, two-segment resource enumeration.
//!
//! [`MergedResources`] composes "all local matches, in location order" with
//! "everything the parent enumerates" into one lazy, forward-only sequence:
//!
//! ```text
//! State machine:  LOCAL_ACTIVE ──local dry──▶ PARENT_ACTIVE ──parent dry──▶ EXHAUSTED
//!                      │                                                        ▲
//!                      └────────────────no parent────────────────────────────────┘
//! ```
//!
//! The parent segment is not constructed until the local segment is dry, so a
//! caller that stops after the local matches never pays for the parent's
//! enumeration. Sequences are single-pass; request a fresh one from
//! [`IsolatedLoader::resolve_all_resources`] to re-iterate.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use zip::ZipArchive;

use super::error::ExhaustedError;
use super::location::{zip_error_to_io, Location};
use super::resolver::IsolatedLoader;

/// An addressable reference to a data blob, distinct from a unit.
///
/// Handles address bytes by location, not by content: [`ResourceHandle::read`]
/// materializes the bytes on demand, and for archive entries opens the archive
/// independently, so a handle stays usable after its loader is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceHandle {
    /// A plain file under a directory location.
    File(PathBuf),
    /// An entry inside an archive location.
    ArchiveEntry { archive: PathBuf, entry: String },
}

impl ResourceHandle {
    /// Read the addressed bytes.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            ResourceHandle::File(path) => fs::read(path),
            ResourceHandle::ArchiveEntry { archive, entry } => {
                let file = File::open(archive)?;
                let mut archive = ZipArchive::new(file).map_err(zip_error_to_io)?;
                let mut entry = archive.by_name(entry).map_err(zip_error_to_io)?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceHandle::File(path) => write!(f, "{}", path.display()),
            ResourceHandle::ArchiveEntry { archive, entry } => {
                write!(f, "{}!/{}", archive.display(), entry)
            }
        }
    }
}

/// Lazy enumeration of every match for one resource name: local locations in
/// construction order first, then the parent's complete enumeration.
///
/// Consume it as a plain [`Iterator`], or through [`MergedResources::try_next`]
/// when misuse after exhaustion should surface as an error instead of `None`.
pub struct MergedResources {
    name: String,
    state: State,
}

enum State {
    /// Scanning this loader's own locations, front to back.
    Local {
        locations: Arc<[Location]>,
        next: usize,
        parent: Option<Arc<IsolatedLoader>>,
    },
    /// Draining the parent's enumeration.
    Parent(Box<MergedResources>),
    /// Both segments dry; any further strict poll is an error.
    Exhausted,
}

impl MergedResources {
    pub(crate) fn new(
        name: &str,
        locations: Arc<[Location]>,
        parent: Option<Arc<IsolatedLoader>>,
    ) -> MergedResources {
        MergedResources {
            name: name.to_owned(),
            state: State::Local {
                locations,
                next: 0,
                parent,
            },
        }
    }

    /// Advance the enumeration.
    ///
    /// Returns `Ok(None)` exactly once, on the access that discovers
    /// exhaustion; polling again after that fails with [`ExhaustedError`].
    pub fn try_next(&mut self) -> Result<Option<ResourceHandle>, ExhaustedError> {
        loop {
            match mem::replace(&mut self.state, State::Exhausted) {
                State::Local {
                    locations,
                    mut next,
                    parent,
                } => {
                    while next < locations.len() {
                        let location = &locations[next];
                        next += 1;
                        if let Some(handle) = location.resource(&self.name) {
                            self.state = State::Local {
                                locations,
                                next,
                                parent,
                            };
                            return Ok(Some(handle));
                        }
                    }
                    match parent {
                        Some(parent) => {
                            self.state =
                                State::Parent(Box::new(parent.resolve_all_resources(&self.name)));
                        }
                        // No parent: the local→parent transition collapses
                        // straight to exhausted.
                        None => return Ok(None),
                    }
                }
                State::Parent(mut inner) => match inner.try_next()? {
                    Some(handle) => {
                        self.state = State::Parent(inner);
                        return Ok(Some(handle));
                    }
                    None => return Ok(None),
                },
                State::Exhausted => return Err(ExhaustedError),
            }
        }
    }

    /// Whether the enumeration has already reported exhaustion.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }
}

impl Iterator for MergedResources {
    type Item = ResourceHandle;

    /// Iterator access stays fused: once the sequence is dry this keeps
    /// returning `None` rather than surfacing [`ExhaustedError`].
    fn next(&mut self) -> Option<ResourceHandle> {
        self.try_next().unwrap_or(None)
    }
}
