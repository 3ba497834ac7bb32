//! The isolated loader — local-first, parent-fallback name resolution.
//!
//! A conventional delegating loader asks its parent first and falls back to
//! its own locations. [`IsolatedLoader`] inverts that order so a plugin's
//! bundled dependency versions win over whatever the host already has:
//!
//! ```text
//! resolve_unit("geo.Vector")
//!      ↓
//! 1. Defined-unit cache        → hit? return the cached unit
//! 2. Own locations, in order   → first match defines, caches, returns
//! 3. Parent loader             → parent applies the same policy recursively
//! 4. Nowhere                   → ResolveError::NotFound
//! ```
//!
//! ## Caching Strategy
//!
//! - A name maps to at most one definition per loader, forever. The cache is
//!   never invalidated and entries are never replaced.
//! - Parent-provided units are cached by the parent that defined them, never
//!   by the delegating child.
//! - Racing callers for the same uncached name serialize on that name's cache
//!   shard, so the bytes-to-unit definition runs exactly once and both
//!   callers get the identical `Arc`.
//!
//! ## Release
//!
//! Archive locations keep their file handles open as long as the loader is
//! alive. Dropping the last `Arc` of the loader closes them; `close()` is the
//! same release spelled out as a call site.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, trace};
use uuid::Uuid;

use super::error::{ConfigurationError, ResolveError};
use super::location::Location;
use super::resources::{MergedResources, ResourceHandle};

static REGISTRATION: Once = Once::new();
static PARALLEL_CAPABLE: AtomicBool = AtomicBool::new(false);

/// Whether the loader family has performed its one-time parallel-capability
/// registration. True once the first loader has been constructed.
pub fn parallel_capable() -> bool {
    PARALLEL_CAPABLE.load(Ordering::Acquire)
}

/// One-shot, race-free registration of the whole loader family as safe for
/// concurrent use. Runs before the first instance exists, exactly once per
/// process, no matter how many loaders are created afterwards.
fn register_parallel_capable() {
    REGISTRATION.call_once(|| {
        PARALLEL_CAPABLE.store(true, Ordering::Release);
        debug!("isolated loader family registered as parallel-capable");
    });
}

/// The relative path a unit's bytes are stored under inside a location:
/// dots become path separators and the `.unit` suffix is appended, so
/// `geo.Vector` is read from `geo/Vector.unit`.
pub fn unit_relative_path(name: &str) -> String {
    format!("{}.unit", name.replace('.', "/"))
}

/// A named artifact defined from location bytes, scoped to the loader that
/// defined it.
///
/// Equality follows definition identity (the defining loader and the unit
/// name), never byte contents or allocation identity.
#[derive(Debug)]
pub struct LoadedUnit {
    name: String,
    bytes: Vec<u8>,
    origin: PathBuf,
    defined_by: Uuid,
}

impl LoadedUnit {
    pub(crate) fn new(name: String, bytes: Vec<u8>, origin: PathBuf, defined_by: Uuid) -> Self {
        LoadedUnit {
            name,
            bytes,
            origin,
            defined_by,
        }
    }

    /// The symbolic name this unit was resolved under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The defining bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Path of the location that supplied the bytes.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Id of the loader that defined this unit.
    pub fn defined_by(&self) -> Uuid {
        self.defined_by
    }
}

impl PartialEq for LoadedUnit {
    fn eq(&self, other: &Self) -> bool {
        self.defined_by == other.defined_by && self.name == other.name
    }
}

impl Eq for LoadedUnit {}

/// A loader that prefers its own locations over its parent.
///
/// Created once per isolation boundary (for example, one plugin invocation)
/// and shared freely across threads; all resolve operations take `&self`.
/// The parent reference is one-directional: a loader never records or
/// traverses its children, so chains cannot form cycles.
#[derive(Debug)]
pub struct IsolatedLoader {
    id: Uuid,
    locations: Arc<[Location]>,
    parent: Option<Arc<IsolatedLoader>>,
    units: DashMap<String, Arc<LoadedUnit>>,
}

impl IsolatedLoader {
    /// Create a loader over an already-validated location set.
    pub fn new(parent: Option<Arc<IsolatedLoader>>, locations: Vec<Location>) -> Arc<IsolatedLoader> {
        register_parallel_capable();
        let loader = IsolatedLoader {
            id: Uuid::new_v4(),
            locations: locations.into(),
            parent,
            units: DashMap::new(),
        };
        debug!(
            "created loader {} with {} locations (parent: {})",
            loader.id,
            loader.locations.len(),
            match &loader.parent {
                Some(parent) => parent.id.to_string(),
                None => "none".to_owned(),
            }
        );
        Arc::new(loader)
    }

    /// Create a loader from filesystem paths, classifying each as a directory
    /// or archive location. Fails with [`ConfigurationError`] on the first
    /// malformed path.
    pub fn with_paths<I, P>(
        parent: Option<Arc<IsolatedLoader>>,
        paths: I,
    ) -> Result<Arc<IsolatedLoader>, ConfigurationError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut locations = Vec::new();
        for path in paths {
            locations.push(Location::open(path)?);
        }
        Ok(Self::new(parent, locations))
    }

    /// Stable identity of this loader instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The ordered location set, earliest (highest-precedence) first.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The parent loader, if any.
    pub fn parent(&self) -> Option<&Arc<IsolatedLoader>> {
        self.parent.as_ref()
    }

    /// Resolve `name` to a unit: cache, then own locations in order, then the
    /// parent chain.
    ///
    /// The first local location providing bytes for the name is authoritative;
    /// later locations are silently shadowed. Parent results are returned
    /// unmodified and are not cached here.
    pub fn resolve_unit(&self, name: &str) -> Result<Arc<LoadedUnit>, ResolveError> {
        if let Some(cached) = self.units.get(name) {
            trace!("loader {}: `{}` served from cache", self.id, name);
            return Ok(Arc::clone(&cached));
        }

        match self.units.entry(name.to_owned()) {
            // A racing caller defined the unit while we waited on the shard.
            Entry::Occupied(cached) => Ok(Arc::clone(cached.get())),
            Entry::Vacant(slot) => {
                let relative = unit_relative_path(name);
                match self.locations.iter().find(|l| l.contains(&relative)) {
                    Some(location) => {
                        let bytes = location.read(&relative).map_err(|source| {
                            ResolveError::Definition {
                                name: name.to_owned(),
                                origin: location.path().to_path_buf(),
                                source,
                            }
                        })?;
                        debug!(
                            "loader {}: defined `{}` from {}",
                            self.id,
                            name,
                            location.path().display()
                        );
                        let unit = Arc::new(LoadedUnit::new(
                            name.to_owned(),
                            bytes,
                            location.path().to_path_buf(),
                            self.id,
                        ));
                        slot.insert(Arc::clone(&unit));
                        Ok(unit)
                    }
                    None => {
                        // Release the name's shard before walking the parent
                        // chain; nothing is cached here for parent results.
                        drop(slot);
                        match &self.parent {
                            Some(parent) => {
                                trace!(
                                    "loader {}: delegating `{}` to parent {}",
                                    self.id,
                                    name,
                                    parent.id
                                );
                                parent.resolve_unit(name)
                            }
                            None => Err(ResolveError::NotFound(name.to_owned())),
                        }
                    }
                }
            }
        }
    }

    /// Resolve `name` to a single resource handle: first local match in
    /// location order, else the parent's resolution, else `None`.
    ///
    /// Absence is a legitimate, checkable outcome, never an error.
    pub fn resolve_resource(&self, name: &str) -> Option<ResourceHandle> {
        for location in self.locations.iter() {
            if let Some(handle) = location.resource(name) {
                trace!(
                    "loader {}: resource `{}` found in {}",
                    self.id,
                    name,
                    location.path().display()
                );
                return Some(handle);
            }
        }
        self.parent.as_ref().and_then(|p| p.resolve_resource(name))
    }

    /// Enumerate every match for `name`: all local matches in location order,
    /// then the parent's complete enumeration, lazily.
    pub fn resolve_all_resources(&self, name: &str) -> MergedResources {
        MergedResources::new(name, Arc::clone(&self.locations), self.parent.clone())
    }

    /// Release this handle to the loader.
    ///
    /// Location handles close when the last `Arc` is dropped; this method
    /// only makes the release point visible in the caller's source.
    pub fn close(self: Arc<Self>) {
        drop(self);
    }
}

impl Drop for IsolatedLoader {
    fn drop(&mut self) {
        debug!(
            "loader {} released ({} cached units)",
            self.id,
            self.units.len()
        );
    }
}
