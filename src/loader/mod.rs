//! Isolated, local-first unit and resource loading.
//!
//! This module implements the **isolated loader**: a resolver that, given an
//! ordered set of local locations (directories or zip archives) and an
//! optional parent loader, resolves symbolic names to units and resources
//! while inverting the conventional parent-first delegation order.
//!
//! ## Why Invert Delegation?
//!
//! A plugin often bundles its own versions of libraries the host process has
//! already loaded. Under parent-first delegation the host's versions always
//! win and the plugin runs against the wrong code. The isolated loader flips
//! the order:
//!
//! ```text
//! Resolution Order:
//! 1. This loader's cache        ← each name defined at most once
//! 2. This loader's locations    ← construction order, first match wins
//! 3. The parent loader          ← itself local-first, recursively
//! ```
//!
//! Only name resolution order and caching change. There is no bytecode
//! rewriting or sandboxing here, and already-defined units are never unloaded.
//!
//! ### Key Components
//!
//! - **[`Location`]**: one validated source of bytes, a directory or a zip
//!   archive with its entry index snapshotted at open time
//! - **[`IsolatedLoader`]**: the resolver; holds the location set, the
//!   define-once unit cache, and the optional parent reference
//! - **[`LoadedUnit`]**: a named artifact defined from location bytes, equal
//!   to another unit only when loader and name both match
//! - **[`ResourceHandle`]** / **[`MergedResources`]**: addressable data blobs
//!   and the lazy local-then-parent enumeration over all matches for a name
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cloister::loader::IsolatedLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let host = IsolatedLoader::with_paths(None, vec!["host/classpath.zip"])?;
//! let plugin = IsolatedLoader::with_paths(
//!     Some(Arc::clone(&host)),
//!     vec!["plugin/lib", "plugin/deps.zip"],
//! )?;
//!
//! // The plugin's bundled copy wins even though the host also has one.
//! let unit = plugin.resolve_unit("compress.Deflater")?;
//! assert_eq!(unit.defined_by(), plugin.id());
//! # Ok(())
//! # }
//! ```

mod error;
mod location;
mod resolver;
mod resources;

#[cfg(test)]
mod unit_tests;

pub use error::{ConfigurationError, ExhaustedError, ResolveError};
pub use location::{ArchiveLocation, Location};
pub use resolver::{parallel_capable, unit_relative_path, IsolatedLoader, LoadedUnit};
pub use resources::{MergedResources, ResourceHandle};
