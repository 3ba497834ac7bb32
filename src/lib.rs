//! # cloister - Isolated Plugin Loading
//!
//! A helper library for plugin hosts that need a plugin to run against its
//! own bundled dependency versions, even when the host process has already
//! loaded different versions of the same names. The core is an isolating
//! loader that resolves symbolic names to units and resources **local-first**,
//! the inverse of conventional parent-first delegation.
//!
//! ## Quick Start
//!
//! ### A loader with no locations always misses
//!
//! ```
//! use cloister::loader::IsolatedLoader;
//!
//! let loader = IsolatedLoader::new(None, Vec::new());
//! assert!(loader.resolve_unit("geo.Vector").is_err());
//! assert!(loader.resolve_resource("assets/banner.txt").is_none());
//! ```
//!
//! ### Isolating a plugin from its host
//!
//! ```no_run
//! use std::sync::Arc;
//! use cloister::loader::IsolatedLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // The host's own resolution chain.
//! let host = IsolatedLoader::with_paths(None, vec!["host/classpath.zip"])?;
//!
//! // One isolation boundary per plugin invocation: the plugin's locations
//! // shadow everything the host provides.
//! let plugin = IsolatedLoader::with_paths(
//!     Some(Arc::clone(&host)),
//!     vec!["plugin/lib", "plugin/deps.zip"],
//! )?;
//!
//! let unit = plugin.resolve_unit("compress.Deflater")?;
//! assert_eq!(unit.defined_by(), plugin.id());
//!
//! // Names the plugin does not bundle still come from the host.
//! let shared = plugin.resolve_unit("api.PluginContext")?;
//! assert_eq!(shared.defined_by(), host.id());
//! # Ok(())
//! # }
//! ```
//!
//! ## How Resolution Works
//!
//! Each [`loader::IsolatedLoader`] holds an ordered, immutable set of
//! locations (directories or zip archives) and an optional parent reference:
//!
//! 1. **Cache**: a name already defined by this loader is returned as-is;
//!    one definition per name, for the loader's whole lifetime
//! 2. **Local locations**: consulted in construction order; the first
//!    location providing bytes defines the unit, later matches are shadowed
//! 3. **Parent**: consulted only when no local location matches, applying
//!    the same local-first policy recursively
//!
//! Resource lookups follow the same order, and
//! [`loader::IsolatedLoader::resolve_all_resources`] lazily enumerates every
//! match: local matches first, then the parent's complete enumeration.
//!
//! All operations take `&self` and are safe to call from multiple threads;
//! racing resolutions of the same name observe exactly one definition.
//!
//! ## Scope
//!
//! Only resolution order and caching are changed. This library does not
//! rewrite or instrument unit bytes, and an already-defined unit is never
//! invalidated or reloaded. A loader holds its archive handles
//! open until dropped; create one per isolation boundary and let ownership
//! release it.

pub mod loader;
