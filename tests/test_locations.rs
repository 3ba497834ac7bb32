extern crate cloister;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use cloister::loader::{
    parallel_capable, unit_relative_path, ConfigurationError, IsolatedLoader, Location,
    ResolveError,
};
use tempfile::tempdir;
use zip::write::FileOptions;
use zip::ZipWriter;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn put_unit(dir: &Path, name: &str, bytes: &[u8]) {
    let path = dir.join(unit_relative_path(name));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

// ── Construction-time validation ─────────────────────────────────────

#[test]
fn test_missing_location_is_rejected() {
    init_logging();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("no-such-entry");

    let err = IsolatedLoader::with_paths(None, vec![&missing]).unwrap_err();
    match err {
        ConfigurationError::Missing(path) => assert_eq!(path, missing),
        other => panic!("expected Missing, got {:?}", other),
    }
}

#[test]
fn test_garbage_archive_is_rejected() {
    let dir = tempdir().unwrap();
    let bogus = dir.path().join("bogus.zip");
    fs::write(&bogus, vec![0u8; 512]).unwrap();

    let err = Location::open(&bogus).unwrap_err();
    assert!(matches!(err, ConfigurationError::MalformedArchive { .. }));
}

#[test]
fn test_mixed_directory_and_archive_locations() {
    let dir = tempdir().unwrap();
    let lib = dir.path().join("lib");
    fs::create_dir(&lib).unwrap();
    put_unit(&lib, "geo.Vector", b"from dir");
    let deps = dir.path().join("deps.zip");
    write_archive(&deps, &[(&unit_relative_path("geo.Matrix"), b"from zip")]);

    let loader = IsolatedLoader::with_paths(None, vec![lib.as_path(), deps.as_path()]).unwrap();
    assert_eq!(loader.locations().len(), 2);
    assert_eq!(loader.resolve_unit("geo.Vector").unwrap().bytes(), b"from dir");
    assert_eq!(loader.resolve_unit("geo.Matrix").unwrap().bytes(), b"from zip");
}

#[test]
fn test_location_order_is_preserved_from_paths() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    put_unit(first.path(), "geo.Vector", b"first wins");
    put_unit(second.path(), "geo.Vector", b"second loses");

    let loader = IsolatedLoader::with_paths(None, vec![first.path(), second.path()]).unwrap();
    assert_eq!(loader.locations()[0].path(), first.path());
    assert_eq!(loader.locations()[1].path(), second.path());
    assert_eq!(loader.resolve_unit("geo.Vector").unwrap().bytes(), b"first wins");
}

// ── Loader lifecycle ─────────────────────────────────────────────────

#[test]
fn test_empty_location_set_resolves_nothing() {
    let loader = IsolatedLoader::new(None, Vec::new());
    assert!(matches!(
        loader.resolve_unit("any.Name"),
        Err(ResolveError::NotFound(_))
    ));
    assert!(loader.resolve_resource("any.txt").is_none());
    assert!(loader.parent().is_none());
    assert!(loader.locations().is_empty());
}

#[test]
fn test_factory_registers_family_as_parallel_capable() {
    let first = IsolatedLoader::new(None, Vec::new());
    assert!(parallel_capable());

    // Further instances share the one-time registration.
    let second = IsolatedLoader::new(None, Vec::new());
    assert!(parallel_capable());

    second.close();
    first.close();
}

#[test]
fn test_close_releases_the_callers_handle() {
    let dir = tempdir().unwrap();
    let deps = dir.path().join("deps.zip");
    write_archive(&deps, &[(&unit_relative_path("geo.Vector"), b"vector")]);

    let loader = IsolatedLoader::with_paths(None, vec![&deps]).unwrap();
    let unit = loader.resolve_unit("geo.Vector").unwrap();
    loader.close();

    // Already-resolved units outlive the loader's release.
    assert_eq!(unit.bytes(), b"vector");
    assert_eq!(unit.name(), "geo.Vector");
}
