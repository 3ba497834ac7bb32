use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tempfile::tempdir;
use zip::write::FileOptions;
use zip::ZipWriter;

use super::location::Location;
use super::resolver::{unit_relative_path, IsolatedLoader};
use super::resources::ResourceHandle;

fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn test_unit_relative_path_mapping() {
    assert_eq!(unit_relative_path("geo.Vector"), "geo/Vector.unit");
    assert_eq!(unit_relative_path("Single"), "Single.unit");
    assert_eq!(unit_relative_path("a.b.c.Deep"), "a/b/c/Deep.unit");
}

#[test]
fn test_open_classifies_directory_and_archive() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("bundle.zip");
    write_archive(&zip_path, &[("data.txt", b"payload")]);

    let directory = Location::open(dir.path()).unwrap();
    assert!(matches!(directory, Location::Directory(_)));

    let archive = Location::open(&zip_path).unwrap();
    assert!(matches!(archive, Location::Archive(_)));
    assert_eq!(archive.path(), zip_path.as_path());
}

#[test]
fn test_directory_refuses_escaping_names() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(dir.path().join("secret.txt"), b"outside").unwrap();

    let location = Location::open(&root).unwrap();
    assert!(!location.contains("../secret.txt"));
    assert!(location.resource("../secret.txt").is_none());
    assert!(location.resource("/etc/hostname").is_none());
}

#[test]
fn test_archive_membership_uses_snapshot() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("bundle.zip");
    write_archive(&zip_path, &[("assets/logo.bin", b"logo"), ("top.txt", b"top")]);

    let location = Location::open(&zip_path).unwrap();
    assert!(location.contains("assets/logo.bin"));
    assert!(location.contains("top.txt"));
    assert!(!location.contains("assets/missing.bin"));

    match location.resource("assets/logo.bin") {
        Some(ResourceHandle::ArchiveEntry { entry, .. }) => assert_eq!(entry, "assets/logo.bin"),
        other => panic!("expected an archive entry handle, got {:?}", other),
    }
}

#[test]
fn test_directory_read_round_trip() {
    let dir = tempdir().unwrap();
    let relative = unit_relative_path("geo.Vector");
    let path = dir.path().join(&relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"vector bytes").unwrap();

    let location = Location::open(dir.path()).unwrap();
    assert!(location.contains(&relative));
    assert_eq!(location.read(&relative).unwrap(), b"vector bytes");
}

#[test]
fn test_unit_equality_is_per_loader() {
    let dir = tempdir().unwrap();
    let relative = unit_relative_path("geo.Vector");
    let path = dir.path().join(&relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"vector bytes").unwrap();

    let first = IsolatedLoader::with_paths(None, vec![dir.path()]).unwrap();
    let second = IsolatedLoader::with_paths(None, vec![dir.path()]).unwrap();

    let from_first = first.resolve_unit("geo.Vector").unwrap();
    let from_second = second.resolve_unit("geo.Vector").unwrap();

    // Same bytes, but definitions are scoped to their defining loader.
    assert_eq!(from_first.bytes(), from_second.bytes());
    assert!(*from_first != *from_second);
    assert_eq!(from_first.defined_by(), first.id());
    assert_eq!(from_second.defined_by(), second.id());
}
