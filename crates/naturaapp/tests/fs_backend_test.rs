use naturaapp::store::backend::KeyValueBackend;
use naturaapp::store::flat::FlatStore;
use naturaapp::store::fs_backend::FsBackend;
use naturaapp::store::{CreationStore, CREATIONS_KEY, CREDENTIAL_KEY, CREDENTIAL_SETTING};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("async-storage"));
    (dir, backend)
}

#[test]
fn test_fs_backend_basic_io() {
    let (_dir, backend) = setup();

    assert_eq!(backend.get_item("natura_api_key").unwrap(), None);
    backend.set_item("natura_api_key", "sk-1").unwrap();
    assert_eq!(
        backend.get_item("natura_api_key").unwrap(),
        Some("sk-1".to_string())
    );

    backend.remove_item("natura_api_key").unwrap();
    backend.remove_item("natura_api_key").unwrap();
    assert_eq!(backend.get_item("natura_api_key").unwrap(), None);
}

#[test]
fn test_fs_backend_creates_root_lazily() {
    let (dir, backend) = setup();
    assert!(!backend.root().exists());
    assert_eq!(backend.get_item(CREATIONS_KEY).unwrap(), None);
    assert!(!backend.root().exists());

    backend.set_item(CREATIONS_KEY, "[]").unwrap();
    assert!(dir.path().join("async-storage").join(CREATIONS_KEY).exists());
}

#[test]
fn test_fs_backend_atomic_write_leaves_no_artifacts() {
    let (_dir, backend) = setup();
    backend.set_item(CREATIONS_KEY, "[]").unwrap();
    backend.set_item(CREATIONS_KEY, "[1]").unwrap();

    let entries: Vec<_> = fs::read_dir(backend.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec![CREATIONS_KEY.to_string()]);
}

#[test]
fn test_fs_backend_rejects_path_like_keys() {
    let (_dir, backend) = setup();
    assert!(backend.set_item("../escape", "x").is_err());
    assert!(backend.set_item(".hidden", "x").is_err());
    assert!(backend.get_item("").is_err());
}

#[test]
fn test_flat_store_on_disk_keeps_legacy_key_names() {
    let (_dir, backend) = setup();
    let root = backend.root().to_path_buf();
    let store = FlatStore::new(backend);

    store.put_setting(CREDENTIAL_SETTING, "sk-disk").unwrap();
    store.put_setting("theme", "dark").unwrap();

    assert_eq!(
        fs::read_to_string(root.join(CREDENTIAL_KEY)).unwrap(),
        "sk-disk"
    );
    assert_eq!(
        fs::read_to_string(root.join("natura_setting_theme")).unwrap(),
        "dark"
    );
}

#[test]
fn test_flat_store_reads_truncated_file_as_empty() {
    let (_dir, backend) = setup();
    backend.set_item(CREATIONS_KEY, "[{\"id\":\"1\",").unwrap();
    let store = FlatStore::new(backend);
    assert!(store.list().unwrap().is_empty());
}
