//! Tests for configuration loading and root folder resolution
//!
//! Covers:
//! - Missing TOML file falls back to defaults without failing
//! - Malformed TOML is reported as a configuration error
//! - Root folder priority: CLI > VMC_ROOT_FOLDER > TOML > OS default
//!
//! Tests touching VMC_ROOT_FOLDER are marked #[serial] so they do not race.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vmc_common::config::{
    default_root_folder, ensure_root_folder, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_config_file_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "root_folder = \"/srv/vmc\"\nport = 6001\nevent_capacity = 32\n",
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/vmc")));
    assert_eq!(config.port, 6001);
    assert_eq!(config.event_capacity, 32);
}

#[test]
fn test_malformed_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = [").unwrap();

    let err = TomlConfig::load(&path).unwrap_err();
    assert_eq!(err.kind(), "config");
}

#[test]
#[serial]
fn test_resolver_cli_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/vmc-env");
    let resolver = RootFolderResolver::new("vmc-rc");

    let resolved = resolver.resolve(Some(Path::new("/tmp/vmc-cli")), Some(Path::new("/tmp/vmc-toml")));
    assert_eq!(resolved, PathBuf::from("/tmp/vmc-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/vmc-env");
    let resolver = RootFolderResolver::new("vmc-rc");

    let resolved = resolver.resolve(None, Some(Path::new("/tmp/vmc-toml")));
    assert_eq!(resolved, PathBuf::from("/tmp/vmc-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let resolver = RootFolderResolver::new("vmc-rc");

    assert_eq!(
        resolver.resolve(None, Some(Path::new("/tmp/vmc-toml"))),
        PathBuf::from("/tmp/vmc-toml")
    );
    assert_eq!(resolver.resolve(None, None), default_root_folder());
}

#[test]
fn test_ensure_root_folder_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b");

    ensure_root_folder(&root).unwrap();
    ensure_root_folder(&root).unwrap();
    assert!(root.is_dir());
}
