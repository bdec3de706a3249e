use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn reqmerge_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reqmerge").unwrap();
    cmd.env("HOME", home).env_remove("REQMERGE_CACHE_DIR");
    cmd
}

#[test]
fn test_cache_path_defaults_under_home() {
    let tmp = TempDir::new().unwrap();

    reqmerge_cmd(tmp.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".reqmerge"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn test_cache_path_respects_config_file() {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join(".reqmerge");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[cache]\ndir = \"/srv/reqmerge-cache\"\n").unwrap();

    reqmerge_cmd(tmp.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/reqmerge-cache"));
}

#[test]
fn test_cache_clear_selected_packages() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    let registry = cache.join("registry");
    fs::create_dir_all(&registry).unwrap();
    fs::write(registry.join("requests.json"), "{}").unwrap();
    fs::write(registry.join("flask.json"), "{}").unwrap();

    reqmerge_cmd(tmp.path())
        .args(["cache", "clear", "Requests"])
        .arg("--cache-dir")
        .arg(&cache)
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleared"));

    assert!(!registry.join("requests.json").exists());
    assert!(registry.join("flask.json").exists());
}

#[test]
fn test_cache_clear_empty_cache() {
    let tmp = TempDir::new().unwrap();

    reqmerge_cmd(tmp.path())
        .args(["cache", "clear"])
        .arg("--cache-dir")
        .arg(tmp.path().join("nothing"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clear"));
}

#[test]
fn test_invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join(".reqmerge");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[cache\n").unwrap();

    reqmerge_cmd(tmp.path())
        .args(["cache", "path"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
