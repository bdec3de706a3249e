use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UNREACHABLE_INDEX: &str = "http://127.0.0.1:9/pypi";

#[allow(deprecated)]
fn reqmerge_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reqmerge").unwrap();
    cmd.env("HOME", home)
        .env_remove("REQMERGE_CACHE_DIR")
        .env_remove("REQMERGE_INDEX_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn seed(cache: &Path, package: &str, versions: &[&str]) {
    let dir = cache.join("registry");
    fs::create_dir_all(&dir).unwrap();
    let record: serde_json::Map<String, serde_json::Value> = versions
        .iter()
        .map(|v| (v.to_string(), serde_json::Value::Null))
        .collect();
    fs::write(
        dir.join(format!("{package}.json")),
        serde_json::to_string(&record).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_resolve_writes_pins() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    seed(&cache, "requests", &["2.19", "2.25", "2.31", "3.0"]);
    fs::write(tmp.path().join("a.txt"), "requests>=2.20\n").unwrap();
    fs::write(tmp.path().join("b.txt"), "requests<3.0\n").unwrap();

    reqmerge_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["resolve", "-f", "a.txt", "b.txt", "--no-test", "--index-url", UNREACHABLE_INDEX])
        .arg("--cache-dir")
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("Picked latest: 2.31"))
        .stdout(predicate::str::contains("--- Resolution successful! ---"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("requirements.merged.txt")).unwrap(),
        "requests==2.31\n"
    );
}

#[test]
fn test_resolve_conflict_exits_nonzero() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    fs::write(tmp.path().join("reqs.txt"), "foo==1.0\n").unwrap();

    reqmerge_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["resolve", "-f", "reqs.txt", "--no-test", "--index-url", UNREACHABLE_INDEX])
        .arg("--cache-dir")
        .arg(&cache)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Conflicts found for: foo"))
        .stdout(predicate::str::contains("--- Resolution failed due to conflicts. ---"));

    assert!(!tmp.path().join("requirements.merged.txt").exists());
}

#[test]
fn test_resolve_custom_output_and_strategy() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    seed(&cache, "idna", &["3.4", "3.6"]);
    fs::write(tmp.path().join("reqs.txt"), "idna\n").unwrap();

    reqmerge_cmd(tmp.path())
        .current_dir(tmp.path())
        .args([
            "resolve",
            "-f",
            "reqs.txt",
            "--no-test",
            "--strategy",
            "backtracking",
            "-o",
            "out/pins.txt",
            "--index-url",
            UNREACHABLE_INDEX,
        ])
        .env("REQMERGE_CACHE_DIR", &cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tentatively selected idna==3.6"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("out").join("pins.txt")).unwrap(),
        "idna==3.6\n"
    );
}

#[test]
fn test_resolve_unknown_strategy_is_usage_error() {
    let tmp = TempDir::new().unwrap();

    reqmerge_cmd(tmp.path())
        .args(["resolve", "-f", "reqs.txt", "--strategy", "sat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown strategy 'sat'"));
}

#[test]
fn test_resolve_invalid_python_version() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("reqs.txt"), "idna\n").unwrap();

    reqmerge_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["resolve", "-f", "reqs.txt", "-p", "three"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid Python version"));
}

#[test]
fn test_resolve_requires_files() {
    let tmp = TempDir::new().unwrap();
    reqmerge_cmd(tmp.path())
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}
