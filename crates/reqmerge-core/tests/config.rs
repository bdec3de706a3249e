use reqmerge_core::config::{dirs_path, GlobalConfig};

#[test]
fn test_global_config_defaults() {
    let config = GlobalConfig::default();
    assert_eq!(config.cache.dir, "~/.reqmerge/cache");
    assert_eq!(config.registry.index_url, "https://pypi.org/pypi");
    assert_eq!(config.registry.timeout_secs, 30);
    assert_eq!(config.registry.jobs, 8);
    assert_eq!(config.tools.python, "python3");
    assert_eq!(config.tools.bundler, "pex");
    assert_eq!(config.tools.solver, "conda");
}

#[test]
fn test_global_config_empty_toml_uses_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert_eq!(config.registry.jobs, 8);
    assert_eq!(config.tools.python, "python3");
}

#[test]
fn test_dirs_path_contains_reqmerge() {
    assert!(dirs_path().ends_with(".reqmerge"));
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[cache]
dir = "/custom/cache"

[registry]
index-url = "https://mirror.example/pypi"
jobs = 1

[tools]
python = "python3.12"
solver = "mamba"
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.cache.dir, "/custom/cache");
    assert_eq!(config.cache.path(), std::path::PathBuf::from("/custom/cache"));
    assert_eq!(config.registry.index_url, "https://mirror.example/pypi");
    assert_eq!(config.registry.jobs, 1);
    assert_eq!(config.registry.timeout_secs, 30);
    assert_eq!(config.tools.python, "python3.12");
    assert_eq!(config.tools.bundler, "pex");
    assert_eq!(config.tools.solver, "mamba");
}

#[test]
fn test_global_config_load_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[registry]\ntimeout-secs = 5\n").unwrap();
    let config = GlobalConfig::load_from(&path).unwrap();
    assert_eq!(config.registry.timeout_secs, 5);
}

#[test]
fn test_global_config_invalid_toml_is_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[registry\njobs = ").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}
