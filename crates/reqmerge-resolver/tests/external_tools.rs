//! Strategies that shell out, driven against small stand-in scripts.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqmerge_core::config::ToolsConfig;
use reqmerge_core::event::{channel, Event};
use reqmerge_core::package::PackageName;
use reqmerge_core::store::CacheStore;
use reqmerge_registry::cache::RegistryCache;
use reqmerge_registry::client::build_client;
use reqmerge_registry::{RegistryClient, RegistryRecord};
use reqmerge_resolver::orchestrator::{MSG_CONFLICTS, MSG_SUCCESS, MSG_VERIFY_FAILED};
use reqmerge_resolver::{Orchestrator, ResolveOptions, StrategyKind};
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Writing an executable while another test forks can fail with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::const_new(());

/// Stand-in interpreter. `-m venv DIR` creates `DIR/bin/pip`, which refuses
/// anything named `broken`; `-m pip wheel` succeeds.
const FAKE_PYTHON: &str = r#"#!/bin/sh
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin"
  cat > "$3/bin/pip" <<'PIP'
#!/bin/sh
case "$2" in
  broken*) echo "ERROR: No matching distribution found for $2" >&2; exit 1;;
esac
exit 0
PIP
  chmod +x "$3/bin/pip"
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  exit 0
fi
exit 2
"#;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn tools(python: &Path, bundler: &Path, solver: &Path) -> ToolsConfig {
    ToolsConfig {
        python: python.display().to_string(),
        bundler: bundler.display().to_string(),
        solver: solver.display().to_string(),
    }
}

fn engine(cache: &Path, tools: ToolsConfig) -> Orchestrator {
    let store = CacheStore::new(cache);
    let http = build_client(Duration::from_secs(2)).unwrap();
    let registry = RegistryClient::new(http, "http://127.0.0.1:9/pypi", store.clone());
    Orchestrator::new(registry, store, tools)
}

fn seed(cache: &Path, package: &str, versions: &[&str]) {
    let record: RegistryRecord = versions.iter().map(|v| (v.to_string(), None)).collect();
    RegistryCache::new(CacheStore::new(cache))
        .put(&PackageName::new(package), &record)
        .unwrap();
}

async fn run(
    engine: &Orchestrator,
    manifests: &[PathBuf],
    strategy: StrategyKind,
    options: &ResolveOptions,
) -> (String, bool, Vec<String>) {
    let (sink, stream) = channel();
    engine.run(manifests, strategy, options, sink).await;
    let mut logs = Vec::new();
    let mut complete = None;
    for event in stream.collect().await {
        match event {
            Event::Log(line) => logs.push(line),
            Event::Complete { message, success } => complete = Some((message, success)),
            _ => {}
        }
    }
    let (message, success) = complete.expect("run must complete");
    (message, success, logs)
}

#[tokio::test]
async fn test_verified_pins_are_written() {
    let _guard = SERIAL.lock().await;
    let tmp = TempDir::new().unwrap();
    let bin = tmp.path();
    let python = script(bin, "fake-python", FAKE_PYTHON);
    let cache = tmp.path().join("cache");
    seed(&cache, "six", &["1.15.0", "1.16.0"]);
    let m = tmp.path().join("reqs.txt");
    std::fs::write(&m, "six\n").unwrap();

    let opts = ResolveOptions {
        output: tmp.path().join("out.txt"),
        ..ResolveOptions::default()
    };
    let engine = engine(&cache, tools(&python, &bin.join("none"), &bin.join("none")));
    let (message, success, logs) = run(&engine, &[m], StrategyKind::Greedy, &opts).await;

    assert_eq!((message.as_str(), success), (MSG_SUCCESS, true));
    assert!(logs
        .iter()
        .any(|l| l == "All dependencies installed successfully in the test environment."));
    assert!(cache.join("envs").join("test_env_pydefault").join("bin").join("pip").exists());
    assert_eq!(std::fs::read_to_string(&opts.output).unwrap(), "six==1.16.0\n");
}

#[tokio::test]
async fn test_failed_install_surfaces_stderr() {
    let _guard = SERIAL.lock().await;
    let tmp = TempDir::new().unwrap();
    let python = script(tmp.path(), "fake-python", FAKE_PYTHON);
    let cache = tmp.path().join("cache");
    seed(&cache, "broken", &["0.1"]);
    let m = tmp.path().join("reqs.txt");
    std::fs::write(&m, "broken\n").unwrap();

    let opts = ResolveOptions {
        output: tmp.path().join("out.txt"),
        ..ResolveOptions::default()
    };
    let none = tmp.path().join("none");
    let engine = engine(&cache, tools(&python, &none, &none));
    let (message, success, logs) = run(&engine, &[m], StrategyKind::Greedy, &opts).await;

    assert_eq!((message.as_str(), success), (MSG_VERIFY_FAILED, false));
    assert!(logs
        .iter()
        .any(|l| l.contains("No matching distribution found for broken==0.1")));
    assert!(!opts.output.exists());
}

#[tokio::test]
async fn test_isolated_environments_per_file() {
    let _guard = SERIAL.lock().await;
    let tmp = TempDir::new().unwrap();
    let python = script(tmp.path(), "fake-python", FAKE_PYTHON);
    let cache = tmp.path().join("cache");
    let web = tmp.path().join("web.txt");
    std::fs::write(&web, "flask\n").unwrap();

    let none = tmp.path().join("none");
    let engine = engine(&cache, tools(&python, &none, &none));
    let (message, success, logs) = run(
        &engine,
        &[web],
        StrategyKind::IsolatedPerFile,
        &ResolveOptions::default(),
    )
    .await;

    assert_eq!((message.as_str(), success), (MSG_SUCCESS, true));
    assert!(logs.contains(&"Success: Environment for web.txt created and installed.".to_string()));
    assert!(logs.contains(&"Algorithm 'Per-File Isolated Environments' completed successfully.".to_string()));
    assert!(cache.join("envs").join("iso_env_web").is_dir());
}

#[tokio::test]
async fn test_bundle_success_and_failure() {
    let _guard = SERIAL.lock().await;
    let tmp = TempDir::new().unwrap();
    let python = script(tmp.path(), "fake-python", FAKE_PYTHON);
    let good = script(tmp.path(), "fake-pex", "#!/bin/sh\nexit 0\n");
    let bad = script(
        tmp.path(),
        "bad-pex",
        "#!/bin/sh\necho 'could not resolve' >&2\nexit 1\n",
    );
    let cache = tmp.path().join("cache");
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    std::fs::write(&a, "requests").unwrap();
    std::fs::write(&b, "flask\n").unwrap();
    let manifests = [a, b];
    let none = tmp.path().join("none");

    let (message, success, logs) = run(
        &engine(&cache, tools(&python, &good, &none)),
        &manifests,
        StrategyKind::BundleExport,
        &ResolveOptions::default(),
    )
    .await;
    assert_eq!((message.as_str(), success), (MSG_SUCCESS, true));
    assert!(logs.iter().any(|l| l.starts_with("Bundle created successfully")));
    assert_eq!(
        std::fs::read_to_string(cache.join("pex_combined_reqs.txt")).unwrap(),
        "requests\nflask\n"
    );
    assert!(cache.join("pex_wheelhouse").is_dir());

    let (message, success, logs) = run(
        &engine(&cache, tools(&python, &bad, &none)),
        &manifests,
        StrategyKind::BundleExport,
        &ResolveOptions::default(),
    )
    .await;
    assert_eq!((message.as_str(), success), (MSG_CONFLICTS, false));
    assert!(logs.iter().any(|l| l.contains("could not resolve")));
    assert!(logs.contains(&"Conflicts found for: Bundle creation failed".to_string()));
}

#[tokio::test]
async fn test_solver_verdict_decides() {
    let _guard = SERIAL.lock().await;
    let tmp = TempDir::new().unwrap();
    let none = tmp.path().join("none");
    let cache = tmp.path().join("cache");
    let m = tmp.path().join("env.txt");
    std::fs::write(&m, "numpy==1.26.4\n").unwrap();

    let ok = script(tmp.path(), "solver-ok", "#!/bin/sh\necho '{\"success\": true}'\n");
    let (message, success, _) = run(
        &engine(&cache, tools(&none, &none, &ok)),
        &[m.clone()],
        StrategyKind::ExternalSolverHybrid,
        &ResolveOptions::default(),
    )
    .await;
    assert_eq!((message.as_str(), success), (MSG_SUCCESS, true));

    let refuse = script(
        tmp.path(),
        "solver-refuse",
        "#!/bin/sh\necho '{\"success\": false, \"error\": \"UnsatisfiableError: numpy\"}'\nexit 1\n",
    );
    let (message, success, logs) = run(
        &engine(&cache, tools(&none, &none, &refuse)),
        &[m.clone()],
        StrategyKind::ExternalSolverHybrid,
        &ResolveOptions::default(),
    )
    .await;
    assert_eq!((message.as_str(), success), (MSG_CONFLICTS, false));
    assert!(logs.contains(&"Conflicts found for: UnsatisfiableError: numpy".to_string()));

    let garbage = script(tmp.path(), "solver-garbage", "#!/bin/sh\necho 'not json' >&2\n");
    let (message, success, logs) = run(
        &engine(&cache, tools(&none, &none, &garbage)),
        &[m],
        StrategyKind::ExternalSolverHybrid,
        &ResolveOptions::default(),
    )
    .await;
    assert_eq!((message.as_str(), success), (MSG_CONFLICTS, false));
    assert!(logs.contains(&"Conflicts found for: Conda process failed".to_string()));
}
