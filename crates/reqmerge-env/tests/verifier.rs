use reqmerge_core::event::{channel, Event};
use reqmerge_core::package::PackageName;
use reqmerge_core::pins::ResolvedSet;
use reqmerge_core::store::CacheStore;
use reqmerge_core::version::Version;
use reqmerge_env::EnvironmentVerifier;

fn pins() -> ResolvedSet {
    let mut pins = ResolvedSet::new();
    pins.insert(PackageName::new("requests"), "2.31.0".to_string());
    pins
}

#[test]
fn test_env_dir_is_keyed_by_runtime() {
    let verifier = EnvironmentVerifier::new(CacheStore::new("/cache"), "python3");
    let v311 = Version::parse("3.11").unwrap();
    assert_eq!(
        verifier.env_dir(Some(&v311)),
        std::path::PathBuf::from("/cache/envs/test_env_py3.11")
    );
    assert_eq!(
        verifier.env_dir(None),
        std::path::PathBuf::from("/cache/envs/test_env_pydefault")
    );
    assert_eq!(verifier.env_dir(Some(&v311)), verifier.env_dir(Some(&v311)));
}

#[tokio::test]
async fn test_missing_interpreter_fails_without_creating_env() {
    let tmp = tempfile::tempdir().unwrap();
    let verifier = EnvironmentVerifier::new(CacheStore::new(tmp.path()), "python3");
    let target = Version::parse("0.1").unwrap();

    let (sink, stream) = channel();
    let ok = verifier.verify(&pins(), Some(&target), &sink).await;
    drop(sink);
    assert!(!ok);

    let events = stream.collect().await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Log(line) => {
            assert!(line.contains("Test environment installation failed"), "{line}");
            assert!(line.contains("python0.1"), "{line}");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!verifier.env_dir(Some(&target)).exists());
}

#[tokio::test]
async fn test_missing_default_interpreter_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let verifier = EnvironmentVerifier::new(
        CacheStore::new(tmp.path()),
        "reqmerge-no-such-python-xyz",
    );
    let (sink, _stream) = channel();
    assert!(!verifier.verify(&pins(), None, &sink).await);
}
