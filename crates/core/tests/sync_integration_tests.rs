//! Integration tests for the download/activate workflow
//!
//! Drives the sync engine through registry discovery with stub providers and
//! checks the cache and mods folder on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mcmm_core::providers::{
    CapabilityKind, DownloadCapability, DownloadRequest, Metadata, Provider, ProviderRegistry,
    ProviderRunner, ProviderSource,
};
use mcmm_core::sync::MODS_DIR;
use mcmm_core::{
    Error, FaultReason, ModEntry, Profile, ProfileStore, ProviderError, Settings, SyncEngine,
};
use tempfile::TempDir;

/// Writes a 10-byte `<name>.jar` into its cache dir.
#[derive(Default)]
struct Stub;

impl Provider for Stub {
    fn id(&self) -> &str {
        "stub"
    }

    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        Some(self)
    }
}

#[async_trait]
impl DownloadCapability for Stub {
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
        let name = request
            .metadata
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::invalid_metadata("missing 'name'"))?;
        let path = request.cache_dir.join(format!("{name}.jar"));
        std::fs::write(&path, b"0123456789")?;
        Ok(path)
    }
}

/// Always fails.
#[derive(Default)]
struct Broken;

impl Provider for Broken {
    fn id(&self) -> &str {
        "broken"
    }

    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        Some(self)
    }
}

#[async_trait]
impl DownloadCapability for Broken {
    async fn download(&self, _request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
        Err(ProviderError::http(503, "https://mods.invalid/broken"))
    }
}

struct Env {
    _tmp: TempDir,
    settings: Settings,
    store: ProfileStore,
    runner: ProviderRunner,
}

impl Env {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::with_root(tmp.path());
        std::fs::create_dir_all(&settings.minecraft_dir).unwrap();
        let store = ProfileStore::new(&settings);

        let discovery = ProviderRegistry::discover([
            ProviderSource::new("stub").with_default::<Stub>(),
            ProviderSource::new("broken").with_default::<Broken>(),
        ]);
        assert!(discovery.diagnostics.is_empty());
        let runner = ProviderRunner::new(discovery.registry, settings.provider_cache_dir.clone());

        Self {
            _tmp: tmp,
            settings,
            store,
            runner,
        }
    }

    fn engine(&self) -> SyncEngine<'_> {
        SyncEngine::new(&self.settings, &self.store)
    }

    fn save(&self, name: &str, mods: Vec<ModEntry>) {
        let mut profile = Profile::new("1.20");
        profile.mods = mods;
        self.store.save(name, &profile).unwrap();
    }

    fn mods_dir(&self) -> PathBuf {
        self.settings.minecraft_dir.join(MODS_DIR)
    }
}

fn entry(provider: &str, name: &str) -> ModEntry {
    let mut metadata = Metadata::new();
    metadata.insert("name".into(), name.into());
    ModEntry::new(provider, metadata)
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_download_then_activate() {
    let env = Env::new();
    env.save("p", vec![entry("stub", "a")]);
    std::fs::create_dir_all(env.mods_dir()).unwrap();
    std::fs::write(env.mods_dir().join("old.jar"), b"old").unwrap();

    let report = env.engine().download("p", &env.runner, None).await.unwrap();

    assert!(report.is_complete());
    let cached = env.store.cache_dir("p").unwrap().join("a.jar");
    assert_eq!(report.artifacts, [cached.clone()]);
    assert_eq!(std::fs::metadata(&cached).unwrap().len(), 10);

    env.engine().activate("p").unwrap();
    assert_eq!(file_names(&env.mods_dir()), BTreeSet::from(["a.jar".to_string()]));
}

#[tokio::test]
async fn test_failing_entry_does_not_abort_siblings() {
    let env = Env::new();
    env.save(
        "p",
        vec![
            entry("stub", "a"),
            entry("broken", "b"),
            entry("stub", "c"),
        ],
    );

    let report = env.engine().download("p", &env.runner, None).await.unwrap();

    assert_eq!(
        file_names(&env.store.cache_dir("p").unwrap()),
        BTreeSet::from(["a.jar".to_string(), "c.jar".to_string()])
    );
    assert_eq!(report.fault_count(), 1);
    let fault = &report.faults[0];
    assert_eq!(fault.index, 1);
    assert_eq!(fault.entry, entry("broken", "b"));
    assert!(matches!(
        fault.reason,
        FaultReason::Provider(ProviderError::Http { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_unknown_provider_is_an_entry_fault() {
    let env = Env::new();
    env.save("p", vec![entry("missing", "a"), entry("stub", "b")]);

    let report = env.engine().download("p", &env.runner, None).await.unwrap();

    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.fault_count(), 1);
    assert!(!report.faults[0].reason.to_string().is_empty());
}

#[tokio::test]
async fn test_download_is_idempotent() {
    let env = Env::new();
    env.save("p", vec![entry("stub", "a"), entry("stub", "b")]);

    env.engine().download("p", &env.runner, None).await.unwrap();
    let first = env.store.cached_artifacts("p").unwrap();
    env.engine().download("p", &env.runner, None).await.unwrap();
    let second = env.store.cached_artifacts("p").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_activation_matches_cache_exactly() {
    let env = Env::new();
    env.save("p", vec![entry("stub", "a"), entry("stub", "b")]);
    std::fs::create_dir_all(env.mods_dir()).unwrap();
    for unrelated in ["fabric-api.jar", "a.jar", "zz.jar"] {
        std::fs::write(env.mods_dir().join(unrelated), b"unmanaged").unwrap();
    }

    env.engine().download("p", &env.runner, None).await.unwrap();
    let report = env.engine().activate("p").unwrap();

    assert_eq!(report.removed.len(), 3);
    assert_eq!(
        file_names(&env.mods_dir()),
        file_names(&env.store.cache_dir("p").unwrap())
    );
    assert_eq!(
        std::fs::read(env.mods_dir().join("a.jar")).unwrap(),
        b"0123456789"
    );
}

#[tokio::test]
async fn test_missing_profile_fails_before_anything_destructive() {
    let env = Env::new();
    std::fs::create_dir_all(env.mods_dir()).unwrap();
    std::fs::write(env.mods_dir().join("keep.jar"), b"x").unwrap();

    let err = env
        .engine()
        .download("ghost", &env.runner, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound { .. }));

    let err = env.engine().activate("ghost").unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound { .. }));
    assert!(env.mods_dir().join("keep.jar").exists());
}

#[test]
fn test_registry_indexes_each_kind_once() {
    let discovery = ProviderRegistry::discover([
        ProviderSource::new("stub").with_default::<Stub>(),
        ProviderSource::new("broken").with_default::<Broken>(),
    ]);
    let registry = discovery.registry;

    assert_eq!(registry.ids_for(CapabilityKind::Download), ["stub", "broken"]);
    assert!(registry.ids_for(CapabilityKind::Generate).is_empty());
    for provider in registry.iter() {
        assert_eq!(provider.kinds(), [CapabilityKind::Download]);
    }
}
