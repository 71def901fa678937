//! Deferred widget loading.
//!
//! Widget artwork is fetched lazily, the first time a widget kind is mounted.
//! Until it arrives the host shows the loading spinner carried by the
//! descriptor. Loaded assets are cached per kind for the lifetime of the
//! [`AssetCache`]; failed loads are not cached and are retried on the next
//! mount.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use fwdash_types::{DashError, WidgetKind};
use tokio::runtime::Handle;
use tokio::sync::{OnceCell, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Artwork for one widget kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetAssets {
    pub kind: WidgetKind,
    pub template: String,
}

/// Source of widget artwork.
#[async_trait]
pub trait WidgetLoader: Send + Sync {
    async fn load(&self, kind: WidgetKind) -> Result<WidgetAssets, DashError>;
}

/// Loader with a placeholder template compiled in. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

#[async_trait]
impl WidgetLoader for BuiltinLoader {
    async fn load(&self, kind: WidgetKind) -> Result<WidgetAssets, DashError> {
        Ok(WidgetAssets {
            kind,
            template: format!(r#"<svg data-widget="{kind}"/>"#),
        })
    }
}

/// Loads `<root>/<kind>.svg`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, kind: WidgetKind) -> PathBuf {
        self.root.join(format!("{}.svg", kind.as_str()))
    }
}

#[async_trait]
impl WidgetLoader for FsLoader {
    async fn load(&self, kind: WidgetKind) -> Result<WidgetAssets, DashError> {
        let path = self.path_for(kind);
        let template = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DashError::Asset {
                kind: kind.to_string(),
                details: format!("{}: {e}", path.display()),
            })?;
        Ok(WidgetAssets { kind, template })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

type Slot = Arc<OnceCell<Arc<WidgetAssets>>>;

/// Loads each widget kind at most once, however many boundaries ask for it
/// concurrently.
pub struct AssetCache {
    loader: Arc<dyn WidgetLoader>,
    slots: Mutex<HashMap<WidgetKind, Slot>>,
}

impl AssetCache {
    pub fn new(loader: impl WidgetLoader + 'static) -> Self {
        Self::with_loader(Arc::new(loader))
    }

    pub fn with_loader(loader: Arc<dyn WidgetLoader>) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BuiltinLoader)
    }

    fn slot(&self, kind: WidgetKind) -> Slot {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .clone()
    }

    /// Assets already loaded for `kind`, without starting a load.
    pub fn cached(&self, kind: WidgetKind) -> Option<Arc<WidgetAssets>> {
        self.slot(kind).get().cloned()
    }

    /// Assets for `kind`, loading them if this is the first request.
    pub async fn get(&self, kind: WidgetKind) -> Result<Arc<WidgetAssets>, DashError> {
        let slot = self.slot(kind);
        slot.get_or_try_init(|| async {
            debug!(%kind, "loading widget assets");
            self.loader.load(kind).await.map(Arc::new)
        })
        .await
        .cloned()
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count();
        f.debug_struct("AssetCache").field("loaded", &loaded).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Boundary
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum LoadState {
    Pending,
    Ready(Arc<WidgetAssets>),
    /// The placeholder stays up; the next mount retries.
    Failed(DashError),
}

/// A pending or completed asset load for one mounted widget kind.
///
/// The load runs as a task on the ambient tokio runtime. Dropping the
/// boundary aborts it.
#[derive(Debug)]
pub struct LoadingBoundary {
    kind: WidgetKind,
    state: watch::Receiver<LoadState>,
    task: Option<JoinHandle<()>>,
}

impl LoadingBoundary {
    pub fn mount(kind: WidgetKind, cache: &Arc<AssetCache>) -> Self {
        if let Some(assets) = cache.cached(kind) {
            let (_, state) = watch::channel(LoadState::Ready(assets));
            return Self {
                kind,
                state,
                task: None,
            };
        }

        let (tx, state) = watch::channel(LoadState::Pending);
        let task = match Handle::try_current() {
            Ok(handle) => {
                let cache = cache.clone();
                Some(handle.spawn(async move {
                    let next = match cache.get(kind).await {
                        Ok(assets) => LoadState::Ready(assets),
                        Err(e) => {
                            warn!(%kind, error = %e, "widget assets failed to load");
                            LoadState::Failed(e)
                        }
                    };
                    tx.send_replace(next);
                }))
            }
            Err(_) => {
                warn!(%kind, "no async runtime, widget assets cannot load");
                tx.send_replace(LoadState::Failed(DashError::Asset {
                    kind: kind.to_string(),
                    details: "no tokio runtime".to_string(),
                }));
                None
            }
        };
        Self { kind, state, task }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn assets(&self) -> Option<Arc<WidgetAssets>> {
        match &*self.state.borrow() {
            LoadState::Ready(assets) => Some(assets.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Pending)
    }

    /// Wait until the load settles. Returns the assets on success.
    pub async fn ready(&mut self) -> Option<Arc<WidgetAssets>> {
        if self
            .state
            .wait_for(|state| !matches!(state, LoadState::Pending))
            .await
            .is_err()
        {
            return None;
        }
        self.assets()
    }
}

impl Drop for LoadingBoundary {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Counts loads and optionally fails the first few.
    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
        failures: usize,
    }

    #[async_trait]
    impl WidgetLoader for CountingLoader {
        async fn load(&self, kind: WidgetKind) -> Result<WidgetAssets, DashError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(DashError::Asset {
                    kind: kind.to_string(),
                    details: "unavailable".to_string(),
                });
            }
            BuiltinLoader.load(kind).await
        }
    }

    /// Blocks until released.
    struct GatedLoader {
        gate: Arc<Notify>,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl WidgetLoader for GatedLoader {
        async fn load(&self, kind: WidgetKind) -> Result<WidgetAssets, DashError> {
            self.gate.notified().await;
            self.finished.store(true, Ordering::SeqCst);
            BuiltinLoader.load(kind).await
        }
    }

    fn gated() -> (Arc<AssetCache>, Arc<Notify>, Arc<AtomicBool>) {
        let gate = Arc::new(Notify::new());
        let finished = Arc::new(AtomicBool::new(false));
        let cache = Arc::new(AssetCache::new(GatedLoader {
            gate: gate.clone(),
            finished: finished.clone(),
        }));
        (cache, gate, finished)
    }

    #[tokio::test]
    async fn builtin_assets_become_ready() {
        let cache = Arc::new(AssetCache::builtin());
        let mut boundary = LoadingBoundary::mount(WidgetKind::Sonar, &cache);
        let assets = boundary.ready().await.unwrap();
        assert_eq!(assets.kind, WidgetKind::Sonar);
        assert!(assets.template.contains("sonar"));
        assert!(!boundary.is_loading());
    }

    #[tokio::test]
    async fn placeholder_until_released() {
        let (cache, gate, _) = gated();
        let mut boundary = LoadingBoundary::mount(WidgetKind::Dial, &cache);
        tokio::task::yield_now().await;
        assert!(boundary.is_loading());
        assert!(boundary.assets().is_none());

        gate.notify_one();
        assert!(boundary.ready().await.is_some());
        assert!(cache.cached(WidgetKind::Dial).is_some());
    }

    #[tokio::test]
    async fn each_kind_loads_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = Arc::new(AssetCache::with_loader(loader.clone()));

        let mut first = LoadingBoundary::mount(WidgetKind::Ph, &cache);
        let mut second = LoadingBoundary::mount(WidgetKind::Ph, &cache);
        assert!(first.ready().await.is_some());
        assert!(second.ready().await.is_some());

        // Already cached: ready without a task.
        let third = LoadingBoundary::mount(WidgetKind::Ph, &cache);
        assert!(third.assets().is_some());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_next_mount() {
        let loader = Arc::new(CountingLoader {
            failures: 1,
            ..Default::default()
        });
        let cache = Arc::new(AssetCache::with_loader(loader.clone()));

        let mut failed = LoadingBoundary::mount(WidgetKind::Touch, &cache);
        assert!(failed.ready().await.is_none());
        assert!(matches!(failed.state(), LoadState::Failed(DashError::Asset { .. })));
        assert!(cache.cached(WidgetKind::Touch).is_none());

        let mut retried = LoadingBoundary::mount(WidgetKind::Touch, &cache);
        assert!(retried.ready().await.is_some());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropping_boundary_aborts_load() {
        let (cache, gate, finished) = gated();
        let boundary = LoadingBoundary::mount(WidgetKind::Line, &cache);
        tokio::task::yield_now().await;
        drop(boundary);

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!finished.load(Ordering::SeqCst));
        assert!(cache.cached(WidgetKind::Line).is_none());
    }

    #[test]
    fn mount_without_runtime_fails() {
        let cache = Arc::new(AssetCache::builtin());
        let boundary = LoadingBoundary::mount(WidgetKind::Solar, &cache);
        assert!(!boundary.is_loading());
        assert!(boundary.assets().is_none());
        assert!(matches!(boundary.state(), LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn fs_loader_reads_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("temperature.svg"), "<svg id=\"t\"/>").unwrap();
        let loader = FsLoader::new(dir.path());

        let assets = loader.load(WidgetKind::Temperature).await.unwrap();
        assert_eq!(assets.template, "<svg id=\"t\"/>");

        let err = loader.load(WidgetKind::DcVoltage).await.unwrap_err();
        assert!(matches!(err, DashError::Asset { ref kind, .. } if kind == "dc_voltage"));
    }
}
