//! Wrapper registry to ensure each pipeline is built once and shared.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::PalaeoConfig;
use crate::error::Result;
use crate::pipeline::NlpBackend;
use crate::wrapper::StanzaWrapper;

/// Registry key: toolkit language code and resolved treebank.
pub type WrapperKey = (String, String);

type Slot = Arc<OnceCell<Arc<StanzaWrapper>>>;

/// Caller-owned cache of built wrappers.
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct WrapperRegistry {
    backend: Arc<dyn NlpBackend>,
    config: Arc<PalaeoConfig>,
    catalog: Arc<Catalog>,
    wrappers: Arc<RwLock<HashMap<WrapperKey, Slot>>>,
}

impl WrapperRegistry {
    pub fn new(backend: Arc<dyn NlpBackend>, config: PalaeoConfig) -> Result<Self> {
        let catalog = config.catalog()?;
        Ok(Self {
            backend,
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            wrappers: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &PalaeoConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Return the wrapper for `(language, treebank)`, building it on first use.
    ///
    /// The treebank is resolved before lookup, so omitting it and naming the
    /// default explicitly hit the same entry. Concurrent callers asking for
    /// the same key wait for a single build. A failed build leaves the entry
    /// empty and the next call tries again.
    pub fn get_or_create(
        &self,
        language: &str,
        treebank: Option<&str>,
    ) -> Result<Arc<StanzaWrapper>> {
        let resolved = self.catalog.resolve(language, treebank)?;
        let key = (resolved.language.clone(), resolved.treebank.clone());

        let cell = {
            let mut guard = self.wrappers.write().unwrap_or_else(|e| e.into_inner());
            guard
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        if let Some(wrapper) = cell.get() {
            debug!("Reusing pipeline for {}", resolved);
            return Ok(wrapper.clone());
        }

        let wrapper = cell.get_or_try_init(|| {
            info!("Building pipeline for {}", resolved);
            StanzaWrapper::with_catalog(
                self.backend.clone(),
                &self.catalog,
                &self.config,
                &resolved.language,
                Some(&resolved.treebank),
                None,
            )
            .map(Arc::new)
        })?;

        Ok(wrapper.clone())
    }

    /// Return an already built wrapper without building one.
    pub fn get(&self, language: &str, treebank: Option<&str>) -> Option<Arc<StanzaWrapper>> {
        let resolved = self.catalog.resolve(language, treebank).ok()?;
        let guard = self.wrappers.read().unwrap_or_else(|e| e.into_inner());
        guard
            .get(&(resolved.language, resolved.treebank))
            .and_then(|cell| cell.get().cloned())
    }

    /// Drop the entry for a key. Callers still holding the `Arc` keep it alive.
    pub fn remove(&self, language: &str, treebank: Option<&str>) -> Option<Arc<StanzaWrapper>> {
        let resolved = self.catalog.resolve(language, treebank).ok()?;
        let mut guard = self.wrappers.write().unwrap_or_else(|e| e.into_inner());
        guard
            .remove(&(resolved.language, resolved.treebank))
            .and_then(|cell| cell.get().cloned())
    }

    pub fn clear(&self) {
        let mut guard = self.wrappers.write().unwrap_or_else(|e| e.into_inner());
        guard.clear();
    }

    /// Number of built wrappers.
    pub fn len(&self) -> usize {
        let guard = self.wrappers.read().unwrap_or_else(|e| e.into_inner());
        guard.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of built wrappers, sorted.
    pub fn keys(&self) -> Vec<WrapperKey> {
        let guard = self.wrappers.read().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<WrapperKey> = guard
            .iter()
            .filter(|(_, cell)| cell.get().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::FakeBackend;
    use std::sync::Barrier;
    use std::thread;

    fn registry(backend: &Arc<FakeBackend>, dir: &std::path::Path) -> WrapperRegistry {
        let config = PalaeoConfig::default().with_resources_dir(dir);
        WrapperRegistry::new(backend.clone(), config).unwrap()
    }

    #[test]
    fn same_key_returns_same_instance() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());

        let first = registry.get_or_create("lat", None).unwrap();
        let second = registry.get_or_create("lat", None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.load_count(), 1);
        assert_eq!(backend.download_count(), 1);
    }

    #[test]
    fn default_and_explicit_default_share_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());

        let implicit = registry.get_or_create("lat", None).unwrap();
        let explicit = registry.get_or_create("lat", Some("ittb")).unwrap();
        let blank = registry.get_or_create(" lat ", Some("  ")).unwrap();
        assert!(Arc::ptr_eq(&implicit, &explicit));
        assert!(Arc::ptr_eq(&implicit, &blank));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn other_treebank_gets_its_own_entry() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());

        let ittb = registry.get_or_create("lat", None).unwrap();
        let perseus = registry.get_or_create("lat", Some("perseus")).unwrap();
        assert!(!Arc::ptr_eq(&ittb, &perseus));
        assert_eq!(perseus.treebank(), "perseus");
        assert_eq!(
            registry.keys(),
            vec![
                ("lat".to_string(), "ittb".to_string()),
                ("lat".to_string(), "perseus".to_string()),
            ]
        );
    }

    #[test]
    fn errors_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new().failing_loads(1));
        let registry = registry(&backend, dir.path());

        let err = registry.get_or_create("grc", None).unwrap_err();
        assert!(matches!(err, Error::PipelineError(_)));
        assert!(registry.get("grc", None).is_none());
        assert!(registry.is_empty());

        let wrapper = registry.get_or_create("grc", None).unwrap();
        assert_eq!(wrapper.treebank(), "proiel");
        assert_eq!(backend.load_count(), 2);
        // the model landed on disk during the first attempt
        assert_eq!(backend.download_count(), 1);
    }

    #[test]
    fn unknown_language_is_rejected_without_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());

        let err = registry.get_or_create("xxx", None).unwrap_err();
        assert!(matches!(err, Error::UnknownLanguage(_)));
        let err = registry.get_or_create("lat", Some("xxx")).unwrap_err();
        assert!(matches!(err, Error::UnimplementedLanguage { .. }));
        assert!(registry.keys().is_empty());
        assert_eq!(backend.download_count(), 0);
    }

    #[test]
    fn get_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());

        assert!(registry.get("got", None).is_none());
        let built = registry.get_or_create("got", None).unwrap();
        let fetched = registry.get("got", Some("proiel")).unwrap();
        assert!(Arc::ptr_eq(&built, &fetched));

        let removed = registry.remove("got", None).unwrap();
        assert!(Arc::ptr_eq(&built, &removed));
        assert!(registry.get("got", None).is_none());

        let rebuilt = registry.get_or_create("got", None).unwrap();
        assert!(!Arc::ptr_eq(&built, &rebuilt));
        assert_eq!(backend.load_count(), 2);

        registry.get_or_create("fro", None).unwrap();
        assert_eq!(registry.len(), 2);
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());
        let other = registry.clone();

        let a = registry.get_or_create("chu", None).unwrap();
        let b = other.get_or_create("chu", None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn concurrent_callers_build_once() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let registry = registry(&backend, dir.path());
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_create("lat", None).unwrap()
                })
            })
            .collect();

        let wrappers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for wrapper in &wrappers[1..] {
            assert!(Arc::ptr_eq(&wrappers[0], wrapper));
        }
        assert_eq!(backend.load_count(), 1);
        assert_eq!(backend.download_count(), 1);
    }
}
