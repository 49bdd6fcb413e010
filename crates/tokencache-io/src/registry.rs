//! Scheme-based filesystem resolution with a shared instance cache.
//!
//! A registry maps URI schemes to factories and keeps one filesystem per
//! [`FsKey`], so every path on the same scheme + authority resolves to the
//! same handle. The cache can be bypassed per scheme with
//! `fs.<scheme>.impl.disable.cache=true`.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, RwLock};

use tokencache_config::Configuration;
use tokencache_types::error::{Result, TokenCacheError};
use tracing::debug;

use crate::fs::FileSystem;
use crate::local_fs::LocalFileSystem;
use crate::path::{FsKey, FsPath};

/// Builds a filesystem for a key.
pub type FileSystemFactory =
    Arc<dyn Fn(&FsKey, &Configuration) -> Result<Arc<dyn FileSystem>> + Send + Sync>;

/// Global registry shared across the process, with the built-in backends.
static GLOBAL_REGISTRY: LazyLock<FileSystemRegistry> =
    LazyLock::new(FileSystemRegistry::with_defaults);

/// Get the global registry.
pub fn global_registry() -> &'static FileSystemRegistry {
    &GLOBAL_REGISTRY
}

pub struct FileSystemRegistry {
    factories: RwLock<HashMap<String, FileSystemFactory>>,
    cache: Mutex<HashMap<FsKey, Arc<dyn FileSystem>>>,
}

impl FileSystemRegistry {
    /// An empty registry that knows no schemes.
    pub fn new() -> Self {
        FileSystemRegistry {
            factories: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A registry with `file` and, with the `hdfs` feature, the HDFS schemes.
    pub fn with_defaults() -> Self {
        let registry = FileSystemRegistry::new();
        registry.register("file", |_key: &FsKey, _conf: &Configuration| {
            Ok(Arc::new(LocalFileSystem::new()) as Arc<dyn FileSystem>)
        });
        #[cfg(feature = "hdfs")]
        for scheme in ["hdfs", "webhdfs", "swebhdfs"] {
            registry.register(scheme, |key: &FsKey, conf: &Configuration| {
                let fs = crate::hdfs_fs::WebHdfsFileSystem::new(key, conf)?;
                Ok(Arc::new(fs) as Arc<dyn FileSystem>)
            });
        }
        registry
    }

    /// Register (or replace) the factory for `scheme`.
    pub fn register<F>(&self, scheme: &str, factory: F)
    where
        F: Fn(&FsKey, &Configuration) -> Result<Arc<dyn FileSystem>> + Send + Sync + 'static,
    {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scheme.to_ascii_lowercase(), Arc::new(factory));
    }

    /// Whether a factory is registered for `scheme`.
    pub fn supports(&self, scheme: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&scheme.to_ascii_lowercase())
    }

    /// Resolve the filesystem owning `path`.
    pub fn get(&self, path: &FsPath, conf: &Configuration) -> Result<Arc<dyn FileSystem>> {
        let key = FsKey::for_path(path, conf)?;
        self.get_for_key(&key, conf)
    }

    /// Resolve the filesystem for `key`, creating it on a cache miss.
    pub fn get_for_key(&self, key: &FsKey, conf: &Configuration) -> Result<Arc<dyn FileSystem>> {
        if conf.is_cache_disabled(key.scheme()) {
            debug!(fs = %key, "filesystem cache disabled, creating fresh instance");
            return self.create(key, conf);
        }

        if let Some(fs) = self.lock_cache().get(key) {
            return Ok(Arc::clone(fs));
        }

        // Created outside the lock; if another thread won the race, its
        // instance is kept and ours is dropped.
        let fs = self.create(key, conf)?;
        let mut cache = self.lock_cache();
        let cached = cache.entry(key.clone()).or_insert(fs);
        Ok(Arc::clone(cached))
    }

    /// Drop every cached filesystem.
    pub fn close_all(&self) {
        self.lock_cache().clear();
    }

    /// Number of cached filesystems.
    pub fn cached_count(&self) -> usize {
        self.lock_cache().len()
    }

    fn create(&self, key: &FsKey, conf: &Configuration) -> Result<Arc<dyn FileSystem>> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.scheme())
            .cloned()
            .ok_or_else(|| TokenCacheError::UnsupportedScheme(key.scheme().to_string()))?;
        debug!(fs = %key, "creating filesystem");
        (*factory)(key, conf)
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<FsKey, Arc<dyn FileSystem>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FileSystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokencache_types::token::Token;

    struct NamedFs {
        key: FsKey,
    }

    impl FileSystem for NamedFs {
        fn key(&self) -> &FsKey {
            &self.key
        }

        fn canonical_service_name(&self) -> Option<String> {
            self.key.authority().map(str::to_string)
        }

        fn get_delegation_token(&self, _renewer: &str) -> Result<Option<Token>> {
            Ok(None)
        }
    }

    fn counting_registry(created: Arc<AtomicUsize>) -> FileSystemRegistry {
        let registry = FileSystemRegistry::new();
        registry.register("mem", move |key: &FsKey, _conf: &Configuration| {
            created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NamedFs { key: key.clone() }) as Arc<dyn FileSystem>)
        });
        registry
    }

    #[test]
    fn test_same_authority_shares_instance() {
        let created = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(created.clone());
        let conf = Configuration::new();

        let a = registry.get(&FsPath::parse("mem://nn1/a").unwrap(), &conf).unwrap();
        let b = registry.get(&FsPath::parse("MEM://NN1/b").unwrap(), &conf).unwrap();
        let c = registry.get(&FsPath::parse("mem://nn2/c").unwrap(), &conf).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(registry.cached_count(), 2);

        registry.close_all();
        assert_eq!(registry.cached_count(), 0);
        registry.get(&FsPath::parse("mem://nn1/a").unwrap(), &conf).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let created = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(created.clone());
        let conf = Configuration::from_pairs([("fs.mem.impl.disable.cache", "true")]);

        let path = FsPath::parse("mem://nn1/a").unwrap();
        let a = registry.get(&path, &conf).unwrap();
        let b = registry.get(&path, &conf).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.key(), b.key());
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn test_unknown_scheme() {
        let registry = FileSystemRegistry::new();
        let conf = Configuration::new();
        let err = registry
            .get(&FsPath::parse("gopher://host/x").unwrap(), &conf)
            .err()
            .unwrap();
        assert!(matches!(err, TokenCacheError::UnsupportedScheme(ref s) if s == "gopher"));
        assert!(err.is_io_failure());
    }

    #[test]
    fn test_defaults_resolve_local_paths() {
        let registry = FileSystemRegistry::with_defaults();
        assert!(registry.supports("file"));
        assert!(registry.supports("FILE"));
        let conf = Configuration::new();
        let fs = registry.get(&FsPath::parse("/tmp/data").unwrap(), &conf).unwrap();
        assert_eq!(fs.uri(), "file:///");
        assert!(fs.canonical_service_name().is_none());
    }

    #[cfg(feature = "hdfs")]
    #[test]
    fn test_defaults_know_hdfs() {
        let registry = FileSystemRegistry::with_defaults();
        assert!(registry.supports("hdfs"));
        assert!(registry.supports("webhdfs"));
        assert!(registry.supports("swebhdfs"));
        let conf = Configuration::from_pairs([("fs.defaultFS", "hdfs://nn1:8020")]);
        let fs = registry.get(&FsPath::parse("/user/alice").unwrap(), &conf).unwrap();
        assert_eq!(fs.uri(), "hdfs://nn1:8020");
        assert_eq!(fs.canonical_service_name().as_deref(), Some("nn1:8020"));
    }
}
