//! Asset server - load/unload/reload orchestration
//!
//! The server hands out handles immediately and performs the actual decoding
//! inline when `process()` runs on the main thread, matching the frame-driven
//! model of the rest of the engine. Events describing completed loads,
//! reloads and unloads are queued and drained once per frame by whoever wires
//! assets to consumers.

use crate::handle::{AssetId, Handle, LoadState};
use crate::loader::{AssetLoader, LoadContext, LoadError, LoadResult, LoaderRegistry};
use crate::storage::AssetStorage;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use parking_lot::RwLock;

/// Asset path type
pub type AssetPath = String;

/// Event from the asset server
#[derive(Clone, Debug)]
pub enum AssetEvent {
    /// Asset finished loading
    Loaded(AssetId),
    /// Asset failed to load
    Failed(AssetId, String),
    /// Asset was reloaded; derived caches must be rebuilt
    Reloaded(AssetId),
    /// Asset was unloaded
    Unloaded(AssetId),
}

/// Asset server configuration
#[derive(Clone, Debug)]
pub struct AssetServerConfig {
    /// Base asset directory prepended to relative paths
    pub asset_dir: String,
    /// Sweep unreferenced assets automatically during `process()`
    pub sweep_unreferenced: bool,
}

impl Default for AssetServerConfig {
    fn default() -> Self {
        Self {
            asset_dir: "assets".to_string(),
            sweep_unreferenced: false,
        }
    }
}

/// Asset metadata
#[derive(Clone, Debug)]
pub struct AssetMeta {
    /// Asset path
    pub path: AssetPath,
    /// Asset type ID
    pub type_id: TypeId,
    /// Secondary files the asset was built from
    pub dependencies: Vec<String>,
}

/// The main asset server
pub struct AssetServer {
    config: AssetServerConfig,
    storage: AssetStorage,
    loaders: RwLock<LoaderRegistry>,
    path_map: RwLock<BTreeMap<AssetPath, AssetId>>,
    meta_map: RwLock<BTreeMap<AssetId, AssetMeta>>,
    load_queue: RwLock<Vec<(AssetId, AssetPath, TypeId)>>,
    events: RwLock<Vec<AssetEvent>>,
}

impl AssetServer {
    /// Create a new asset server
    pub fn new(config: AssetServerConfig) -> Self {
        Self {
            config,
            storage: AssetStorage::new(),
            loaders: RwLock::new(LoaderRegistry::new()),
            path_map: RwLock::new(BTreeMap::new()),
            meta_map: RwLock::new(BTreeMap::new()),
            load_queue: RwLock::new(Vec::new()),
            events: RwLock::new(Vec::new()),
        }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(AssetServerConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &AssetServerConfig {
        &self.config
    }

    /// Access the underlying storage
    pub fn storage(&self) -> &AssetStorage {
        &self.storage
    }

    /// Register a loader
    pub fn register_loader<L: AssetLoader + 'static>(&self, loader: L) {
        self.loaders.write().register(loader);
    }

    /// Request an asset by path, returning its handle immediately
    ///
    /// The load itself happens during the next `process()`.
    pub fn load<T: 'static>(&self, path: impl Into<String>) -> Handle<T> {
        let path = path.into();

        if let Some(&id) = self.path_map.read().get(&path) {
            if let Some(handle) = self.storage.get_handle::<T>(id) {
                return handle;
            }
        }

        let id = self.storage.allocate_id();
        let handle = self.storage.register::<T>(id);
        self.path_map.write().insert(path.clone(), id);
        self.load_queue
            .write()
            .push((id, path, TypeId::of::<T>()));
        self.storage.set_state(id, LoadState::Loading);

        handle
    }

    /// Get a handle to an already-requested asset
    pub fn get_handle<T: 'static>(&self, path: &str) -> Option<Handle<T>> {
        let id = *self.path_map.read().get(path)?;
        self.storage.get_handle::<T>(id)
    }

    /// Get an asset ID by path
    pub fn get_id(&self, path: &str) -> Option<AssetId> {
        self.path_map.read().get(path).copied()
    }

    /// Get the path for an asset ID
    pub fn get_path(&self, id: AssetId) -> Option<String> {
        self.path_map
            .read()
            .iter()
            .find(|(_, &v)| v == id)
            .map(|(k, _)| k.clone())
    }

    /// Check if an asset is loaded
    pub fn is_loaded(&self, id: AssetId) -> bool {
        self.storage.is_loaded(id)
    }

    /// Get asset metadata
    pub fn get_meta(&self, id: AssetId) -> Option<AssetMeta> {
        self.meta_map.read().get(&id).cloned()
    }

    /// Run a closure against a loaded asset
    pub fn with_asset<T: 'static, R>(&self, id: AssetId, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.storage.with(id, f)
    }

    /// Run a closure against a loaded asset, mutably
    pub fn with_asset_mut<T: 'static, R>(
        &self,
        id: AssetId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        self.storage.with_mut(id, f)
    }

    /// Process pending loads
    ///
    /// Call once per frame. Returns the number of assets processed.
    pub fn process(&self, read_file: impl Fn(&str) -> Option<Vec<u8>>) -> usize {
        let queue: Vec<_> = self.load_queue.write().drain(..).collect();
        let count = queue.len();

        for (id, path, type_id) in queue {
            match self.load_asset(&path, id, type_id, &read_file) {
                Ok((asset, dependencies)) => {
                    self.storage.store_erased(id, asset, type_id);
                    self.meta_map.write().insert(
                        id,
                        AssetMeta {
                            path: path.clone(),
                            type_id,
                            dependencies,
                        },
                    );
                    self.events.write().push(AssetEvent::Loaded(id));
                }
                Err(e) => {
                    self.storage.set_state(id, LoadState::Failed);
                    self.events
                        .write()
                        .push(AssetEvent::Failed(id, alloc::format!("{}", e)));
                }
            }
        }

        if self.config.sweep_unreferenced {
            self.release_unreferenced();
        }

        count
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with('/') || path.contains(':') {
            path.to_string()
        } else {
            alloc::format!("{}/{}", self.config.asset_dir, path)
        }
    }

    fn load_asset(
        &self,
        path: &str,
        id: AssetId,
        _type_id: TypeId,
        read_file: &impl Fn(&str) -> Option<Vec<u8>>,
    ) -> LoadResult<(Box<dyn Any>, Vec<String>)> {
        let full_path = self.resolve(path);
        let data = read_file(&full_path).ok_or(LoadError::NotFound(full_path))?;

        let read_dep = |dep: &str| read_file(&self.resolve(dep));
        let mut ctx = LoadContext::new(path, &data, id).with_reader(&read_dep);

        let loaders = self.loaders.read();
        let asset = loaders.load(&mut ctx)?;

        Ok((asset, ctx.dependencies))
    }

    /// Reload an asset in place, bumping its generation
    pub fn reload(&self, id: AssetId, read_file: impl Fn(&str) -> Option<Vec<u8>>) -> bool {
        let path = match self.get_path(id) {
            Some(p) => p,
            None => return false,
        };
        let meta = match self.get_meta(id) {
            Some(m) => m,
            None => return false,
        };

        self.storage.set_state(id, LoadState::Reloading);

        match self.load_asset(&path, id, meta.type_id, &read_file) {
            Ok((asset, dependencies)) => {
                self.storage.store_erased(id, asset, meta.type_id);
                self.storage.increment_generation(id);
                self.meta_map.write().insert(
                    id,
                    AssetMeta {
                        path,
                        type_id: meta.type_id,
                        dependencies,
                    },
                );
                self.events.write().push(AssetEvent::Reloaded(id));
                true
            }
            Err(_) => {
                self.storage.set_state(id, LoadState::Failed);
                false
            }
        }
    }

    /// IDs of assets whose primary file or any dependency matches `path`
    ///
    /// Used by hot-reload wiring: a changed sprite sheet re-triggers the
    /// fonts built from it.
    pub fn dependents_of(&self, path: &str) -> Vec<AssetId> {
        let meta = self.meta_map.read();
        meta.iter()
            .filter(|(_, m)| m.path == path || m.dependencies.iter().any(|d| d == path))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Reload every asset affected by the given changed paths
    ///
    /// Paths are matched against primary files and recorded dependencies,
    /// so a changed sprite sheet reloads the fonts built from it. Returns
    /// the number of assets reloaded.
    pub fn process_changes(
        &self,
        changed: &[String],
        read_file: impl Fn(&str) -> Option<Vec<u8>>,
    ) -> usize {
        let mut reloaded = 0;
        for path in changed {
            for id in self.dependents_of(path) {
                if self.reload(id, &read_file) {
                    reloaded += 1;
                }
            }
        }
        reloaded
    }

    /// Unload an asset, dropping its data
    pub fn unload(&self, id: AssetId) -> bool {
        if let Some(path) = self.get_path(id) {
            self.path_map.write().remove(&path);
        }
        self.meta_map.write().remove(&id);

        if self.storage.remove(id) {
            self.events.write().push(AssetEvent::Unloaded(id));
            true
        } else {
            false
        }
    }

    /// Unload every asset whose strong count reached zero
    pub fn release_unreferenced(&self) -> usize {
        let ids = self.storage.unreferenced();
        let count = ids.len();
        for id in ids {
            self.unload(id);
        }
        count
    }

    /// Drain queued events
    pub fn drain_events(&self) -> Vec<AssetEvent> {
        self.events.write().drain(..).collect()
    }

    /// Get pending load count
    pub fn pending_count(&self) -> usize {
        self.load_queue.read().len()
    }
}

impl Default for AssetServer {
    fn default() -> Self {
        Self::default_config()
    }
}

/// File watcher contract for hot-reload
///
/// Implementations (see the font crate's notify-based watcher) poll the
/// filesystem and report changed paths relative to the asset directory.
#[cfg(feature = "hot-reload")]
pub trait FileWatcher {
    /// Start watching a directory tree
    fn watch(&mut self, path: &str) -> bool;

    /// Stop watching a directory tree
    fn unwatch(&mut self, path: &str) -> bool;

    /// Poll for changed paths since the last call
    fn poll(&mut self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::AssetLoader;

    struct TextAsset(String);

    struct TextLoader;

    impl AssetLoader for TextLoader {
        type Asset = TextAsset;

        fn extensions(&self) -> &[&str] {
            &["txt"]
        }

        fn load(&self, ctx: &mut LoadContext) -> LoadResult<Self::Asset> {
            let text = ctx.read_string()?;
            Ok(TextAsset(text.to_string()))
        }
    }

    fn read_fixture(path: &str) -> Option<Vec<u8>> {
        match path {
            "assets/greeting.txt" => Some(b"Hello, Asset!".to_vec()),
            _ => None,
        }
    }

    #[test]
    fn test_load_and_process() {
        let server = AssetServer::default_config();
        server.register_loader(TextLoader);

        let handle: Handle<TextAsset> = server.load("greeting.txt");
        assert_eq!(handle.state(), LoadState::Loading);

        assert_eq!(server.process(read_fixture), 1);
        assert!(handle.is_loaded());
        assert_eq!(
            server.with_asset(handle.id(), |t: &TextAsset| t.0.clone()),
            Some("Hello, Asset!".to_string())
        );

        let events = server.drain_events();
        assert!(matches!(events[..], [AssetEvent::Loaded(_)]));
    }

    #[test]
    fn test_missing_file_fails() {
        let server = AssetServer::default_config();
        server.register_loader(TextLoader);

        let handle: Handle<TextAsset> = server.load("absent.txt");
        server.process(read_fixture);

        assert_eq!(handle.state(), LoadState::Failed);
        let events = server.drain_events();
        assert!(matches!(events[..], [AssetEvent::Failed(_, _)]));
    }

    #[test]
    fn test_reload_bumps_generation() {
        let server = AssetServer::default_config();
        server.register_loader(TextLoader);

        let handle: Handle<TextAsset> = server.load("greeting.txt");
        server.process(read_fixture);
        assert_eq!(handle.generation(), 0);

        assert!(server.reload(handle.id(), read_fixture));
        assert_eq!(handle.generation(), 1);

        let events = server.drain_events();
        assert!(matches!(
            events[..],
            [AssetEvent::Loaded(_), AssetEvent::Reloaded(_)]
        ));
    }

    #[test]
    fn test_unload_drops_data() {
        let server = AssetServer::default_config();
        server.register_loader(TextLoader);

        let handle: Handle<TextAsset> = server.load("greeting.txt");
        server.process(read_fixture);

        assert!(server.unload(handle.id()));
        assert!(server
            .with_asset(handle.id(), |t: &TextAsset| t.0.clone())
            .is_none());
        // Path mapping is gone; a fresh load gets a new ID
        let again: Handle<TextAsset> = server.load("greeting.txt");
        assert_ne!(again.id(), handle.id());
    }

    /// Loader whose asset is built from a secondary file
    struct ManifestLoader;

    struct Manifest(String);

    impl AssetLoader for ManifestLoader {
        type Asset = Manifest;

        fn extensions(&self) -> &[&str] {
            &["manifest"]
        }

        fn load(&self, ctx: &mut LoadContext) -> LoadResult<Self::Asset> {
            let dep_path = ctx.read_string()?.trim().to_string();
            let body = ctx.read_dependency(&dep_path)?;
            Ok(Manifest(
                core::str::from_utf8(&body).unwrap_or("").to_string(),
            ))
        }
    }

    #[test]
    fn test_changed_dependency_reloads_owner() {
        let server = AssetServer::default_config();
        server.register_loader(ManifestLoader);

        let read_v1 = |path: &str| -> Option<Vec<u8>> {
            match path {
                "assets/main.manifest" => Some(b"payload.txt".to_vec()),
                "assets/payload.txt" => Some(b"one".to_vec()),
                _ => None,
            }
        };

        let handle: Handle<Manifest> = server.load("main.manifest");
        server.process(read_v1);
        assert_eq!(
            server.with_asset(handle.id(), |m: &Manifest| m.0.clone()),
            Some("one".to_string())
        );
        assert_eq!(
            server.get_meta(handle.id()).unwrap().dependencies,
            ["payload.txt"]
        );

        let read_v2 = |path: &str| -> Option<Vec<u8>> {
            match path {
                "assets/main.manifest" => Some(b"payload.txt".to_vec()),
                "assets/payload.txt" => Some(b"two".to_vec()),
                _ => None,
            }
        };

        let reloaded =
            server.process_changes(&["payload.txt".to_string()], read_v2);
        assert_eq!(reloaded, 1);
        assert_eq!(handle.generation(), 1);
        assert_eq!(
            server.with_asset(handle.id(), |m: &Manifest| m.0.clone()),
            Some("two".to_string())
        );

        // Unrelated paths touch nothing
        assert_eq!(
            server.process_changes(&["other.txt".to_string()], read_v2),
            0
        );
    }

    #[test]
    fn test_same_path_shares_handle() {
        let server = AssetServer::default_config();
        server.register_loader(TextLoader);

        let a: Handle<TextAsset> = server.load("greeting.txt");
        let b: Handle<TextAsset> = server.load("greeting.txt");
        assert_eq!(a.id(), b.id());
        assert_eq!(server.pending_count(), 1);
    }
}
