//! Asset storage - owns loaded asset data
//!
//! Assets are stored type-erased and accessed either by cloning or through
//! closures run under the storage lock. The closure accessors exist for
//! assets that cannot be cloned (a font owning rasterizer faces and atlas
//! textures) and for in-place mutation such as lazily filling glyph caches.

use crate::handle::{AssetId, Handle, HandleData, LoadState, WeakHandle};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use parking_lot::RwLock;

struct AssetEntry {
    handle_data: Arc<HandleData>,
    data: Option<Box<dyn Any>>,
    type_id: TypeId,
}

impl AssetEntry {
    fn new(id: AssetId, type_id: TypeId) -> Self {
        Self {
            handle_data: Arc::new(HandleData::new(id)),
            data: None,
            type_id,
        }
    }
}

/// Storage for all loaded assets
pub struct AssetStorage {
    assets: RwLock<BTreeMap<AssetId, AssetEntry>>,
    next_id: core::sync::atomic::AtomicU64,
}

impl AssetStorage {
    /// Create new asset storage
    pub fn new() -> Self {
        Self {
            assets: RwLock::new(BTreeMap::new()),
            next_id: core::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Allocate a new asset ID
    pub fn allocate_id(&self) -> AssetId {
        AssetId::new(
            self.next_id
                .fetch_add(1, core::sync::atomic::Ordering::Relaxed),
        )
    }

    /// Register an asset slot, returning a handle to it
    pub fn register<T: 'static>(&self, id: AssetId) -> Handle<T> {
        let mut assets = self.assets.write();
        let entry = assets
            .entry(id)
            .or_insert_with(|| AssetEntry::new(id, TypeId::of::<T>()));
        Handle::from_data(entry.handle_data.clone())
    }

    /// Store a loaded asset, type-erased
    pub fn store_erased(&self, id: AssetId, asset: Box<dyn Any>, type_id: TypeId) {
        let mut assets = self.assets.write();
        let entry = assets
            .entry(id)
            .or_insert_with(|| AssetEntry::new(id, type_id));
        entry.data = Some(asset);
        entry.type_id = type_id;
        entry.handle_data.set_state(LoadState::Loaded);
    }

    /// Get an asset by cloning it (requires Clone)
    pub fn get_cloned<T: Clone + 'static>(&self, id: AssetId) -> Option<T> {
        let assets = self.assets.read();
        let entry = assets.get(&id)?;
        if entry.type_id != TypeId::of::<T>() {
            return None;
        }
        entry.data.as_ref()?.downcast_ref::<T>().cloned()
    }

    /// Run a closure against a loaded asset
    pub fn with<T: 'static, R>(&self, id: AssetId, f: impl FnOnce(&T) -> R) -> Option<R> {
        let assets = self.assets.read();
        let entry = assets.get(&id)?;
        let asset = entry.data.as_ref()?.downcast_ref::<T>()?;
        Some(f(asset))
    }

    /// Run a closure against a loaded asset, mutably
    pub fn with_mut<T: 'static, R>(&self, id: AssetId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut assets = self.assets.write();
        let entry = assets.get_mut(&id)?;
        let asset = entry.data.as_mut()?.downcast_mut::<T>()?;
        Some(f(asset))
    }

    /// Get a handle to an asset
    pub fn get_handle<T: 'static>(&self, id: AssetId) -> Option<Handle<T>> {
        let assets = self.assets.read();
        let entry = assets.get(&id)?;
        if entry.type_id != TypeId::of::<T>() {
            return None;
        }
        Some(Handle::from_data(entry.handle_data.clone()))
    }

    /// Get a weak handle without touching the strong count
    pub fn get_weak<T: 'static>(&self, id: AssetId) -> Option<WeakHandle<T>> {
        self.get_handle::<T>(id).map(|h| h.downgrade())
    }

    /// Get the load state of an asset
    pub fn get_state(&self, id: AssetId) -> Option<LoadState> {
        let assets = self.assets.read();
        assets.get(&id).map(|e| e.handle_data.state())
    }

    /// Set the load state of an asset
    pub fn set_state(&self, id: AssetId, state: LoadState) {
        let assets = self.assets.read();
        if let Some(entry) = assets.get(&id) {
            entry.handle_data.set_state(state);
        }
    }

    /// Check if an asset is loaded
    pub fn is_loaded(&self, id: AssetId) -> bool {
        self.get_state(id) == Some(LoadState::Loaded)
    }

    /// Increment generation for an asset (on reload)
    pub fn increment_generation(&self, id: AssetId) -> Option<u32> {
        let assets = self.assets.read();
        assets.get(&id).map(|e| e.handle_data.increment_generation())
    }

    /// Strong handle count for an asset
    pub fn strong_count(&self, id: AssetId) -> Option<usize> {
        let assets = self.assets.read();
        assets.get(&id).map(|e| e.handle_data.strong_count())
    }

    /// Remove an asset, dropping its data
    pub fn remove(&self, id: AssetId) -> bool {
        let mut assets = self.assets.write();
        assets.remove(&id).is_some()
    }

    /// IDs of assets with no strong handles left
    pub fn unreferenced(&self) -> Vec<AssetId> {
        let assets = self.assets.read();
        assets
            .iter()
            .filter(|(_, entry)| entry.handle_data.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

impl Default for AssetStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(i32);

    #[test]
    fn test_register_store_access() {
        let storage = AssetStorage::new();
        let id = storage.allocate_id();
        let handle: Handle<Counter> = storage.register(id);

        assert_eq!(handle.state(), LoadState::NotLoaded);

        storage.store_erased(id, Box::new(Counter(42)), TypeId::of::<Counter>());
        assert_eq!(handle.state(), LoadState::Loaded);
        assert_eq!(storage.with(id, |c: &Counter| c.0), Some(42));
    }

    #[test]
    fn test_with_mut() {
        let storage = AssetStorage::new();
        let id = storage.allocate_id();
        storage.store_erased(id, Box::new(Counter(1)), TypeId::of::<Counter>());

        storage.with_mut(id, |c: &mut Counter| c.0 += 9);
        assert_eq!(storage.with(id, |c: &Counter| c.0), Some(10));
    }

    #[test]
    fn test_type_mismatch_is_none() {
        let storage = AssetStorage::new();
        let id = storage.allocate_id();
        storage.store_erased(id, Box::new(Counter(5)), TypeId::of::<Counter>());

        assert!(storage.get_handle::<alloc::string::String>(id).is_none());
        assert!(storage.with(id, |_: &alloc::string::String| ()).is_none());
    }

    #[test]
    fn test_unreferenced_tracks_handles() {
        let storage = AssetStorage::new();
        let id = storage.allocate_id();
        {
            let _handle: Handle<Counter> = storage.register(id);
            storage.store_erased(id, Box::new(Counter(0)), TypeId::of::<Counter>());
            assert!(storage.unreferenced().is_empty());
        }
        assert_eq!(storage.unreferenced(), [id]);
    }
}
