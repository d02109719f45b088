//! Asset handles - reference-counted access to loaded assets
//!
//! A strong [`Handle`] keeps its asset alive; the server only sweeps assets
//! whose strong count has dropped to zero. The generation counter advances on
//! every reload so holders can detect that cached derived data (glyph lookup
//! tables, GPU uploads) went stale.

use alloc::sync::Arc;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Unique identifier for an asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Create a new asset ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Invalid asset ID
    pub const fn invalid() -> Self {
        Self(u64::MAX)
    }

    /// Check if valid
    pub const fn is_valid(&self) -> bool {
        self.0 != u64::MAX
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Load state for an asset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LoadState {
    /// Asset is not loaded
    NotLoaded = 0,
    /// Asset is queued or currently loading
    Loading = 1,
    /// Asset is loaded and ready
    Loaded = 2,
    /// Asset failed to load
    Failed = 3,
    /// Asset is being reloaded
    Reloading = 4,
}

impl From<u8> for LoadState {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Loading,
            2 => Self::Loaded,
            3 => Self::Failed,
            4 => Self::Reloading,
            _ => Self::NotLoaded,
        }
    }
}

/// Shared per-asset bookkeeping behind every handle
pub struct HandleData {
    /// Asset ID
    pub id: AssetId,
    state: AtomicU32,
    strong_count: AtomicUsize,
    /// Incremented on each reload
    generation: AtomicU32,
}

impl HandleData {
    /// Create new handle data
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            state: AtomicU32::new(LoadState::NotLoaded as u32),
            strong_count: AtomicUsize::new(0),
            generation: AtomicU32::new(0),
        }
    }

    /// Get current load state
    pub fn state(&self) -> LoadState {
        LoadState::from(self.state.load(Ordering::Acquire) as u8)
    }

    /// Set load state
    pub fn set_state(&self, state: LoadState) {
        self.state.store(state as u32, Ordering::Release);
    }

    /// Number of strong handles
    pub fn strong_count(&self) -> usize {
        self.strong_count.load(Ordering::Relaxed)
    }

    fn add_ref(&self) {
        self.strong_count.fetch_add(1, Ordering::Relaxed);
    }

    fn release(&self) {
        self.strong_count.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get generation
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    /// Increment generation (on reload)
    pub fn increment_generation(&self) -> u32 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Check if loaded
    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }
}

/// Strong handle to an asset
///
/// The asset stays resident while any strong handle exists.
pub struct Handle<T> {
    data: Arc<HandleData>,
    _marker: PhantomData<T>,
}

impl<T> Handle<T> {
    /// Create from shared handle data
    pub fn from_data(data: Arc<HandleData>) -> Self {
        data.add_ref();
        Self {
            data,
            _marker: PhantomData,
        }
    }

    /// Get the asset ID
    pub fn id(&self) -> AssetId {
        self.data.id
    }

    /// Get the load state
    pub fn state(&self) -> LoadState {
        self.data.state()
    }

    /// Check if the asset is loaded
    pub fn is_loaded(&self) -> bool {
        self.data.is_loaded()
    }

    /// Get the generation (for detecting reloads)
    pub fn generation(&self) -> u32 {
        self.data.generation()
    }

    /// Create a weak handle
    pub fn downgrade(&self) -> WeakHandle<T> {
        WeakHandle {
            data: Arc::downgrade(&self.data),
            _marker: PhantomData,
        }
    }

    /// Get the underlying handle data
    pub fn data(&self) -> &Arc<HandleData> {
        &self.data
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        self.data.add_ref();
        Self {
            data: self.data.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        self.data.release();
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data.id == other.data.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.id.hash(state);
    }
}

impl<T> core::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.data.id)
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Weak handle to an asset
///
/// Does not keep the asset resident; upgrade to use it.
pub struct WeakHandle<T> {
    data: alloc::sync::Weak<HandleData>,
    _marker: PhantomData<T>,
}

impl<T> WeakHandle<T> {
    /// Try to upgrade to a strong handle
    pub fn upgrade(&self) -> Option<Handle<T>> {
        self.data.upgrade().map(Handle::from_data)
    }

    /// Check if the bookkeeping is still alive
    pub fn is_alive(&self) -> bool {
        self.data.strong_count() > 0
    }
}

impl<T> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for WeakHandle<T> {
    fn default() -> Self {
        Self {
            data: alloc::sync::Weak::new(),
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FontAsset;

    fn fresh(id: u64) -> Handle<FontAsset> {
        Handle::from_data(Arc::new(HandleData::new(AssetId::new(id))))
    }

    #[test]
    fn test_handle_basic() {
        let handle = fresh(42);
        assert_eq!(handle.id(), AssetId::new(42));
        assert_eq!(handle.state(), LoadState::NotLoaded);
        assert!(!handle.is_loaded());
    }

    #[test]
    fn test_strong_count_tracks_clones() {
        let handle = fresh(1);
        let other = handle.clone();

        assert_eq!(handle.data().strong_count(), 2);
        drop(other);
        assert_eq!(handle.data().strong_count(), 1);
    }

    #[test]
    fn test_weak_handle() {
        let handle = fresh(7);
        let weak = handle.downgrade();

        assert!(weak.is_alive());
        assert!(weak.upgrade().is_some());
        assert_eq!(handle.data().strong_count(), 1);

        drop(handle);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_generation_bumps() {
        let handle = fresh(3);
        assert_eq!(handle.generation(), 0);
        handle.data().increment_generation();
        assert_eq!(handle.generation(), 1);
    }
}
