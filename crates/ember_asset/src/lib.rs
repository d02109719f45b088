//! # ember_asset - Asset Units
//!
//! Asset loading with:
//! - Pluggable loaders registered per file extension
//! - Reference-counted handles; unreferenced assets can be swept
//! - Reload support that bumps handle generations
//! - Load/unload/reload events drained once per frame
//!
//! Assets live on the main thread (loading happens inline during
//! `process()`), so asset types are not required to be `Send`; rasterizer
//! faces and other thread-bound resources can be stored directly.
//!
//! ## Example
//!
//! ```ignore
//! use ember_asset::prelude::*;
//!
//! let server = AssetServer::default_config();
//! server.register_loader(FontLoader::new());
//!
//! let handle: Handle<Font> = server.load("fonts/main.font");
//!
//! // Each frame:
//! server.process(|path| std::fs::read(path).ok());
//! for event in server.drain_events() { /* react */ }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

pub mod handle;
pub mod loader;
pub mod server;
pub mod storage;

pub use handle::{AssetId, Handle, HandleData, LoadState, WeakHandle};
pub use loader::{AssetLoader, ErasedLoader, LoadContext, LoadError, LoadResult, LoaderRegistry};
pub use server::{AssetEvent, AssetMeta, AssetPath, AssetServer, AssetServerConfig};
pub use storage::AssetStorage;

#[cfg(feature = "hot-reload")]
pub use server::FileWatcher;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::handle::{AssetId, Handle, LoadState, WeakHandle};
    pub use crate::loader::{AssetLoader, LoadContext, LoadError, LoadResult};
    pub use crate::server::{AssetEvent, AssetServer, AssetServerConfig};
    pub use crate::storage::AssetStorage;
}
