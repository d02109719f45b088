//! Asset loaders - pluggable per-extension decoding
//!
//! A loader turns raw file bytes into a usable asset. Composite assets (a
//! font description referencing face files and sprite sheets) pull their
//! secondary files through the context's dependency reader and record the
//! paths, so a change to any of them can re-trigger the owning asset's
//! reload.

use crate::handle::AssetId;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};

/// Error during asset loading
#[derive(Debug, Clone)]
pub enum LoadError {
    /// Asset or dependency file not found
    NotFound(String),
    /// IO error
    IoError(String),
    /// Parse/decode error
    ParseError(String),
    /// No loader registered for the extension
    UnsupportedFormat(String),
    /// Custom error
    Custom(String),
}

impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Asset not found: {}", path),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported format: {}", ext),
            Self::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

/// Result type for asset loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Reader used by loaders to pull secondary files (face data, sprite sheets)
pub type DependencyReader<'a> = &'a dyn Fn(&str) -> Option<Vec<u8>>;

/// Context provided to loaders during loading
pub struct LoadContext<'a> {
    /// Path of the asset being loaded
    pub path: &'a str,
    /// Raw asset data
    pub data: &'a [u8],
    /// Asset ID being loaded
    pub id: AssetId,
    /// Paths of secondary files this asset was built from
    pub dependencies: Vec<String>,
    reader: Option<DependencyReader<'a>>,
}

impl<'a> LoadContext<'a> {
    /// Create a new load context
    pub fn new(path: &'a str, data: &'a [u8], id: AssetId) -> Self {
        Self {
            path,
            data,
            id,
            dependencies: Vec::new(),
            reader: None,
        }
    }

    /// Attach a dependency reader
    pub fn with_reader(mut self, reader: DependencyReader<'a>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Get file extension of the primary path
    pub fn extension(&self) -> Option<&str> {
        self.path.rsplit('.').next()
    }

    /// Read the primary data as UTF-8
    pub fn read_string(&self) -> LoadResult<&str> {
        core::str::from_utf8(self.data)
            .map_err(|e| LoadError::ParseError(alloc::format!("Invalid UTF-8: {}", e)))
    }

    /// Read a secondary file and record it as a dependency
    pub fn read_dependency(&mut self, path: &str) -> LoadResult<Vec<u8>> {
        let reader = self
            .reader
            .ok_or_else(|| LoadError::IoError("No dependency reader attached".to_string()))?;
        let data = reader(path).ok_or_else(|| LoadError::NotFound(path.to_string()))?;
        if !self.dependencies.iter().any(|d| d == path) {
            self.dependencies.push(path.to_string());
        }
        Ok(data)
    }
}

/// Trait for asset loaders
pub trait AssetLoader {
    /// Asset type this loader produces
    type Asset: 'static;

    /// File extensions this loader handles
    fn extensions(&self) -> &[&str];

    /// Load an asset from raw data
    fn load(&self, ctx: &mut LoadContext) -> LoadResult<Self::Asset>;

    /// Get the type ID of the asset
    fn asset_type_id(&self) -> TypeId {
        TypeId::of::<Self::Asset>()
    }
}

/// Type-erased asset loader
pub trait ErasedLoader {
    /// File extensions this loader handles
    fn extensions(&self) -> &[&str];

    /// Load an asset into a boxed Any
    fn load_erased(&self, ctx: &mut LoadContext) -> LoadResult<Box<dyn Any>>;

    /// Get the asset type ID
    fn asset_type_id(&self) -> TypeId;
}

impl<L: AssetLoader> ErasedLoader for L {
    fn extensions(&self) -> &[&str] {
        AssetLoader::extensions(self)
    }

    fn load_erased(&self, ctx: &mut LoadContext) -> LoadResult<Box<dyn Any>> {
        self.load(ctx).map(|asset| Box::new(asset) as Box<dyn Any>)
    }

    fn asset_type_id(&self) -> TypeId {
        AssetLoader::asset_type_id(self)
    }
}

/// Registry of asset loaders, one per extension
///
/// Registering a second loader for an extension replaces the first; each
/// format has exactly one owner.
pub struct LoaderRegistry {
    by_extension: BTreeMap<String, usize>,
    loaders: Vec<Box<dyn ErasedLoader>>,
}

impl LoaderRegistry {
    /// Create a new loader registry
    pub fn new() -> Self {
        Self {
            by_extension: BTreeMap::new(),
            loaders: Vec::new(),
        }
    }

    /// Register a loader
    pub fn register<L: AssetLoader + 'static>(&mut self, loader: L) {
        let idx = self.loaders.len();
        let boxed: Box<dyn ErasedLoader> = Box::new(loader);
        for &ext in boxed.extensions() {
            self.by_extension.insert(ext.to_lowercase(), idx);
        }
        self.loaders.push(boxed);
    }

    /// Get the loader for an extension
    pub fn loader_for_extension(&self, ext: &str) -> Option<&dyn ErasedLoader> {
        let idx = *self.by_extension.get(&ext.to_lowercase())?;
        self.loaders.get(idx).map(|b| b.as_ref())
    }

    /// Load an asset using the loader registered for its extension
    pub fn load(&self, ctx: &mut LoadContext) -> LoadResult<Box<dyn Any>> {
        let ext = ctx
            .extension()
            .ok_or_else(|| LoadError::UnsupportedFormat("no file extension".to_string()))?
            .to_lowercase();

        let loader = self
            .loader_for_extension(&ext)
            .ok_or(LoadError::UnsupportedFormat(ext))?;

        loader.load_erased(ctx)
    }

    /// Check if an extension is supported
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_lowercase())
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
