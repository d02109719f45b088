//! # ember_core - Ember Engine Core
//!
//! Zero-dependency core primitives shared by every other crate:
//! - Generational identifiers for runtime resources
//! - The core error type
//! - A service registry replacing global manager singletons
//!
//! ## Lifecycle
//! A [`Services`](services::Services) registry is created once at application
//! startup, populated with the long-lived service objects (asset server,
//! event bus, id generators), passed by reference to whatever needs them and
//! dropped at shutdown. Nothing in this workspace reaches for global state.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

pub mod error;
pub mod id;
pub mod services;

pub use error::*;
pub use id::*;
pub use services::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result, ServiceError};
    pub use crate::id::{Id, IdGenerator};
    pub use crate::services::Services;
}
