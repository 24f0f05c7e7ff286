//! Process-wide configuration handle with atomic hot reload
//!
//! A live document is never mutated. A reload builds a fresh [`Resolver`]
//! through the full pipeline and swaps the shared reference; readers holding
//! the previous `Arc` keep a consistent view until they drop it.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{loader::ConfigLoader, resolver::Resolver, ConfigError};

pub struct ConfigHandle {
    current: RwLock<Arc<Resolver>>,
}

impl ConfigHandle {
    pub fn new(resolver: impl Into<Arc<Resolver>>) -> Self {
        Self {
            current: RwLock::new(resolver.into()),
        }
    }

    /// Snapshot of the current resolver
    pub fn current(&self) -> Arc<Resolver> {
        Arc::clone(&self.current.read())
    }

    /// Replace the resolver, returning the previous one
    pub fn swap(&self, resolver: impl Into<Arc<Resolver>>) -> Arc<Resolver> {
        let next = resolver.into();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&next));
        tracing::info!(
            environment = %next.environment(),
            previous = %previous.environment(),
            "Swapped configuration"
        );
        previous
    }

    /// Run `loader` and swap in the result
    ///
    /// On failure the current resolver stays in place.
    pub fn reload(&self, loader: &ConfigLoader) -> Result<Arc<Resolver>, ConfigError> {
        let loaded = loader.load()?;
        Ok(self.swap(loaded.resolver))
    }
}

impl std::fmt::Debug for ConfigHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("environment", &self.current().environment())
            .finish()
    }
}

static GLOBAL: OnceCell<ConfigHandle> = OnceCell::new();

/// Install `resolver` as the process-wide configuration
///
/// A second call swaps the resolver of the existing handle.
pub fn init_global(resolver: Resolver) -> &'static ConfigHandle {
    let resolver = Arc::new(resolver);
    let handle = GLOBAL.get_or_init(|| ConfigHandle::new(Arc::clone(&resolver)));
    if !Arc::ptr_eq(&handle.current(), &resolver) {
        handle.swap(resolver);
    }
    handle
}

/// The process-wide configuration, if [`init_global`] has run
pub fn global() -> Option<&'static ConfigHandle> {
    GLOBAL.get()
}
