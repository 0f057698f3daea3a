//! Named-options pipeline modelled on the host's options system.
//!
//! Building an options instance for a scheme runs every configure stage in
//! registration order, then every post-configure stage in registration order.
//! [`OptionsMonitor`] caches the result per scheme name until it is evicted.

use std::sync::Arc;

use tracing::debug;

use crate::cache::OptionsCache;

/// Configures options that are not named (e.g. the scheme table).
pub trait ConfigureOptions<T>: Send + Sync {
    fn configure(&self, options: &mut T);
}

/// Configures the options instance for scheme `name`.
///
/// One pipeline serves every scheme, so implementations must ignore names
/// they do not own.
pub trait ConfigureNamedOptions<T>: Send + Sync {
    fn configure_named(&self, name: &str, options: &mut T);
}

/// Runs after all configure stages for scheme `name`.
pub trait PostConfigureOptions<T>: Send + Sync {
    fn post_configure(&self, name: &str, options: &mut T);
}

/// Ordered configure and post-configure stages for one options type.
pub struct OptionsPipeline<T> {
    configure: Vec<Arc<dyn ConfigureNamedOptions<T>>>,
    post_configure: Vec<Arc<dyn PostConfigureOptions<T>>>,
}

impl<T: Default> OptionsPipeline<T> {
    pub fn new() -> Self {
        Self {
            configure: Vec::new(),
            post_configure: Vec::new(),
        }
    }

    /// Append a configure stage.
    pub fn configure(mut self, stage: Arc<dyn ConfigureNamedOptions<T>>) -> Self {
        self.configure.push(stage);
        self
    }

    /// Append a post-configure stage.
    pub fn post_configure(mut self, stage: Arc<dyn PostConfigureOptions<T>>) -> Self {
        self.post_configure.push(stage);
        self
    }

    /// Build a fresh options instance for `name`, starting from `T::default()`.
    pub fn create(&self, name: &str) -> T {
        let mut options = T::default();
        for stage in &self.configure {
            stage.configure_named(name, &mut options);
        }
        for stage in &self.post_configure {
            stage.post_configure(name, &mut options);
        }
        options
    }
}

impl<T: Default> Default for OptionsPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out cached options per scheme, rebuilding after eviction.
pub struct OptionsMonitor<T> {
    pipeline: Arc<OptionsPipeline<T>>,
    cache: OptionsCache<T>,
}

impl<T> Clone for OptionsMonitor<T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<T: Default> OptionsMonitor<T> {
    pub fn new(pipeline: OptionsPipeline<T>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            cache: OptionsCache::new(),
        }
    }

    /// Options for `name`, built on first access after creation or eviction.
    pub fn get(&self, name: &str) -> Arc<T> {
        self.cache.get_or_add(name, || {
            debug!(scheme = %name, "Building options");
            self.pipeline.create(name)
        })
    }

    /// The cache backing this monitor. Evict through it to force a rebuild.
    pub fn cache(&self) -> &OptionsCache<T> {
        &self.cache
    }
}
