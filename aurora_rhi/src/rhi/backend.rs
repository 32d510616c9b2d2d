/// Backend trait and runtime backend registry

use std::any::Any;
use rustc_hash::FxHashMap;

use crate::engine_error;
use crate::error::{Error, Result};
use crate::rhi::{Device, DeviceConfig, RenderApi, WindowTarget};

// ============================================================================
// Backend trait
// ============================================================================

/// Entry point of one graphics API
///
/// Building a backend never touches the GPU; the native work starts in
/// [`Backend::create_device`].
pub trait Backend {
    fn render_api(&self) -> RenderApi;

    /// Human-readable backend name (used in logs)
    fn name(&self) -> &'static str;

    /// Enumerate adapters, pick the primary GPU and create the logical device
    ///
    /// # Errors
    ///
    /// Any failing step is returned. No device value exists on failure.
    fn create_device(&self, config: &DeviceConfig, window: &WindowTarget) -> Result<Box<dyn Device>>;

    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Registry
// ============================================================================

/// Backend factory function type
type BackendFactory = Box<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

/// Maps each [`RenderApi`] to the constructor of its backend
///
/// Built at the composition root: every backend crate exposes a `register`
/// function that adds its factories.
///
/// # Example
///
/// ```no_run
/// use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi};
///
/// let registry = BackendRegistry::new();
/// // aurora_rhi_vulkan::register(&mut registry);
/// assert!(registry.create_backend(RenderApi::Vulkan).is_err());
/// ```
#[derive(Default)]
pub struct BackendRegistry {
    factories: FxHashMap<RenderApi, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory of `api`
    pub fn register<F>(&mut self, api: RenderApi, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.factories.insert(api, Box::new(factory));
    }

    pub fn is_registered(&self, api: RenderApi) -> bool {
        api != RenderApi::Unknown && self.factories.contains_key(&api)
    }

    /// Registered APIs in declaration order
    pub fn registered_apis(&self) -> Vec<RenderApi> {
        let mut apis: Vec<RenderApi> = self.factories.keys().copied().collect();
        apis.sort();
        apis
    }

    /// Build the backend of `api`
    ///
    /// # Errors
    ///
    /// `Error::UnsupportedBackend` (logged) for `Unknown`, any API without a
    /// registered factory, or a factory that builds another API's backend.
    pub fn create_backend(&self, api: RenderApi) -> Result<Box<dyn Backend>> {
        let factory = match self.factories.get(&api) {
            Some(factory) if api != RenderApi::Unknown => factory,
            _ => {
                engine_error!("aurora::Renderer", "No backend available for render API '{}'", api);
                return Err(Error::UnsupportedBackend(api.to_string()));
            }
        };
        let backend = factory();
        let built = backend.render_api();
        if built != api {
            engine_error!("aurora::Renderer", "Factory for '{}' built a '{}' backend", api, built);
            return Err(Error::UnsupportedBackend(api.to_string()));
        }
        Ok(backend)
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
