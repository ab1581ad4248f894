//! Backend registry keyed by variant

use super::profile::{BackendProfile, BackendVariant};
use super::traits::SearchBackend;
use crate::config::BackendSettings;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of the backends available to a search service
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<BackendVariant, Arc<dyn SearchBackend>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry by handing each variant's profile to `factory`.
    /// Variants the factory returns `None` for are left unregistered.
    pub fn load<F>(settings: &BackendSettings, mut factory: F) -> Self
    where
        F: FnMut(BackendProfile) -> Option<Arc<dyn SearchBackend>>,
    {
        let mut registry = Self::new();

        for variant in BackendVariant::ALL {
            match factory(variant.profile(settings)) {
                Some(backend) => {
                    debug!("Loaded backend {} for {}", backend.name(), variant);
                    registry.register(variant, backend);
                }
                None => debug!("No backend for {}", variant),
            }
        }

        info!("Loaded {} backends", registry.len());
        registry
    }

    /// Register a backend for a variant, replacing any previous one
    pub fn register(&mut self, variant: BackendVariant, backend: Arc<dyn SearchBackend>) {
        self.backends.insert(variant, backend);
    }

    /// Builder form of [`BackendRegistry::register`]
    pub fn with(mut self, variant: BackendVariant, backend: Arc<dyn SearchBackend>) -> Self {
        self.register(variant, backend);
        self
    }

    /// Register one backend for every variant
    pub fn with_all(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        for variant in BackendVariant::ALL {
            self.register(variant, backend.clone());
        }
        self
    }

    /// Get the backend for a variant
    pub fn get(&self, variant: BackendVariant) -> Option<&Arc<dyn SearchBackend>> {
        self.backends.get(&variant)
    }

    /// Check if a variant has a backend
    pub fn contains(&self, variant: BackendVariant) -> bool {
        self.backends.contains_key(&variant)
    }

    /// Registered variants
    pub fn variants(&self) -> Vec<BackendVariant> {
        BackendVariant::ALL
            .into_iter()
            .filter(|v| self.contains(*v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for variant in self.variants() {
            if let Some(backend) = self.get(variant) {
                map.entry(&variant, &backend.name());
            }
        }
        map.finish()
    }
}
