//! Dynamic config providers.
//!
//! A provider is the code half of a section's configuration: it runs at
//! resolution time, receives the concrete [`Instance`] being resolved, and
//! returns a value that is merged into the section's options when it is an
//! object.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ProviderError;
use crate::hierarchy::Instance;

/// Computes extra configuration for one section at one hierarchy level.
pub trait ConfigProvider: Send + Sync {
    /// Produce the configuration contribution for `instance`.
    fn provide(&self, instance: &Instance) -> Result<Value, ProviderError>;
}

impl<F> ConfigProvider for F
where
    F: Fn(&Instance) -> Result<Value, ProviderError> + Send + Sync,
{
    fn provide(&self, instance: &Instance) -> Result<Value, ProviderError> {
        self(instance)
    }
}

/// Shared handle to a provider.
#[derive(Clone)]
pub struct Provider(Arc<dyn ConfigProvider>);

impl Provider {
    /// Wrap a closure as a provider.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Instance) -> Result<Value, ProviderError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap an existing provider implementation.
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self(provider)
    }

    /// Invoke the provider.
    pub fn call(&self, instance: &Instance) -> Result<Value, ProviderError> {
        self.0.provide(instance)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Provider(..)")
    }
}
