//! Provider factory: maps a [`ProviderId`] to its constructor and
//! holds the priority order used for default selection and failover
//!
//! Every orchestration call gets a freshly constructed provider
//! instance, so nothing is shared across calls except process-wide
//! credentials read at construction time.

use std::collections::HashMap;

use crate::providers::{ChatProvider, ClaudeProvider, DeepSeekProvider, OpenAiProvider};
use crate::types::{LlmError, ProviderId, Result};

type ProviderCtor = Box<dyn Fn() -> Box<dyn ChatProvider> + Send + Sync>;

/// Static provider registry. Registration happens at wiring time, not
/// in the hot path.
pub struct ProviderFactory {
    constructors: HashMap<ProviderId, ProviderCtor>,
    priority: Vec<ProviderId>,
}

impl ProviderFactory {
    /// Empty factory; callers register constructors and a priority
    /// list themselves (tests wire stub providers this way)
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
            priority: Vec::new(),
        }
    }

    pub fn register<F>(mut self, id: ProviderId, ctor: F) -> Self
    where
        F: Fn() -> Box<dyn ChatProvider> + Send + Sync + 'static,
    {
        self.constructors.insert(id, Box::new(ctor));
        self
    }

    pub fn with_priority(mut self, priority: Vec<ProviderId>) -> Self {
        self.priority = priority;
        self
    }

    pub fn priority(&self) -> &[ProviderId] {
        &self.priority
    }

    /// Construct a provider.
    ///
    /// With an explicit id, the matching implementation is constructed
    /// unconditionally; asking for an unregistered id is a
    /// configuration bug and fails with `UnsupportedProvider`. Without
    /// one, the priority list is scanned in order and the first
    /// available provider wins.
    pub async fn get_service(&self, id: Option<ProviderId>) -> Result<Box<dyn ChatProvider>> {
        if let Some(id) = id {
            let ctor = self
                .constructors
                .get(&id)
                .ok_or_else(|| LlmError::UnsupportedProvider {
                    provider: id.to_string(),
                })?;
            return Ok(ctor());
        }

        for candidate in &self.priority {
            let Some(ctor) = self.constructors.get(candidate) else {
                tracing::warn!(provider = %candidate, "priority entry has no registered implementation");
                continue;
            };
            let service = ctor();
            if service.is_available().await {
                return Ok(service);
            }
        }

        Err(LlmError::NoAvailableProvider)
    }
}

impl Default for ProviderFactory {
    /// All real backends, credentials read from the environment
    fn default() -> Self {
        Self::empty()
            .register(ProviderId::DeepSeek, || Box::new(DeepSeekProvider::from_env()))
            .register(ProviderId::OpenAi, || Box::new(OpenAiProvider::from_env()))
            .register(ProviderId::Claude, || Box::new(ClaudeProvider::from_env()))
            .with_priority(ProviderId::priority().to_vec())
    }
}
