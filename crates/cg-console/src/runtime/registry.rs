use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::RpcFunction;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("RPC function id must not be empty")]
    EmptyId,

    #[error("RPC function already registered: {0}")]
    Duplicate(String),
}

/// Read-only map from function id to implementation.
///
/// Ids are stored lowercased. The registry is populated once through
/// [`RpcRegistryBuilder`] and never changes afterwards, so it can be shared
/// across request tasks without locking.
pub struct RpcRegistry {
    functions: HashMap<String, Arc<dyn RpcFunction>>,
}

impl RpcRegistry {
    pub fn builder() -> RpcRegistryBuilder {
        RpcRegistryBuilder::default()
    }

    /// Exact match on an already-normalised id.
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn RpcFunction>> {
        self.functions.get(id).cloned()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.functions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for RpcRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcRegistry")
            .field("functions", &self.ids())
            .finish()
    }
}

#[derive(Default)]
pub struct RpcRegistryBuilder {
    functions: HashMap<String, Arc<dyn RpcFunction>>,
}

impl RpcRegistryBuilder {
    pub fn register<F>(self, id: &str, function: F) -> Result<Self, RegistryError>
    where
        F: RpcFunction + 'static,
    {
        self.register_arc(id, Arc::new(function))
    }

    pub fn register_arc(
        mut self,
        id: &str,
        function: Arc<dyn RpcFunction>,
    ) -> Result<Self, RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::EmptyId);
        }

        let id = id.to_lowercase();
        if self.functions.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }

        debug!(rpc_id = %id, "Registered RPC function");
        self.functions.insert(id, function);
        Ok(self)
    }

    pub fn build(self) -> RpcRegistry {
        RpcRegistry {
            functions: self.functions,
        }
    }
}
