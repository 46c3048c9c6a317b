// src/IPC/rpc.rs

use super::MessageBus;
use crate::error::{BridgeError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A named procedure: raw argument bytes in, raw result bytes out.
pub type Procedure = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Synchronous procedure router.
///
/// Calls are direct function calls; nothing goes through the bus's channel
/// dispatch. A router may optionally hold a bus so that procedure results
/// can answer pending bus requests (see [`RpcRouter::reply`]).
pub struct RpcRouter {
    pub(crate) procedures: RwLock<HashMap<String, Procedure>>,
    pub(crate) bus: Option<Arc<MessageBus>>,
}

impl Default for RpcRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcRouter {
    /// A standalone router with no bus attached.
    pub fn new() -> Self {
        Self {
            procedures: RwLock::new(HashMap::new()),
            bus: None,
        }
    }

    pub fn with_bus(bus: Arc<MessageBus>) -> Self {
        Self {
            procedures: RwLock::new(HashMap::new()),
            bus: Some(bus),
        }
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        let name = name.into();
        let replaced = self
            .procedures
            .write()
            .insert(name.clone(), Arc::new(handler))
            .is_some();
        debug!(procedure = %name, replaced, "Procedure registered");
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.procedures.write().remove(name).is_some()
    }

    /// Invoke `name` with `args` and return its result.
    ///
    /// The procedure runs without the table lock held, so it may itself
    /// call or register procedures on this router.
    pub fn call(&self, name: &str, args: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let procedure = self.procedures.read().get(name).cloned();
        match procedure {
            Some(procedure) => Ok(procedure(args.as_ref())),
            None => {
                warn!(procedure = name, "Call to unregistered procedure");
                Err(BridgeError::ProcedureNotFound(name.to_string()))
            }
        }
    }

    /// Run `name` with `args` and answer the pending bus request `id` with
    /// the result. Returns whether a pending request was answered.
    pub fn reply(&self, id: u64, name: &str, args: impl AsRef<[u8]>) -> Result<bool> {
        let bus = self.bus.as_ref().ok_or(BridgeError::RouterDetached)?;
        let result = self.call(name, args)?;
        Ok(bus.respond(id, result))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.read().contains_key(name)
    }

    /// Number of distinct procedure names.
    pub fn len(&self) -> usize {
        self.procedures.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn procedures(&self) -> Vec<String> {
        let mut names: Vec<String> = self.procedures.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn bus(&self) -> Option<&Arc<MessageBus>> {
        self.bus.as_ref()
    }
}
