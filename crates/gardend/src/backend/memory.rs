//! Process-local container registry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use super::{Backend, BackendError, Container, ContainerSpec, ContainerState, Handle};

const BACKEND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::backend");

/// Backend that records containers in memory without isolating anything.
///
/// Every call locks the registry for its whole duration, so concurrent
/// creates never lose entries and generated handles never collide with live
/// ones.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    registry: Mutex<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    containers: HashMap<Handle, Container>,
    next_id: u64,
}

impl Registry {
    fn generate_handle(&mut self) -> Handle {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros())
            .unwrap_or_default();
        loop {
            self.next_id = self.next_id.wrapping_add(1);
            let candidate = Handle::new(format!("{stamp:x}-{:x}", self.next_id));
            if !self.containers.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

impl InMemoryBackend {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the container registered under `handle`, if any.
    #[must_use]
    pub fn container(&self, handle: &Handle) -> Option<Container> {
        self.registry().containers.get(handle).cloned()
    }

    /// Number of live containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry().containers.len()
    }

    /// Returns `true` when no container is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry().containers.is_empty()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // A panic while holding the lock cannot leave a half-inserted entry.
        self.registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Backend for InMemoryBackend {
    fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn echo(&self, message: &str) -> String {
        message.to_owned()
    }

    fn create(&self, mut spec: ContainerSpec) -> Result<Handle, BackendError> {
        let mut registry = self.registry();
        let handle = if spec.handle.is_empty() {
            registry.generate_handle()
        } else if registry.containers.contains_key(&spec.handle) {
            return Err(BackendError::already_exists(&spec.handle));
        } else {
            spec.handle.clone()
        };
        spec.handle = handle.clone();

        let container = Container {
            handle: handle.clone(),
            spec,
            state: ContainerState::Active,
        };
        registry.containers.insert(handle.clone(), container);
        debug!(target: BACKEND_TARGET, %handle, "container registered");
        Ok(handle)
    }

    fn destroy(&self, handle: &Handle) -> Result<(), BackendError> {
        match self.registry().containers.remove(handle) {
            Some(_) => {
                debug!(target: BACKEND_TARGET, %handle, "container removed");
                Ok(())
            }
            None => Err(BackendError::not_found(handle)),
        }
    }

    fn lookup(&self, handle: &Handle) -> Result<Container, BackendError> {
        self.container(handle)
            .ok_or_else(|| BackendError::not_found(handle))
    }

    fn handles(&self) -> Result<Vec<Handle>, BackendError> {
        let mut handles: Vec<Handle> = self.registry().containers.keys().cloned().collect();
        handles.sort();
        Ok(handles)
    }
}
