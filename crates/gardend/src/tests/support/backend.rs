//! Backend double that records created containers and can be told to fail.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::backend::{Backend, BackendError, Container, ContainerSpec, Handle, InMemoryBackend};

/// Wraps an [`InMemoryBackend`], recording every spec it was asked to create
/// and optionally failing creation with a fixed message.
#[derive(Debug, Default)]
pub struct FakeBackend {
    inner: InMemoryBackend,
    created: Mutex<HashMap<Handle, ContainerSpec>>,
    creation_error: Mutex<Option<String>>,
}

impl FakeBackend {
    /// Makes every subsequent `create` fail with `message`.
    pub fn fail_creation_with(&self, message: &str) {
        *self.creation_error.lock().expect("creation error lock") = Some(message.to_owned());
    }

    /// Spec recorded for `handle`, as the backend received it.
    #[must_use]
    pub fn created(&self, handle: &str) -> Option<ContainerSpec> {
        self.created
            .lock()
            .expect("created containers lock")
            .get(&Handle::from(handle))
            .cloned()
    }
}

impl Backend for FakeBackend {
    fn ping(&self) -> Result<(), BackendError> {
        self.inner.ping()
    }

    fn echo(&self, message: &str) -> String {
        self.inner.echo(message)
    }

    fn create(&self, spec: ContainerSpec) -> Result<Handle, BackendError> {
        if let Some(message) = self.creation_error.lock().expect("creation error lock").clone() {
            return Err(BackendError::new(message));
        }
        let recorded = spec.clone();
        let handle = self.inner.create(spec)?;
        self.created
            .lock()
            .expect("created containers lock")
            .insert(handle.clone(), recorded);
        Ok(handle)
    }

    fn destroy(&self, handle: &Handle) -> Result<(), BackendError> {
        self.inner.destroy(handle)
    }

    fn lookup(&self, handle: &Handle) -> Result<Container, BackendError> {
        self.inner.lookup(handle)
    }

    fn handles(&self) -> Result<Vec<Handle>, BackendError> {
        self.inner.handles()
    }
}
