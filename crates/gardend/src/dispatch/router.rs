//! Maps decoded requests onto backend operations.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use garden_protocol::messages::{self, bind_mount};
use garden_protocol::{Request, Response};

use crate::backend::{Backend, BindMount, BindMountMode, Container, ContainerSpec, Handle};

use super::errors::DispatchError;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes each request to the backend and always produces one response.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
}

impl Dispatcher {
    /// Builds a dispatcher over a shared backend.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Executes `request` and returns its response or an error envelope.
    #[must_use]
    pub fn dispatch(&self, request: Request) -> Response {
        let message_type = request.message_type();
        debug!(target: DISPATCH_TARGET, request = %message_type, "dispatching request");
        match self.route(request) {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    request = %message_type,
                    %error,
                    "request failed"
                );
                Response::error(error.client_message())
            }
        }
    }

    fn route(&self, request: Request) -> Result<Response, DispatchError> {
        match request {
            Request::Ping(_) => {
                self.backend.ping()?;
                Ok(messages::PingResponse {}.into())
            }
            Request::Echo(echo) => {
                let message = self.backend.echo(echo.message.as_deref().unwrap_or_default());
                Ok(messages::EchoResponse {
                    message: Some(message),
                }
                .into())
            }
            Request::Create(create) => {
                let handle = self.backend.create(container_spec(create)?)?;
                Ok(messages::CreateResponse {
                    handle: Some(handle.into_inner()),
                }
                .into())
            }
            Request::Destroy(destroy) => {
                self.backend.destroy(&required_handle(destroy.handle)?)?;
                Ok(messages::DestroyResponse {}.into())
            }
            Request::Info(info) => {
                let container = self.backend.lookup(&required_handle(info.handle)?)?;
                Ok(info_response(&container).into())
            }
            Request::List(_) => {
                let handles = self.backend.handles()?;
                Ok(messages::ListResponse {
                    handles: handles.into_iter().map(Handle::into_inner).collect(),
                }
                .into())
            }
        }
    }
}

fn required_handle(handle: Option<String>) -> Result<Handle, DispatchError> {
    match handle {
        Some(handle) if !handle.is_empty() => Ok(Handle::from(handle)),
        _ => Err(DispatchError::validation("handle is required")),
    }
}

fn container_spec(request: messages::CreateRequest) -> Result<ContainerSpec, DispatchError> {
    let bind_mounts = request
        .bind_mounts
        .into_iter()
        .enumerate()
        .map(|(index, mount)| bind_mount_from_wire(index, mount))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ContainerSpec {
        handle: Handle::from(request.handle.unwrap_or_default()),
        grace_time: Duration::from_secs(u64::from(request.grace_time.unwrap_or_default())),
        network: request.network.unwrap_or_default(),
        root_fs_path: request.rootfs.unwrap_or_default(),
        bind_mounts,
    })
}

fn bind_mount_from_wire(
    index: usize,
    mount: messages::BindMount,
) -> Result<BindMount, DispatchError> {
    let mode = match mount.mode.map(bind_mount::Mode::try_from) {
        Some(Ok(bind_mount::Mode::Ro)) => BindMountMode::ReadOnly,
        Some(Ok(bind_mount::Mode::Rw)) => BindMountMode::ReadWrite,
        Some(Err(_)) => {
            return Err(DispatchError::validation(format!(
                "bind mount {index} has an unknown mode"
            )));
        }
        None => {
            return Err(DispatchError::validation(format!(
                "bind mount {index} has no mode"
            )));
        }
    };
    let src_path = non_empty(mount.src_path, index, "source")?;
    let dst_path = non_empty(mount.dst_path, index, "destination")?;
    Ok(BindMount {
        src_path,
        dst_path,
        mode,
    })
}

fn non_empty(path: Option<String>, index: usize, which: &str) -> Result<String, DispatchError> {
    match path {
        Some(path) if !path.is_empty() => Ok(path),
        _ => Err(DispatchError::validation(format!(
            "bind mount {index} has no {which} path"
        ))),
    }
}

fn bind_mount_to_wire(mount: &BindMount) -> messages::BindMount {
    let mode = match mount.mode {
        BindMountMode::ReadOnly => bind_mount::Mode::Ro,
        BindMountMode::ReadWrite => bind_mount::Mode::Rw,
    };
    messages::BindMount {
        src_path: Some(mount.src_path.clone()),
        dst_path: Some(mount.dst_path.clone()),
        mode: Some(mode as i32),
    }
}

fn info_response(container: &Container) -> messages::InfoResponse {
    let spec = &container.spec;
    messages::InfoResponse {
        state: Some(container.state.as_str().to_owned()),
        grace_time: Some(u32::try_from(spec.grace_time.as_secs()).unwrap_or(u32::MAX)),
        network: Some(spec.network.clone()),
        rootfs: Some(spec.root_fs_path.clone()),
        bind_mounts: spec.bind_mounts.iter().map(bind_mount_to_wire).collect(),
    }
}
