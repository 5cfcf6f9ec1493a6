//! Connection handler that serves framed requests until the client leaves.
//!
//! Each connection is handled sequentially: read one frame, dispatch it,
//! write one response, repeat. A framing error leaves the stream position
//! unknown, so the connection is dropped rather than resynchronised.

use std::os::unix::net::UnixStream;

use tracing::{debug, warn};

use garden_protocol::FrameCodec;

use crate::transport::ConnectionHandler;

use super::router::{DISPATCH_TARGET, Dispatcher};

/// Connection handler that decodes requests and routes them to a [`Dispatcher`].
pub struct DispatchConnectionHandler {
    dispatcher: Dispatcher,
    codec: FrameCodec,
}

impl DispatchConnectionHandler {
    /// Creates a handler enforcing `max_frame_bytes` on incoming frames.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, max_frame_bytes: u32) -> Self {
        Self {
            dispatcher,
            codec: FrameCodec::new(max_frame_bytes),
        }
    }

    fn serve(&self, stream: &mut UnixStream) {
        loop {
            let request = match self.codec.read_request(stream) {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, "client disconnected");
                    return;
                }
                Err(error) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        %error,
                        "closing connection after framing error"
                    );
                    return;
                }
            };

            let response = self.dispatcher.dispatch(request);
            if let Err(error) = self.codec.write_response(stream, &response) {
                warn!(target: DISPATCH_TARGET, %error, "failed to write response");
                return;
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, mut stream: UnixStream) {
        self.serve(&mut stream);
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};

    use rstest::{fixture, rstest};

    use garden_protocol::messages::{EchoRequest, EchoResponse, PingRequest, PingResponse};
    use garden_protocol::{MessageType, Request, Response, encode_frame};

    use super::*;
    use crate::backend::InMemoryBackend;

    /// Handler serving one end of a socket pair on a background thread.
    struct HandlerTestHarness {
        client: UnixStream,
        server: JoinHandle<()>,
    }

    impl HandlerTestHarness {
        fn send(&mut self, request: impl Into<Request>) -> Response {
            let codec = FrameCodec::default();
            codec
                .write_request(&mut self.client, &request.into())
                .expect("write request");
            codec
                .read_response(&mut self.client)
                .expect("read response")
                .expect("response present")
        }

        fn finish(self) {
            drop(self.client);
            self.server.join().expect("join handler thread");
        }
    }

    #[fixture]
    fn harness() -> HandlerTestHarness {
        let (client, server_stream) = UnixStream::pair().expect("socket pair");
        let dispatcher = Dispatcher::new(Arc::new(InMemoryBackend::new()));
        let handler = DispatchConnectionHandler::new(dispatcher, 1024);
        let server = thread::spawn(move || handler.handle(server_stream));
        HandlerTestHarness { client, server }
    }

    #[rstest]
    fn serves_requests_in_order_on_one_connection(mut harness: HandlerTestHarness) {
        assert_eq!(harness.send(PingRequest {}), PingResponse {}.into());
        let echoed = harness.send(EchoRequest {
            message: Some("second".to_owned()),
        });
        assert_eq!(
            echoed,
            EchoResponse {
                message: Some("second".to_owned())
            }
            .into()
        );
        harness.finish();
    }

    #[rstest]
    fn framing_errors_close_the_connection(mut harness: HandlerTestHarness) {
        let bogus = encode_frame(MessageType::Error, b"").expect("encode frame");
        harness.client.write_all(&bogus).expect("write bogus frame");

        let mut remaining = Vec::new();
        harness
            .client
            .read_to_end(&mut remaining)
            .expect("read until close");
        assert!(remaining.is_empty(), "no response expected after framing error");
        harness.finish();
    }

    #[rstest]
    fn oversized_frames_close_the_connection(mut harness: HandlerTestHarness) {
        harness
            .client
            .write_all(&4096_u32.to_be_bytes())
            .expect("write oversized prefix");

        let mut remaining = Vec::new();
        harness
            .client
            .read_to_end(&mut remaining)
            .expect("read until close");
        assert!(remaining.is_empty());
        harness.finish();
    }
}
