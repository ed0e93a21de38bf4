//! Socket seam between a connection and the wire.
//!
//! A connection only ever sees text frames. [`ws`] provides the WebSocket
//! implementation; tests substitute in-memory halves.

pub mod ws;

use async_trait::async_trait;

use crate::Result;

/// Writing half of a socket.
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame.
    async fn send(&mut self, frame: String) -> Result<()>;

    /// Close the socket. Closing an already closed socket is not an error.
    async fn close(&mut self) -> Result<()>;
}

/// Reading half of a socket.
#[async_trait]
pub trait FrameSource: Send {
    /// Next text frame.
    ///
    /// `Ok(None)` signals a graceful close; an abnormal close or a transport
    /// failure is an `Err`.
    async fn next_frame(&mut self) -> Result<Option<String>>;
}
