//! TCP client side of the request path.

use super::framing::WireFrameCodec;
use crate::error::TransportError;
use crate::traits::RequestConnection;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

/// Configuration for the TCP request client.
#[derive(Debug, Clone)]
pub struct TcpClientConfig {
    /// Server address to connect to.
    pub server_addr: SocketAddr,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum frame size in bytes.
    pub max_frame_size: usize,
    /// Enable TCP_NODELAY.
    pub tcp_nodelay: bool,
}

impl Default for TcpClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:14500".parse().unwrap(),
            connect_timeout: Duration::from_secs(5),
            max_frame_size: 64 * 1024,
            tcp_nodelay: true,
        }
    }
}

impl TcpClientConfig {
    /// Creates a new client config with the specified server address.
    #[must_use]
    pub fn new(server_addr: SocketAddr) -> Self {
        Self {
            server_addr,
            ..Default::default()
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

/// TCP connection to the request server.
pub struct TcpRequestClient {
    framed: Framed<TcpStream, WireFrameCodec>,
    peer_addr: SocketAddr,
}

impl TcpRequestClient {
    /// Connects to a server with the given configuration.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectTimeout`] if the connection did not
    /// come up in time, or the underlying IO error.
    pub async fn connect(config: TcpClientConfig) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect(config.server_addr),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout)?
        .map_err(TransportError::Io)?;

        stream.set_nodelay(config.tcp_nodelay)?;

        let peer_addr = stream.peer_addr()?;
        let framed = Framed::new(stream, WireFrameCodec::new(config.max_frame_size));

        Ok(Self { framed, peer_addr })
    }

    /// Returns the peer address.
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Closes the connection.
    pub async fn close(mut self) -> Result<(), TransportError> {
        SinkExt::<&[u8]>::close(&mut self.framed).await
    }
}

#[async_trait]
impl RequestConnection for TcpRequestClient {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.framed.send(frame).await
    }

    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError> {
        match self.framed.next().await {
            Some(Ok(frame)) => Ok(Some(frame.freeze())),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}
