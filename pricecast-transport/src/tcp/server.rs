//! TCP server side of the request path.

use super::framing::WireFrameCodec;
use crate::error::TransportError;
use crate::traits::{RequestConnection, RequestListener};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

/// Configuration for the TCP request server.
#[derive(Debug, Clone)]
pub struct TcpServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Maximum frame size in bytes.
    pub max_frame_size: usize,
    /// Enable TCP_NODELAY.
    pub tcp_nodelay: bool,
}

impl Default for TcpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:14500".parse().unwrap(),
            max_frame_size: 64 * 1024,
            tcp_nodelay: true,
        }
    }
}

impl TcpServerConfig {
    /// Creates a new server config with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

/// TCP listener for snapshot and batch requests.
pub struct TcpRequestServer {
    listener: TcpListener,
    config: Arc<TcpServerConfig>,
}

impl TcpRequestServer {
    /// Binds to the specified address and creates a new server.
    ///
    /// # Errors
    /// Returns IO error if binding fails.
    pub async fn bind(config: TcpServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

#[async_trait]
impl RequestListener for TcpRequestServer {
    type Conn = TcpConnection;

    async fn accept(&mut self) -> Result<TcpConnection, TransportError> {
        let (stream, addr) = self.listener.accept().await?;
        stream.set_nodelay(self.config.tcp_nodelay)?;

        Ok(TcpConnection {
            framed: Framed::new(stream, WireFrameCodec::new(self.config.max_frame_size)),
            peer_addr: addr,
        })
    }
}

/// A framed TCP connection to one requester.
pub struct TcpConnection {
    framed: Framed<TcpStream, WireFrameCodec>,
    peer_addr: SocketAddr,
}

impl TcpConnection {
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
impl RequestConnection for TcpConnection {
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
