//! UDP multicast feed transport.
//!
//! One wire frame per datagram. The feed is deliberately lossy: a dropped,
//! reordered, or duplicated datagram is recovered by the per-instrument
//! sequencing above, never by the transport.

use crate::error::TransportError;
use crate::traits::{FeedPublisher, FeedSubscriber};
use async_trait::async_trait;
use bytes::Bytes;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Configuration for the multicast feed.
#[derive(Debug, Clone)]
pub struct MulticastConfig {
    /// Multicast group address.
    pub group: Ipv4Addr,
    /// Multicast port.
    pub port: u16,
    /// Network interface to use.
    pub interface: Ipv4Addr,
    /// Multicast TTL for published datagrams.
    pub ttl: u32,
    /// Whether published datagrams loop back to local subscribers.
    pub loopback: bool,
}

impl Default for MulticastConfig {
    fn default() -> Self {
        Self {
            group: "239.10.1.1".parse().unwrap(),
            port: 14400,
            interface: Ipv4Addr::UNSPECIFIED,
            ttl: 1,
            loopback: true,
        }
    }
}

impl MulticastConfig {
    /// Returns the group socket address datagrams are sent to.
    #[must_use]
    pub fn group_addr(&self) -> SocketAddr {
        (self.group, self.port).into()
    }
}

/// Publishes feed frames to a multicast group.
pub struct MulticastPublisher {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl MulticastPublisher {
    /// Creates a publisher for the given group.
    ///
    /// # Errors
    /// Returns IO error if socket setup fails.
    pub async fn new(config: MulticastConfig) -> std::io::Result<Self> {
        let socket = UdpSocket::bind((config.interface, 0)).await?;
        socket.set_multicast_ttl_v4(config.ttl)?;
        socket.set_multicast_loop_v4(config.loopback)?;

        Ok(Self {
            socket,
            dest: config.group_addr(),
        })
    }
}

#[async_trait]
impl FeedPublisher for MulticastPublisher {
    async fn publish(&self, frame: &[u8]) -> Result<(), TransportError> {
        let sent = self.socket.send_to(frame, self.dest).await?;
        if sent != frame.len() {
            return Err(TransportError::multicast(format!(
                "short send: {} of {} bytes",
                sent,
                frame.len()
            )));
        }
        Ok(())
    }
}

/// Receives feed frames from a multicast group.
pub struct MulticastSubscriber {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl MulticastSubscriber {
    /// Joins the given group and starts receiving.
    ///
    /// # Errors
    /// Returns IO error if socket setup or the group join fails.
    pub async fn new(config: MulticastConfig) -> std::io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;
        socket.join_multicast_v4(config.group, config.interface)?;

        Ok(Self {
            socket,
            buf: vec![0u8; 64 * 1024],
        })
    }
}

#[async_trait]
impl FeedSubscriber for MulticastSubscriber {
    async fn next_frame(&mut self) -> Result<Bytes, TransportError> {
        let len = self.socket.recv(&mut self.buf).await?;
        Ok(Bytes::copy_from_slice(&self.buf[..len]))
    }
}
