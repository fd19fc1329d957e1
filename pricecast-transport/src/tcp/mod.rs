//! TCP transport for the request/response path.

pub mod client;
pub mod framing;
pub mod server;

pub use client::{TcpClientConfig, TcpRequestClient};
pub use framing::WireFrameCodec;
pub use server::{TcpConnection, TcpRequestServer, TcpServerConfig};
