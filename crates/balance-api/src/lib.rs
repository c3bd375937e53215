//! Async clients for load-balancer appliance configuration APIs.
//!
//! - [`a10`]: A10 ACOS axAPI v2.1 (session id, `slb.*` methods), read/write.
//! - [`f5`]: F5 BIG-IP iControl REST (Basic auth), read-only LTM inventory.
//!
//! Both share [`TransportConfig`] for TLS and timeouts, and report failures
//! through [`Error`].

pub mod a10;
pub mod error;
pub mod f5;
pub mod transport;

pub use a10::A10Client;
pub use error::Error;
pub use f5::F5Client;
pub use transport::{TlsMode, TransportConfig};
