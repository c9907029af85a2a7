pub mod loopback_transport;
pub mod security;

pub use loopback_transport::{LoopbackTransport, LoopbackTransportConfig};
pub use security::{load_or_create_signer, EcdsaSigner, TrustStore};
