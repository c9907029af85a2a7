pub mod security;
pub mod transport;

pub use security::{Signer, Verifier};
pub use transport::{ExpressCallback, InterestArgs, InterestHandler, Replier, Transport};
