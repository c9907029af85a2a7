pub mod ecdsa;
pub mod trust_store;

pub use ecdsa::{load_or_create_signer, EcdsaSigner, KEY_FILE_NAME};
pub use trust_store::TrustStore;
