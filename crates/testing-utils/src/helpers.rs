//! Helpers for exercising handlers and signers directly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flint_core::{Data, Interest, InterestArgs, InterestConfig, Name, Replier};
use flint_infrastructure::EcdsaSigner;

/// Holds whatever a [`Replier`] built by [`capturing_replier`] was given.
#[derive(Debug, Clone, Default)]
pub struct ReplySlot {
    inner: Arc<Mutex<Option<Data>>>,
}

impl ReplySlot {
    pub fn take(&self) -> Option<Data> {
        self.inner.lock().unwrap().take()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_none()
    }
}

pub fn capturing_replier() -> (Replier, ReplySlot) {
    let slot = ReplySlot::default();
    let inner = Arc::clone(&slot.inner);
    let replier = Replier::new(move |data| {
        *inner.lock().unwrap() = Some(data);
        Ok(())
    });
    (replier, slot)
}

/// Interest arguments for `name`, answered into the returned slot.
///
/// When `sealed` is set the interest carries an empty parameter block, so
/// its name ends with the parameters digest component.
pub fn interest_args(name: &str, sealed: bool) -> (InterestArgs, ReplySlot) {
    let name: Name = name.parse().expect("valid interest name");
    let config = InterestConfig {
        must_be_fresh: true,
        lifetime: Duration::from_secs(4),
        nonce: Some(1),
    };
    let params = sealed.then(Vec::new);
    let interest = Interest::build(name, &config, params, None).expect("interest builds");
    let (reply, slot) = capturing_replier();
    (InterestArgs { interest, reply }, slot)
}

/// An in-memory signer with a freshly generated key.
pub fn test_signer(key_name: &str) -> EcdsaSigner {
    let key_name: Name = key_name.parse().expect("valid key name");
    let (signer, _secret) = EcdsaSigner::generate(key_name).expect("key generation");
    signer
}
