//! Test doubles for the transport and security traits.

use async_trait::async_trait;
use flint_core::{
    Data, DataConfig, ExpressCallback, FlintError, FlintResult, Interest, InterestHandler,
    NackReason, Name, RequestOutcome, Signer, Transport,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted answer to an expressed interest.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Data carrying the given text, delivered immediately.
    Data(String),
    Nack(NackReason),
    /// Timeout, delivered once the interest lifetime has elapsed.
    Timeout,
    /// Data delivered after the given delay.
    Delayed(Duration, String),
    /// The callback is held and never invoked.
    Hang,
}

impl ScriptedReply {
    pub fn data(content: impl Into<String>) -> Self {
        Self::Data(content.into())
    }
}

/// Mock implementation of Transport for testing
///
/// Replies are scripted per name prefix (longest prefix wins). Each expressed
/// interest consumes the next reply of its script; the last reply repeats.
/// Interests with no matching script are nacked with `NoRoute`.
pub struct ScriptedTransport {
    started: AtomicBool,
    refuse_express: AtomicBool,
    refuse_routes: AtomicBool,
    scripts: Mutex<Vec<(Name, VecDeque<ScriptedReply>)>>,
    expressed: Mutex<Vec<Interest>>,
    hung: Mutex<Vec<ExpressCallback>>,
    attached: Mutex<Vec<(Name, Arc<dyn InterestHandler>)>>,
    routes: Mutex<Vec<Name>>,
    signer: Option<Arc<dyn Signer>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            refuse_express: AtomicBool::new(false),
            refuse_routes: AtomicBool::new(false),
            scripts: Mutex::new(Vec::new()),
            expressed: Mutex::new(Vec::new()),
            hung: Mutex::new(Vec::new()),
            attached: Mutex::new(Vec::new()),
            routes: Mutex::new(Vec::new()),
            signer: None,
        }
    }

    /// Scripted data replies are signed with `signer`.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn on<I>(&self, prefix: &str, replies: I) -> &Self
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        let prefix: Name = prefix.parse().expect("valid script prefix");
        let replies: VecDeque<ScriptedReply> = replies.into_iter().collect();
        assert!(!replies.is_empty(), "a script needs at least one reply");
        let mut scripts = self.scripts.lock().unwrap();
        scripts.retain(|(existing, _)| *existing != prefix);
        scripts.push((prefix, replies));
        self
    }

    pub fn refuse_express(&self) {
        self.refuse_express.store(true, Ordering::SeqCst);
    }

    pub fn refuse_routes(&self) {
        self.refuse_routes.store(true, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn expressed(&self) -> Vec<Interest> {
        self.expressed.lock().unwrap().clone()
    }

    pub fn expressed_names(&self) -> Vec<String> {
        self.expressed
            .lock()
            .unwrap()
            .iter()
            .map(|interest| interest.name().to_string())
            .collect()
    }

    pub fn express_count(&self) -> usize {
        self.expressed.lock().unwrap().len()
    }

    pub fn attached_prefixes(&self) -> Vec<String> {
        self.attached
            .lock()
            .unwrap()
            .iter()
            .map(|(prefix, _)| prefix.to_string())
            .collect()
    }

    pub fn handler_for(&self, prefix: &str) -> Option<Arc<dyn InterestHandler>> {
        let prefix: Name = prefix.parse().ok()?;
        self.attached
            .lock()
            .unwrap()
            .iter()
            .find(|(existing, _)| *existing == prefix)
            .map(|(_, handler)| Arc::clone(handler))
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn next_reply(&self, name: &Name) -> Option<ScriptedReply> {
        let mut scripts = self.scripts.lock().unwrap();
        let (_, replies) = scripts
            .iter_mut()
            .filter(|(prefix, _)| prefix.is_prefix_of(name))
            .max_by_key(|(prefix, _)| prefix.len())?;
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }

    fn build_data(&self, name: &Name, content: String) -> Data {
        Data::build(
            name.clone(),
            &DataConfig::default(),
            content.into_bytes(),
            self.signer.as_deref(),
        )
        .expect("scripted data builds")
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn start(&self) -> FlintResult<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> FlintResult<()> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn express(&self, interest: Interest, callback: ExpressCallback) -> FlintResult<()> {
        if self.refuse_express.load(Ordering::SeqCst) {
            return Err(FlintError::Transport("scripted refusal".to_string()));
        }
        self.expressed.lock().unwrap().push(interest.clone());

        let name = interest.name().clone();
        match self.next_reply(&name) {
            None => {
                tokio::spawn(async move { callback(RequestOutcome::Nack(NackReason::NoRoute)) });
            }
            Some(ScriptedReply::Data(content)) => {
                let data = self.build_data(&name, content);
                tokio::spawn(async move { callback(RequestOutcome::Data(data)) });
            }
            Some(ScriptedReply::Nack(reason)) => {
                tokio::spawn(async move { callback(RequestOutcome::Nack(reason)) });
            }
            Some(ScriptedReply::Timeout) => {
                let lifetime = interest.lifetime();
                tokio::spawn(async move {
                    tokio::time::sleep(lifetime).await;
                    callback(RequestOutcome::Timeout);
                });
            }
            Some(ScriptedReply::Delayed(delay, content)) => {
                let data = self.build_data(&name, content);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    callback(RequestOutcome::Data(data));
                });
            }
            Some(ScriptedReply::Hang) => {
                self.hung.lock().unwrap().push(callback);
            }
        }
        Ok(())
    }

    fn attach_handler(&self, prefix: Name, handler: Arc<dyn InterestHandler>) -> FlintResult<()> {
        self.attached.lock().unwrap().push((prefix, handler));
        Ok(())
    }

    async fn register_route(&self, prefix: &Name) -> FlintResult<()> {
        if self.refuse_routes.load(Ordering::SeqCst) {
            return Err(FlintError::RouteRegistration {
                prefix: prefix.to_string(),
                reason: "scripted refusal".to_string(),
            });
        }
        self.routes.lock().unwrap().push(prefix.clone());
        Ok(())
    }
}

/// A signer that always fails.
#[derive(Debug)]
pub struct FailingSigner {
    key_name: Name,
}

impl FailingSigner {
    pub fn new() -> Self {
        Self {
            key_name: "/local/broken/ecdsa-key".parse().expect("valid key name"),
        }
    }
}

impl Default for FailingSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for FailingSigner {
    fn key_name(&self) -> &Name {
        &self.key_name
    }

    fn sign(&self, _payload: &[u8]) -> FlintResult<Vec<u8>> {
        Err(FlintError::Signing("key material unavailable".to_string()))
    }
}
