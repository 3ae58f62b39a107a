//! Session store contract consumed by the resolution engine, plus in-process
//! implementations for hosts that have no session transport of their own.
//! The engine only ever reads/writes string scalars under keys it derives
//! from role names; durability and request-boundary visibility belong to the
//! transport.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use parking_lot::RwLock;
use tracing::debug;

pub type SessionToken = String;

/// Per-caller-session key/value access. Last-write-wins within a request is
/// the only ordering guarantee the engine relies on.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    /// Returns true if an entry was actually removed.
    fn delete(&mut self, key: &str) -> bool;
}

/// Plain single-owner store for request-local use and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn delete(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }
}

/// Cloneable handle over one logical session, for callers that thread the
/// same session through several handler layers.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for SharedSession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.write().insert(key.to_string(), value.to_string());
    }

    fn delete(&mut self, key: &str) -> bool {
        self.values.write().remove(key).is_some()
    }
}

fn gen_token() -> String {
    // 128-bit random token base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Issues token-addressed shared sessions. Expiry and persistence stay with
/// the host; sessions live until `end` is called.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionToken, SharedSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> (SessionToken, SharedSession) {
        let token = gen_token();
        let session = SharedSession::new();
        self.sessions.write().insert(token.clone(), session.clone());
        debug!(target: "standin::session", "session issued token_len={}", token.len());
        (token, session)
    }

    pub fn get(&self, token: &str) -> Option<SharedSession> {
        self.sessions.read().get(token).cloned()
    }

    pub fn end(&self, token: &str) -> bool {
        let removed = self.sessions.write().remove(token).is_some();
        if removed {
            debug!(target: "standin::session", "session ended");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
