//! Per-request carrier of the externally-established principals.
//! The surrounding authentication layer publishes each role's true principal
//! under that role's configured true-source name (`current_<role>` by
//! convention); the engine only ever reads from here.

use std::collections::HashMap;

use uuid::Uuid;

use crate::principal::Principal;

#[derive(Debug, Clone)]
pub struct RequestContext {
    principals: HashMap<String, Principal>,
    pub request_id: Option<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self { principals: HashMap::new(), request_id: None }
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh context with a generated correlation id for log lines.
    pub fn with_request_id() -> Self {
        Self { principals: HashMap::new(), request_id: Some(Uuid::new_v4().to_string()) }
    }

    /// Publish the true principal the auth layer established for `source`.
    /// Re-publishing under the same source replaces the previous principal.
    pub fn publish(&mut self, source: impl Into<String>, principal: Principal) {
        self.principals.insert(source.into(), principal);
    }

    pub fn true_principal(&self, source: &str) -> Option<&Principal> {
        self.principals.get(source)
    }
}
