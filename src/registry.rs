//! Role declarations and the startup-time registry.
//! Roles are declared once through `RegistryBuilder`; the built
//! `RoleRegistry` is read-only and passed by reference wherever identities
//! are resolved. All reference validation happens at registration time so
//! resolution never has to re-check configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::accessor::RoleAccessor;
use crate::error::{IdentityError, IdentityResult};
use crate::principal::Principal;

/// Pure identifier-to-principal resolution supplied per role. May block
/// (a store query); the engine calls it at most once per resolution.
pub type Lookup = Arc<dyn Fn(&str) -> Option<Principal> + Send + Sync>;

#[derive(Clone)]
pub struct RoleConfig {
    pub name: String,
    /// RequestContext key the true principal is published under. Never
    /// consulted when `impersonator_role` is set.
    pub true_source: String,
    pub lookup: Lookup,
    /// Cross-role reference: this role's impersonator is the named role's
    /// effective principal, and this role has no true principal of its own.
    pub impersonator_role: Option<String>,
}

impl fmt::Debug for RoleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleConfig")
            .field("name", &self.name)
            .field("true_source", &self.true_source)
            .field("impersonator_role", &self.impersonator_role)
            .finish()
    }
}

pub fn default_true_source(name: &str) -> String {
    format!("current_{}", name)
}

impl RoleConfig {
    pub fn new<F>(name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Principal> + Send + Sync + 'static,
    {
        let name = name.into();
        let true_source = default_true_source(&name);
        Self { name, true_source, lookup: Arc::new(lookup), impersonator_role: None }
    }

    pub fn with_true_source(mut self, source: impl Into<String>) -> Self {
        self.true_source = source.into();
        self
    }

    pub fn with_impersonator_role(mut self, role: impl Into<String>) -> Self {
        self.impersonator_role = Some(role.into());
        self
    }

    /// Session key holding this role's impersonation entry. Role names are
    /// unique, so derived keys cannot collide.
    pub fn session_key(&self) -> String {
        format!("{}_impersonate_id", self.name)
    }
}

/// Collects role declarations in order. Every structural rule is enforced
/// here: duplicate names, self-references, references to roles not yet
/// registered, and impersonator chains are all rejected at declaration time.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    roles: Vec<RoleConfig>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, config: RoleConfig) -> IdentityResult<Self> {
        if self.roles.iter().any(|r| r.name == config.name) {
            return Err(IdentityError::duplicate_role(&config.name));
        }
        if let Some(other) = config.impersonator_role.as_deref() {
            if other == config.name {
                return Err(IdentityError::self_impersonator(&config.name));
            }
            // Referenced roles must already be declared; this is also what
            // bounds cross-role resolution to a single hop.
            let Some(referenced) = self.roles.iter().find(|r| r.name == other) else {
                return Err(IdentityError::unknown_impersonator(&config.name, other));
            };
            if referenced.impersonator_role.is_some() {
                return Err(IdentityError::impersonator_chain(&config.name, other));
            }
        }
        info!(
            target: "standin::registry",
            "role registered name={} impersonator_role={}",
            config.name,
            config.impersonator_role.as_deref().unwrap_or("-")
        );
        self.roles.push(config);
        Ok(self)
    }

    pub fn build(self) -> RoleRegistry {
        let order: Vec<String> = self.roles.iter().map(|r| r.name.clone()).collect();
        let roles = self.roles.into_iter().map(|r| (r.name.clone(), r)).collect();
        RoleRegistry { roles, order }
    }
}

/// Immutable after `build`; exposes no mutating methods, so shared references
/// need no synchronization.
pub struct RoleRegistry {
    roles: HashMap<String, RoleConfig>,
    order: Vec<String>,
}

impl RoleRegistry {
    pub fn resolve(&self, name: &str) -> IdentityResult<&RoleConfig> {
        self.roles.get(name).ok_or_else(|| IdentityError::unknown_role(name))
    }

    /// The per-role operation surface, looked up by role name.
    pub fn accessor(&self, name: &str) -> IdentityResult<RoleAccessor<'_>> {
        let config = self.resolve(name)?;
        Ok(RoleAccessor::new(self, config))
    }

    /// Role names in declaration order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl fmt::Debug for RoleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleRegistry").field("roles", &self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nobody(_id: &str) -> Option<Principal> {
        None
    }

    #[test]
    fn default_true_source_follows_convention() {
        let cfg = RoleConfig::new("user", nobody);
        assert_eq!(cfg.true_source, "current_user");
        assert_eq!(cfg.session_key(), "user_impersonate_id");
    }

    #[test]
    fn true_source_override() {
        let cfg = RoleConfig::new("user", nobody).with_true_source("signed_in_user");
        assert_eq!(cfg.true_source, "signed_in_user");
    }

    #[test]
    fn build_preserves_declaration_order() {
        let registry = RegistryBuilder::new()
            .register(RoleConfig::new("employee", nobody))
            .unwrap()
            .register(RoleConfig::new("user", nobody))
            .unwrap()
            .build();
        let names: Vec<&str> = registry.role_names().collect();
        assert_eq!(names, vec!["employee", "user"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_unknown_role_fails() {
        let registry = RegistryBuilder::new().build();
        let err = registry.resolve("ghost").unwrap_err();
        assert_eq!(err.code_str(), "unknown_role");
    }
}
