//! The resolution engine: computes a role's full identity state from the
//! registry, the caller's session and the request context. Pure apart from
//! invoking the role's lookup; nothing here writes to the session, so a
//! snapshot taken at the top of a request stays internally consistent no
//! matter what the rest of the request does to the session afterwards.

use tracing::debug;

use crate::context::RequestContext;
use crate::principal::Principal;
use crate::registry::{RoleConfig, RoleRegistry};
use crate::session::SessionStore;

/// Identity state for one role at one point in time. Recomputed on every
/// access; never cached across session mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// The principal the auth layer established. Structurally absent for
    /// impersonator-backed roles, not merely unauthenticated.
    pub true_principal: Option<Principal>,
    /// Lookup result for the session's impersonation entry, if any.
    pub impersonated: Option<Principal>,
    /// Who the rest of the application must treat as acting.
    pub effective: Option<Principal>,
    /// True only when an entry is present AND its id resolved. A stale id
    /// does not count as impersonating.
    pub is_impersonating: bool,
    /// Who owns the current impersonation: the referenced role's effective
    /// principal for impersonator-backed roles, otherwise this role's true
    /// principal while impersonating.
    pub impersonator: Option<Principal>,
}

pub fn resolve_identity(
    registry: &RoleRegistry,
    config: &RoleConfig,
    session: &dyn SessionStore,
    ctx: &RequestContext,
) -> ResolvedIdentity {
    let true_principal = if config.impersonator_role.is_some() {
        None
    } else {
        ctx.true_principal(&config.true_source).cloned()
    };

    let entry = session.get(&config.session_key());
    let impersonated = entry.as_deref().and_then(|id| {
        let found = (config.lookup)(id);
        if found.is_none() {
            // Soft failure: the entry stays in the session until an explicit
            // stop_impersonating; callers see the true identity meanwhile.
            debug!(
                target: "standin::resolve",
                "impersonation id did not resolve role={} id={}",
                config.name, id
            );
        }
        found
    });

    let is_impersonating = entry.is_some() && impersonated.is_some();
    let effective = impersonated.clone().or_else(|| true_principal.clone());

    let impersonator = match config.impersonator_role.as_deref() {
        // Registration rejects unknown references and chains, so this
        // recursion exists and terminates after one hop.
        Some(other) => registry
            .resolve(other)
            .ok()
            .and_then(|other_cfg| resolve_identity(registry, other_cfg, session, ctx).effective),
        None if is_impersonating => true_principal.clone(),
        None => None,
    };

    ResolvedIdentity { true_principal, impersonated, effective, is_impersonating, impersonator }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryBuilder, RoleConfig};
    use crate::session::MemorySession;

    fn one_user(id: &str) -> Option<Principal> {
        (id == "1").then(|| Principal::new("1"))
    }

    fn registry() -> RoleRegistry {
        RegistryBuilder::new()
            .register(RoleConfig::new("user", one_user))
            .unwrap()
            .build()
    }

    #[test]
    fn no_entry_no_auth_resolves_to_nothing() {
        let registry = registry();
        let resolved = resolve_identity(
            &registry,
            registry.resolve("user").unwrap(),
            &MemorySession::new(),
            &RequestContext::new(),
        );
        assert_eq!(resolved, ResolvedIdentity::default());
    }

    #[test]
    fn entry_with_resolvable_id_takes_effect() {
        let registry = registry();
        let mut session = MemorySession::new();
        let mut ctx = RequestContext::new();
        ctx.publish("current_user", Principal::new("9"));
        session.set("user_impersonate_id", "1");
        let resolved =
            resolve_identity(&registry, registry.resolve("user").unwrap(), &session, &ctx);
        assert_eq!(resolved.true_principal.as_ref().unwrap().id, "9");
        assert_eq!(resolved.effective.as_ref().unwrap().id, "1");
        assert!(resolved.is_impersonating);
        assert_eq!(resolved.impersonator.as_ref().unwrap().id, "9");
    }

    #[test]
    fn entry_with_stale_id_falls_back_to_true() {
        let registry = registry();
        let mut session = MemorySession::new();
        let mut ctx = RequestContext::new();
        ctx.publish("current_user", Principal::new("9"));
        session.set("user_impersonate_id", "deleted");
        let resolved =
            resolve_identity(&registry, registry.resolve("user").unwrap(), &session, &ctx);
        assert_eq!(resolved.effective.as_ref().unwrap().id, "9");
        assert!(!resolved.is_impersonating);
        assert!(resolved.impersonated.is_none());
        assert!(resolved.impersonator.is_none());
    }
}
