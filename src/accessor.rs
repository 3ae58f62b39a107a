//! Per-role operation surface handed out by the registry. Every read
//! delegates to the resolution engine against an explicitly passed session
//! and request context; the two writes (`impersonate`, `stop_impersonating`)
//! touch only this role's session entry.

use tracing::info;

use crate::context::RequestContext;
use crate::principal::Principal;
use crate::registry::{RoleConfig, RoleRegistry};
use crate::resolve::{resolve_identity, ResolvedIdentity};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy)]
pub struct RoleAccessor<'a> {
    registry: &'a RoleRegistry,
    config: &'a RoleConfig,
}

impl<'a> RoleAccessor<'a> {
    pub(crate) fn new(registry: &'a RoleRegistry, config: &'a RoleConfig) -> Self {
        Self { registry, config }
    }

    pub fn role_name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &RoleConfig {
        self.config
    }

    /// Full identity snapshot. Within one request, compute this once and
    /// read all facets from it so a concurrent session write elsewhere in
    /// the request cannot tear the view.
    pub fn resolve(&self, session: &dyn SessionStore, ctx: &RequestContext) -> ResolvedIdentity {
        resolve_identity(self.registry, self.config, session, ctx)
    }

    /// The principal the auth layer established. Always absent for
    /// impersonator-backed roles.
    pub fn true_principal(
        &self,
        session: &dyn SessionStore,
        ctx: &RequestContext,
    ) -> Option<Principal> {
        self.resolve(session, ctx).true_principal
    }

    /// The effective identity: who the rest of the application must treat
    /// as acting.
    pub fn current(&self, session: &dyn SessionStore, ctx: &RequestContext) -> Option<Principal> {
        self.resolve(session, ctx).effective
    }

    pub fn is_impersonating(&self, session: &dyn SessionStore, ctx: &RequestContext) -> bool {
        self.resolve(session, ctx).is_impersonating
    }

    pub fn impersonator(
        &self,
        session: &dyn SessionStore,
        ctx: &RequestContext,
    ) -> Option<Principal> {
        self.resolve(session, ctx).impersonator
    }

    /// Record the intent to act as `id`. The target is not validated here;
    /// the next resolution performs the lookup. Overwrites any existing
    /// entry, so switching targets needs no intervening stop.
    pub fn impersonate(&self, session: &mut dyn SessionStore, id: &str) {
        session.set(&self.config.session_key(), id);
        info!(target: "standin::impersonate", "impersonate role={} id={}", self.config.name, id);
    }

    /// Clear this role's impersonation entry. No-op when none exists.
    pub fn stop_impersonating(&self, session: &mut dyn SessionStore) {
        if session.delete(&self.config.session_key()) {
            info!(target: "standin::impersonate", "stop role={}", self.config.name);
        }
    }
}
