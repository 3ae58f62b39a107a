//! Session-backed impersonation for already-authenticated principals.
//! Declare impersonable roles once at startup, then resolve true /
//! impersonated / effective identity consistently from any layer.

pub mod accessor;
pub mod config;
pub mod context;
pub mod error;
pub mod principal;
pub mod registry;
pub mod resolve;
pub mod session;

pub use accessor::RoleAccessor;
pub use config::{RoleSpec, RolesConfig};
pub use context::RequestContext;
pub use error::{IdentityError, IdentityResult};
pub use principal::{Attrs, Principal};
pub use registry::{default_true_source, Lookup, RegistryBuilder, RoleConfig, RoleRegistry};
pub use resolve::{resolve_identity, ResolvedIdentity};
pub use session::{MemorySession, SessionManager, SessionStore, SessionToken, SharedSession};

// Test-only printing helper: expands to eprintln! during tests and is absent otherwise.
// Usage in tests: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
