//! Registration validation: duplicate names, self-references, unknown and
//! chained impersonator references, programmatic and declarative paths.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use standin::{Lookup, Principal, RegistryBuilder, RoleConfig, RolesConfig};

fn nobody(_id: &str) -> Option<Principal> {
    None
}

#[test]
fn register_and_resolve_roles() -> Result<()> {
    let registry = RegistryBuilder::new()
        .register(RoleConfig::new("user", nobody))?
        .register(RoleConfig::new("account", nobody))?
        .build();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.resolve("user")?.session_key(), "user_impersonate_id");
    assert_eq!(registry.resolve("account")?.session_key(), "account_impersonate_id");

    let err = registry.resolve("ghost").unwrap_err();
    assert_eq!(err.code_str(), "unknown_role");
    assert!(registry.accessor("ghost").is_err());
    Ok(())
}

#[test]
fn duplicate_registration_is_rejected_not_overwritten() -> Result<()> {
    let builder = RegistryBuilder::new().register(RoleConfig::new("user", nobody))?;
    let err = builder
        .register(RoleConfig::new("user", nobody).with_true_source("other_source"))
        .unwrap_err();
    assert_eq!(err.code_str(), "duplicate_role");
    assert!(err.is_configuration());
    Ok(())
}

#[test]
fn self_referential_impersonator_is_rejected() {
    let err = RegistryBuilder::new()
        .register(RoleConfig::new("client", nobody).with_impersonator_role("client"))
        .unwrap_err();
    assert_eq!(err.code_str(), "self_impersonator");
}

#[test]
fn impersonator_reference_must_already_be_registered() {
    // Forward references are configuration errors, never resolved lazily.
    let err = RegistryBuilder::new()
        .register(RoleConfig::new("client", nobody).with_impersonator_role("employee"))
        .unwrap_err();
    assert_eq!(err.code_str(), "unknown_impersonator");
}

#[test]
fn impersonator_chains_are_rejected() -> Result<()> {
    // employee <- client is fine; audit <- client would make a two-hop chain.
    let builder = RegistryBuilder::new()
        .register(RoleConfig::new("employee", nobody))?
        .register(RoleConfig::new("client", nobody).with_impersonator_role("employee"))?;
    let err = builder
        .register(RoleConfig::new("audit", nobody).with_impersonator_role("client"))
        .unwrap_err();
    assert_eq!(err.code_str(), "impersonator_chain");
    Ok(())
}

fn lookups_for(names: &[&str]) -> HashMap<String, Lookup> {
    names
        .iter()
        .map(|n| {
            let lookup: Lookup = Arc::new(nobody);
            (n.to_string(), lookup)
        })
        .collect()
}

#[test]
fn declarative_config_builds_an_equivalent_registry() -> Result<()> {
    let cfg = RolesConfig::from_json(
        r#"{"roles": [
            {"name": "employee"},
            {"name": "client", "impersonator_role": "employee"}
        ]}"#,
    )?;
    let registry = cfg.into_registry(lookups_for(&["employee", "client"]))?;

    let names: Vec<&str> = registry.role_names().collect();
    assert_eq!(names, vec!["employee", "client"]);
    assert_eq!(registry.resolve("employee")?.true_source, "current_employee");
    assert_eq!(registry.resolve("client")?.impersonator_role.as_deref(), Some("employee"));
    Ok(())
}

#[test]
fn declarative_config_enforces_the_same_rules() -> Result<()> {
    // Declaration order is registration order, so the forward reference fails.
    let cfg = RolesConfig::from_json(
        r#"{"roles": [
            {"name": "client", "impersonator_role": "employee"},
            {"name": "employee"}
        ]}"#,
    )?;
    let err = cfg.into_registry(lookups_for(&["employee", "client"])).unwrap_err();
    assert_eq!(err.code_str(), "unknown_impersonator");
    Ok(())
}

#[test]
fn declarative_config_loads_from_a_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("roles.json");
    std::fs::write(&path, r#"{"roles": [{"name": "user", "true_source": "signed_in_user"}]}"#)?;

    let registry = RolesConfig::load(&path)?.into_registry(lookups_for(&["user"]))?;
    assert_eq!(registry.resolve("user")?.true_source, "signed_in_user");

    assert!(RolesConfig::load(dir.path().join("missing.json")).is_err());
    Ok(())
}
