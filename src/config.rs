//! Declarative role configuration. Deployments that keep role declarations
//! in a config file parse them here and attach the per-role lookups in code;
//! declaration order in the file is registration order, so impersonator
//! references must point at roles declared earlier.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, IdentityResult};
use crate::registry::{default_true_source, Lookup, RegistryBuilder, RoleConfig, RoleRegistry};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: String,
    /// Overrides the `current_<name>` convention. Ignored for
    /// impersonator-backed roles.
    #[serde(default)]
    pub true_source: Option<String>,
    #[serde(default)]
    pub impersonator_role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolesConfig {
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
}

impl RolesConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parse roles config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read roles config {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Combine the declarations with their lookups into a validated
    /// registry. Every declared role must have a lookup supplied.
    pub fn into_registry(self, mut lookups: HashMap<String, Lookup>) -> IdentityResult<RoleRegistry> {
        let mut builder = RegistryBuilder::new();
        for spec in self.roles {
            let Some(lookup) = lookups.remove(&spec.name) else {
                return Err(IdentityError::missing_lookup(&spec.name));
            };
            let true_source =
                spec.true_source.unwrap_or_else(|| default_true_source(&spec.name));
            let config = RoleConfig {
                name: spec.name,
                true_source,
                lookup,
                impersonator_role: spec.impersonator_role,
            };
            builder = builder.register(config)?;
        }
        Ok(builder.build())
    }
}
