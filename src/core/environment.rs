//! Child-process environment construction.
//!
//! The merged map always starts as a copy of the base snapshot, so it is a
//! superset of what the child would inherit anyway.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Points PNPM at the generated workspace under `common/temp`.
pub const WORKSPACE_DIR_VAR: &str = "NPM_CONFIG_WORKSPACE_DIR";
/// Dedicated PNPM store location, set only when the workspace declares one.
pub const STORE_DIR_VAR: &str = "NPM_CONFIG_STORE_DIR";

pub type EffectiveEnvironment = BTreeMap<String, String>;

/// One `environmentVariables` entry from `pnpm-config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentOverride {
    #[serde(skip)]
    pub key: String,
    pub value: String,
    /// Replace a value already present in the base environment.
    #[serde(default, rename = "override")]
    pub override_existing: bool,
}

impl EnvironmentOverride {
    pub fn new(key: impl Into<String>, value: impl Into<String>, override_existing: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            override_existing,
        }
    }
}

/// Snapshot of the current process environment.
///
/// Variables whose name or value is not valid UTF-8 are left out of the
/// snapshot; the child still inherits them untouched.
pub fn process_environment() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

pub fn merge_environment(
    base: &BTreeMap<String, String>,
    workspace_dir: &Path,
    store_dir: Option<&Path>,
    overrides: &[EnvironmentOverride],
) -> EffectiveEnvironment {
    let mut merged = base.clone();

    merged.insert(
        WORKSPACE_DIR_VAR.to_string(),
        workspace_dir.to_string_lossy().to_string(),
    );
    if let Some(store_dir) = store_dir {
        merged.insert(
            STORE_DIR_VAR.to_string(),
            store_dir.to_string_lossy().to_string(),
        );
    }

    for entry in overrides {
        if entry.override_existing || !merged.contains_key(&entry.key) {
            merged.insert(entry.key.clone(), entry.value.clone());
        }
    }

    tracing::debug!(
        overrides = overrides.len(),
        store_dir = ?store_dir,
        "merged child environment"
    );
    merged
}
