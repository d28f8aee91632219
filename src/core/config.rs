//! Rush workspace configuration.
//!
//! Reads the two files the wrapper cares about:
//! - `rush.json` at the repository root (which package manager is in use)
//! - `common/config/rush/pnpm-config.json` (workspace mode, store location,
//!   environment variables for PNPM)
//!
//! Both are JSONC: `//` and `/* */` comments and trailing commas are allowed.
//! A missing `pnpm-config.json` leaves `useWorkspaces` off, as in Rush.

use crate::core::environment::EnvironmentOverride;
use crate::core::error::RushPnpmError;
use jsonc_parser::ParseOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const RUSH_JSON: &str = "rush.json";
/// Overrides where the PNPM store lives, for either store mode.
pub const STORE_PATH_ENV: &str = "RUSH_PNPM_STORE_PATH";

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RushJson {
    pnpm_version: Option<String>,
    npm_version: Option<String>,
    yarn_version: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PnpmConfigJson {
    use_workspaces: Option<bool>,
    pnpm_store: Option<PnpmStore>,
    #[serde(default)]
    environment_variables: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PnpmStore {
    /// `common/temp/pnpm-store`
    #[default]
    Local,
    /// PNPM's own default location; no override is passed.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManager {
    Pnpm { version: String },
    Npm,
    Yarn,
    Unspecified,
}

impl PackageManager {
    fn name(&self) -> &'static str {
        match self {
            PackageManager::Pnpm { .. } => "pnpm",
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Unspecified => "none",
        }
    }
}

/// Fixed paths inside a Rush repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub root: PathBuf,
    /// Generated PNPM workspace; exported as the workspace dir.
    pub common_temp: PathBuf,
    pub workspace_manifest: PathBuf,
    pub pnpm_binary: PathBuf,
    pub pnpm_config: PathBuf,
    pub temp_patches: PathBuf,
    pub committed_patches: PathBuf,
    pub temp_lockfile: PathBuf,
    pub committed_lockfile: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: &Path) -> Self {
        let common = root.join("common");
        let common_temp = common.join("temp");
        let rush_config = common.join("config").join("rush");
        Self {
            root: root.to_path_buf(),
            workspace_manifest: common_temp.join("pnpm-workspace.yaml"),
            pnpm_binary: common_temp
                .join("pnpm-local")
                .join("node_modules")
                .join(".bin")
                .join("pnpm"),
            pnpm_config: rush_config.join("pnpm-config.json"),
            temp_patches: common_temp.join("patches"),
            committed_patches: common.join("pnpm-patches"),
            temp_lockfile: common_temp.join("pnpm-lock.yaml"),
            committed_lockfile: rush_config.join("pnpm-lock.yaml"),
            common_temp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RushConfig {
    pub layout: WorkspaceLayout,
    pub package_manager: PackageManager,
    pub use_workspaces: bool,
    pub store: PnpmStore,
    pub environment_overrides: Vec<EnvironmentOverride>,
}

impl RushConfig {
    pub fn load(root: &Path) -> Result<Self, RushPnpmError> {
        let layout = WorkspaceLayout::new(root);
        let rush_json: RushJson = read_json(&root.join(RUSH_JSON))?;
        let pnpm_config: PnpmConfigJson = if layout.pnpm_config.is_file() {
            read_json(&layout.pnpm_config)?
        } else {
            PnpmConfigJson::default()
        };

        let package_manager = match rush_json {
            RushJson {
                pnpm_version: Some(version),
                ..
            } => PackageManager::Pnpm { version },
            RushJson {
                npm_version: Some(_),
                ..
            } => PackageManager::Npm,
            RushJson {
                yarn_version: Some(_),
                ..
            } => PackageManager::Yarn,
            _ => PackageManager::Unspecified,
        };

        let mut environment_overrides = Vec::new();
        for (key, value) in pnpm_config.environment_variables {
            let mut entry: EnvironmentOverride =
                serde_json::from_value(value).map_err(|e| RushPnpmError::ConfigParse {
                    path: layout.pnpm_config.clone(),
                    message: format!("environmentVariables.{}: {}", key, e),
                })?;
            entry.key = key;
            environment_overrides.push(entry);
        }

        Ok(Self {
            package_manager,
            use_workspaces: pnpm_config.use_workspaces.unwrap_or(false),
            store: pnpm_config.pnpm_store.unwrap_or_default(),
            environment_overrides,
            layout,
        })
    }

    /// Store directory to export, if any. `base_env` is consulted for
    /// [`STORE_PATH_ENV`].
    pub fn store_dir(&self, base_env: &BTreeMap<String, String>) -> Option<PathBuf> {
        if let Some(path) = base_env.get(STORE_PATH_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        match self.store {
            PnpmStore::Local => Some(self.layout.common_temp.join("pnpm-store")),
            PnpmStore::Global => None,
        }
    }

    /// Everything that must hold before PNPM can be run against this
    /// workspace.
    pub fn ensure_ready(&self) -> Result<(), RushPnpmError> {
        if !matches!(self.package_manager, PackageManager::Pnpm { .. }) {
            return Err(RushPnpmError::precondition(
                format!(
                    "The \"rush-pnpm\" command requires your {} to be configured to use the PNPM package manager (found: {}).",
                    RUSH_JSON,
                    self.package_manager.name()
                ),
                "Set \"pnpmVersion\" in rush.json and run \"rush update\".",
            ));
        }
        if !self.use_workspaces {
            return Err(RushPnpmError::precondition(
                format!(
                    "The \"rush-pnpm\" command requires the \"useWorkspaces\" setting to be enabled in {}.",
                    self.layout.pnpm_config.display()
                ),
                "Set \"useWorkspaces\": true and run \"rush update\".",
            ));
        }
        if !self.layout.workspace_manifest.is_file() {
            return Err(RushPnpmError::precondition(
                format!(
                    "The PNPM workspace file has not been generated: {}",
                    self.layout.workspace_manifest.display()
                ),
                "Run \"rush install\" or \"rush update\" first.",
            ));
        }
        if !self.layout.pnpm_binary.is_file() {
            return Err(RushPnpmError::precondition(
                format!(
                    "PNPM has not been installed for this workspace: {}",
                    self.layout.pnpm_binary.display()
                ),
                "Run \"rush install\" first.",
            ));
        }
        Ok(())
    }
}

/// Walk up from `start_dir` to the directory holding `rush.json`.
pub fn find_workspace_root(start_dir: &Path) -> Result<PathBuf, RushPnpmError> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        if current_dir.join(RUSH_JSON).is_file() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(RushPnpmError::precondition(
                format!(
                    "Unable to find {} in {} or any of its parent folders.",
                    RUSH_JSON,
                    start_dir.display()
                ),
                "Run \"rush-pnpm\" from inside a Rush repository.",
            ));
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RushPnpmError> {
    let content = fs::read_to_string(path)?;
    let parse_err = |message: String| RushPnpmError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    // Rush config files are hand-edited JSONC: comments and trailing commas.
    let parse_opts = ParseOptions {
        allow_comments: true,
        allow_trailing_commas: true,
        allow_loose_object_property_names: false,
    };
    let value = jsonc_parser::parse_to_serde_value(&content, &parse_opts)
        .map_err(|e| parse_err(e.to_string()))?
        .unwrap_or(serde_json::Value::Null);

    serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))
}
