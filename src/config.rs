//! Conversion settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Divisors that bring Scratch 3 workspace coordinates into the pixel
/// space shared by Scratch 2 and Snap!.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceScale {
    pub x: f64,
    pub y: f64,
}

impl Default for WorkspaceScale {
    fn default() -> Self {
        Self { x: 1.5, y: 1.8 }
    }
}

/// Settings for one converter instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Remote asset URL; `{name}` is replaced by the asset identifier.
    pub asset_url_template: String,
    /// Zip entry holding the project description.
    pub description_entry: String,
    pub workspace_scale: WorkspaceScale,
    /// Written to the `app` attribute of the output project.
    pub app_name: String,
    /// Base of the "open in Snap!" link.
    pub snap_url: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            asset_url_template: "https://assets.scratch.mit.edu/internalapi/asset/{name}/get/"
                .to_string(),
            description_entry: "project.json".to_string(),
            workspace_scale: WorkspaceScale::default(),
            app_name: "Snapinator".to_string(),
            snap_url: "https://snap.berkeley.edu/snap/snap.html".to_string(),
        }
    }
}

impl ConvertConfig {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(source).map_err(|e| ConvertError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        let WorkspaceScale { x, y } = self.workspace_scale;
        for (axis, value) in [("x", x), ("y", y)] {
            if !value.is_finite() || value == 0.0 {
                return Err(ConvertError::config(format!(
                    "workspace_scale.{axis} must be a finite non-zero number, got {value}"
                )));
            }
        }
        if !self.asset_url_template.contains("{name}") {
            return Err(ConvertError::config(
                "asset_url_template must contain a {name} placeholder",
            ));
        }
        Ok(())
    }
}
