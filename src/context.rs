//! The record the Next build hook leaves next to the build output.

use crate::fs::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONTEXT_FILE: &str = "bun-compile-ctx.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildContext {
    pub dist_dir: PathBuf,
    pub project_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_prefix: Option<String>,
}

impl BuildContext {
    pub fn new(dist_dir: PathBuf, project_dir: PathBuf, asset_prefix: Option<String>) -> Self {
        Self {
            dist_dir,
            project_dir,
            asset_prefix,
        }
    }

    pub fn path_in(dist_dir: &Path) -> PathBuf {
        dist_dir.join(CONTEXT_FILE)
    }

    /// Read the record from `dist_dir`. Absent or unreadable records are not
    /// errors; they only disable CDN handling.
    pub fn load(fs: &dyn FileSystem, dist_dir: &Path) -> Option<Self> {
        let path = Self::path_in(dist_dir);
        if !fs.is_file(&path) {
            debug!(path = %path.display(), "No build context recorded");
            return None;
        }

        let parsed = fs
            .read_to_string(&path)
            .and_then(|content| serde_json::from_str::<Self>(&content).map_err(Into::into));

        match parsed {
            Ok(context) => Some(context),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed build context");
                None
            }
        }
    }

    pub fn write(&self, fs: &dyn FileSystem) -> Result<PathBuf> {
        let path = Self::path_in(&self.dist_dir);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize build context")?;
        fs.write(&path, &json)?;
        Ok(path)
    }

    /// The CDN prefix static assets are served from, if one was configured.
    pub fn cdn_prefix(&self) -> Option<&str> {
        self.asset_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
