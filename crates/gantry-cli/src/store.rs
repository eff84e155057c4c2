//! Plan file persistence.

use std::path::{Path, PathBuf};

use gantry_core::{
    error::{GanttError, Result},
    models, Plan,
};
use log::debug;

/// JSON plan file on disk.
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    /// Uses `path`, or the XDG data location when none is given.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved plan; an empty plan when nothing was saved yet.
    pub async fn load(&self) -> Result<Plan> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no plan file at {}", self.path.display());
                return Ok(Plan::new());
            }
            Err(source) => return Err(self.fs_error(source)),
        };
        models::deserialize(serde_json::from_str(&text)?)
    }

    pub async fn save(&self, plan: &Plan) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.fs_error(source))?;
        }
        let text = serde_json::to_string_pretty(&models::serialize(plan)?)?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|source| self.fs_error(source))?;
        debug!("saved plan to {}", self.path.display());
        Ok(())
    }

    fn fs_error(&self, source: std::io::Error) -> GanttError {
        GanttError::FileSystem {
            path: self.path.clone(),
            source,
        }
    }

    fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("gantry")
            .place_data_file("plan.json")
            .map_err(|e| GanttError::XdgDirectory(e.to_string()))
    }
}
