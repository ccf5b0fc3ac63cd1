//! Project discovery and structure

use rust_embed::Embed;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory holding project configuration
pub const MARKER_DIR: &str = ".rateq";

/// Sample rate book written by `rateq init`
#[derive(Embed)]
#[folder = "templates/"]
struct SampleData;

/// Represents a rate book project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .rateq/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(MARKER_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project with the sample rate book at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(MARKER_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::write_sample_data(&root)?;
        Ok(Self { root })
    }

    /// Initialize even if .rateq/ exists, overwriting the sample files
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_sample_data(&root)?;
        Ok(Self { root })
    }

    fn write_sample_data(root: &Path) -> Result<(), ProjectError> {
        let io = |e: std::io::Error| ProjectError::IoError(e.to_string());

        std::fs::create_dir_all(root.join(MARKER_DIR)).map_err(io)?;
        std::fs::create_dir_all(root.join("rates")).map_err(io)?;

        for file in SampleData::iter() {
            let name = file.as_ref();
            let Some(content) = SampleData::get(name) else {
                continue;
            };
            // config.yaml lives inside the marker directory, data files at the root
            let dest = if name == "config.yaml" {
                root.join(MARKER_DIR).join(name)
            } else {
                root.join(name)
            };
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(io)?;
            }
            std::fs::write(&dest, content.data.as_ref()).map_err(io)?;
        }

        Ok(())
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .rateq configuration directory
    pub fn marker_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.marker_dir().join("config.yaml")
    }

    pub fn warehouses_path(&self) -> PathBuf {
        self.root.join("warehouses.yaml")
    }

    pub fn channels_path(&self) -> PathBuf {
        self.root.join("channels.yaml")
    }

    pub fn compliance_path(&self) -> PathBuf {
        self.root.join("compliance.yaml")
    }

    pub fn zones_path(&self) -> PathBuf {
        self.root.join("zones.yaml")
    }

    pub fn rates_dir(&self) -> PathBuf {
        self.root.join("rates")
    }

    /// Path of the rate file for a tier
    pub fn tier_path(&self, tier: &str) -> PathBuf {
        self.rates_dir().join(format!("{}.yaml", tier))
    }

    /// Iterate tier rate files (rates/*.yaml), sorted by file name
    pub fn iter_rate_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.rates_dir())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "yaml"))
            .map(|e| e.path().to_path_buf())
    }

    /// Display a project path relative to the root
    pub fn relative<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a rateq project (searched from {searched_from:?}). Run 'rateq init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("rateq project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
