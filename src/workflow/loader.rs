//! Workflow file discovery, loading and validation

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::model::Workflow;
use crate::format::{FileFormat, EXTENSIONS};
use crate::{Error, Result};

/// Workflows stored as `<name>.<ext>` files in one directory
#[derive(Debug, Clone)]
pub struct WorkflowStore {
    dir: PathBuf,
}

impl WorkflowStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory backing this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted, de-duplicated names of all workflows
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || FileFormat::from_path(&path).is_err() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }

        Ok(names.into_iter().collect())
    }

    /// Every existing file for `name`, in lookup order
    fn files_for(&self, name: &str) -> Vec<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
            .filter(|p| p.is_file())
            .collect()
    }

    /// Resolve a workflow name to its file
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        self.files_for(name).into_iter().next().ok_or_else(|| {
            Error::WorkflowNotFound(format!(
                "'{}' not found with any supported format (.{})",
                name,
                EXTENSIONS.join(", .")
            ))
        })
    }

    /// Load and validate a workflow by name
    pub fn load(&self, name: &str) -> Result<Workflow> {
        let path = self.find(name)?;
        load_file_as(&path, name)
    }

    /// Delete every file for `name`, returning the removed paths
    pub fn remove(&self, name: &str) -> Result<Vec<PathBuf>> {
        let files = self.files_for(name);
        if files.is_empty() {
            return Err(Error::WorkflowNotFound(format!("'{}'", name)));
        }

        for file in &files {
            std::fs::remove_file(file)?;
            info!("Removed {}", file.display());
        }

        Ok(files)
    }

    /// Write `example.<ext>` unless an example already exists
    pub fn write_example(&self, format: FileFormat) -> Result<Option<PathBuf>> {
        if !self.files_for("example").is_empty() {
            debug!("Example workflow already present, skipping");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("example.{}", format.extension()));
        std::fs::write(&path, format.render(&Workflow::example())?)?;
        Ok(Some(path))
    }
}

/// Load and validate a workflow from an explicit file path
pub fn load_file(path: &Path) -> Result<Workflow> {
    if !path.is_file() {
        return Err(Error::WorkflowNotFound(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workflow")
        .to_string();
    load_file_as(path, &name)
}

fn load_file_as(path: &Path, name: &str) -> Result<Workflow> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    let workflow: Workflow = format.parse(&content).map_err(|e| {
        Error::WorkflowSchema(format!("{}: {}", name, schema_reason(e)))
    })?;
    workflow.validate(name)?;

    debug!(
        "Loaded workflow '{}' ({} steps, {} apps) from {}",
        name,
        workflow.steps.len(),
        workflow.app_count(),
        path.display()
    );
    Ok(workflow)
}

fn schema_reason(err: Error) -> String {
    match err {
        Error::Yaml(e) => e.to_string(),
        Error::Json(e) => e.to_string(),
        Error::Toml(e) => e.to_string(),
        other => other.to_string(),
    }
}
