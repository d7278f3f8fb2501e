use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ScaffoldError;

/// The project being scaffolded. Every step after creation resolves its
/// paths through this value instead of the process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    name: String,
    root: Utf8PathBuf,
}

impl ProjectContext {
    /// Create `parent/name` and return a context rooted at its absolute path.
    ///
    /// Only that single directory is created; `parent` must already exist.
    pub fn create(parent: &Utf8Path, name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(ScaffoldError::EmptyProjectName.into());
        }

        let root = parent.join(name);
        if root.symlink_metadata().is_ok() {
            return Err(ScaffoldError::PathConflict { path: root }.into());
        }

        fs::create_dir(&root).map_err(|err| ScaffoldError::from_create_dir(&root, err))?;
        let root = root
            .canonicalize_utf8()
            .with_context(|| format!("resolving {}", root))?;
        tracing::info!(root = %root, "created project directory");

        Ok(Self {
            name: name.to_owned(),
            root,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn resolve(&self, relative: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        self.root.join(relative)
    }
}
