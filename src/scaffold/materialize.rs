use std::fs;

use anyhow::Result;
use camino::Utf8PathBuf;

use super::TemplateDescriptor;
use crate::error::ScaffoldError;
use crate::pipeline::ProjectContext;

/// Create the descriptor's directories and write every generated file under
/// the project root. Returns the written file paths in order.
///
/// All content is rendered before the first directory is created, so a
/// failing builder leaves the tree untouched.
pub fn materialize(ctx: &ProjectContext, descriptor: &TemplateDescriptor) -> Result<Vec<Utf8PathBuf>> {
    descriptor.validate()?;
    let files = descriptor.render()?;

    for dir in &descriptor.directories {
        let path = ctx.resolve(dir);
        fs::create_dir(&path).map_err(|err| ScaffoldError::from_create_dir(&path, err))?;
        tracing::debug!(path = %path, "created directory");
        println!("  created {}/", dir);
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = ctx.resolve(file.path);
        fs::write(&path, file.contents.as_bytes())
            .map_err(|err| ScaffoldError::from_write(&path, err))?;
        tracing::debug!(path = %path, bytes = file.contents.len(), "wrote file");
        println!("  created {}", file.path);
        written.push(path);
    }

    Ok(written)
}
