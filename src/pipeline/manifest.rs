use std::fs;
use std::io;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::ProjectContext;
use crate::error::ScaffoldError;

pub const MANIFEST_FILE: &str = "package.json";

/// Replace the manifest's `scripts` map with `scripts`.
///
/// Scripts the package manager added on `init` are discarded; every other key
/// keeps its position.
pub fn patch_scripts(ctx: &ProjectContext, scripts: Map<String, Value>) -> Result<()> {
    let path = ctx.resolve(MANIFEST_FILE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ScaffoldError::ManifestMissing { path }.into());
        }
        Err(err) => return Err(anyhow::Error::new(err).context(format!("reading {}", path))),
    };

    let mut manifest: Value =
        serde_json::from_str(&raw).map_err(|err| ScaffoldError::ManifestMalformed {
            path: path.clone(),
            reason: err.to_string(),
        })?;
    let object = manifest
        .as_object_mut()
        .ok_or_else(|| ScaffoldError::ManifestMalformed {
            path: path.clone(),
            reason: "top-level value is not an object".to_owned(),
        })?;
    object.insert("scripts".to_owned(), Value::Object(scripts));

    let mut out = serde_json::to_string_pretty(&manifest).context("serializing package manifest")?;
    out.push('\n');
    fs::write(&path, out).with_context(|| format!("writing {}", path))?;
    tracing::info!(path = %path, "patched manifest scripts");
    Ok(())
}
