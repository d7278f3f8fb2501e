use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use toml_edit::{DocumentMut, value};

use crate::scaffold::TemplateKind;
use crate::templates;

pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";

/// Configuration document, `~/.tskit/config.toml` by default.
#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    pub package_manager: Option<String>,
    pub default_template: Option<TemplateKind>,
    pub log_file: Option<String>,
}

impl ToolConfig {
    pub fn package_manager(&self) -> &str {
        self.package_manager
            .as_deref()
            .unwrap_or(DEFAULT_PACKAGE_MANAGER)
    }

    pub fn log_file(&self) -> Option<Utf8PathBuf> {
        self.log_file.as_deref().map(Utf8PathBuf::from)
    }
}

/// Load a configuration file from disk; a missing file yields defaults.
pub fn load_from_path(path: &Utf8Path) -> Result<ToolConfig> {
    if !path.exists() {
        return Ok(ToolConfig::default());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        anyhow::bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_template(path, "config/example.config.toml")
}

/// Set `default_template`, keeping the rest of the file and its comments.
pub fn set_default_template(path: &Utf8Path, template: TemplateKind) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }

    let mut doc: DocumentMut = if path.exists() {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        raw.parse()
            .with_context(|| format!("parsing config {}", path))?
    } else {
        DocumentMut::new()
    };

    doc["default_template"] = value(template.as_str());

    fs::write(path, doc.to_string()).with_context(|| format!("writing config {}", path))
}

pub fn format_summary(config: &ToolConfig) -> String {
    let mut out = String::new();
    let template = config
        .default_template
        .map(|kind| kind.as_str())
        .unwrap_or("<none>");
    let log_file = config.log_file.as_deref().unwrap_or("<none>");

    let _ = writeln!(out, "Package manager: {}", config.package_manager());
    let _ = writeln!(out, "Default template: {}", template);
    let _ = writeln!(out, "Log file: {}", log_file);
    out
}
