//! Template descriptors and the file-materialization engine.
//!
//! A [`TemplateDescriptor`] is plain data: which directories to create, which
//! package-manager invocations to run, which files to generate and which
//! manifest scripts to install. Everything here is free of filesystem access
//! except [`materialize`].

mod browser;
mod library;
mod materialize;
pub mod tsconfig;
pub mod webpack;

use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Context, Result};
use camino::{Utf8Component, Utf8Path};
use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ScaffoldError;

pub use materialize::materialize;

/// The scaffolding variants offered by `tskit new`.
#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// TypeScript compiler plus a unit-test runner.
    Library,
    /// TypeScript through Babel, bundled by webpack with a dev server.
    #[value(name = "browser")]
    #[serde(rename = "browser")]
    BrowserBundle,
}

impl TemplateKind {
    pub fn all() -> [TemplateKind; 2] {
        [TemplateKind::Library, TemplateKind::BrowserBundle]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Library => "library",
            TemplateKind::BrowserBundle => "browser",
        }
    }

    pub fn descriptor(&self) -> TemplateDescriptor {
        match self {
            TemplateKind::Library => library::descriptor(),
            TemplateKind::BrowserBundle => browser::descriptor(),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packages installed together through one package-manager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub name: &'static str,
    /// Arguments passed after the package-manager program.
    pub args: &'static [&'static str],
}

impl DependencyGroup {
    pub fn argv(&self, package_manager: &str) -> Vec<String> {
        std::iter::once(package_manager)
            .chain(self.args.iter().copied())
            .map(str::to_owned)
            .collect()
    }
}

/// Content produced for a generated file before it is written.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    /// A structured document, written as pretty JSON in field order.
    Json(serde_json::Value),
    /// Literal text, written unchanged.
    Text(String),
}

impl FileContent {
    pub fn render(&self) -> Result<String> {
        match self {
            FileContent::Json(value) => {
                let mut out =
                    serde_json::to_string_pretty(value).context("serializing JSON document")?;
                out.push('\n');
                Ok(out)
            }
            FileContent::Text(text) => Ok(text.clone()),
        }
    }
}

pub type ContentBuilder = fn() -> Result<FileContent>;

#[derive(Clone)]
pub struct GeneratedFile {
    /// Path relative to the project root.
    pub path: &'static str,
    pub build: ContentBuilder,
}

impl fmt::Debug for GeneratedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedFile").field("path", &self.path).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    pub kind: TemplateKind,
    /// Created in order; a nested entry must follow its parent.
    pub directories: Vec<&'static str>,
    pub dependency_groups: Vec<DependencyGroup>,
    pub generated_files: Vec<GeneratedFile>,
    /// Replaces the manifest's `scripts` map, in this order.
    pub manifest_scripts: Vec<(&'static str, &'static str)>,
}

/// A generated file after its builder ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: &'static str,
    pub contents: String,
}

impl TemplateDescriptor {
    /// Check that every path stays inside the project tree and that directories
    /// are listed in creation order.
    pub fn validate(&self) -> Result<()> {
        let mut dirs = BTreeSet::new();
        for dir in &self.directories {
            let path = relative_path(dir)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
                if !dirs.contains(parent.as_str()) {
                    return Err(invalid(format!(
                        "directory `{dir}` is listed before its parent `{parent}`"
                    )));
                }
            }
            if !dirs.insert(path.as_str()) {
                return Err(invalid(format!("directory `{dir}` is listed twice")));
            }
        }

        let mut files = BTreeSet::new();
        for file in &self.generated_files {
            let path = relative_path(file.path)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
                if !dirs.contains(parent.as_str()) {
                    return Err(invalid(format!(
                        "file `{}` is outside the listed directories",
                        file.path
                    )));
                }
            }
            if dirs.contains(path.as_str()) {
                return Err(invalid(format!("`{}` is both a directory and a file", file.path)));
            }
            if !files.insert(path.as_str()) {
                return Err(invalid(format!("file `{}` is listed twice", file.path)));
            }
        }

        let mut scripts = BTreeSet::new();
        for (name, _) in &self.manifest_scripts {
            if !scripts.insert(*name) {
                return Err(invalid(format!("script `{name}` is listed twice")));
            }
        }

        Ok(())
    }

    /// Run every content builder and return the rendered text in file order.
    pub fn render(&self) -> Result<Vec<RenderedFile>> {
        self.generated_files
            .iter()
            .map(|file| {
                let content = (file.build)().with_context(|| format!("building {}", file.path))?;
                let contents = content
                    .render()
                    .with_context(|| format!("rendering {}", file.path))?;
                Ok(RenderedFile {
                    path: file.path,
                    contents,
                })
            })
            .collect()
    }

    pub fn scripts_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.manifest_scripts
            .iter()
            .map(|(name, command)| ((*name).to_owned(), serde_json::Value::from(*command)))
            .collect()
    }
}

fn relative_path(raw: &str) -> Result<&Utf8Path> {
    let path = Utf8Path::new(raw);
    if raw.is_empty() {
        return Err(invalid("empty path".to_owned()));
    }
    if !path
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_)))
    {
        return Err(invalid(format!("`{raw}` must be a plain relative path")));
    }
    Ok(path)
}

fn invalid(reason: String) -> anyhow::Error {
    ScaffoldError::InvalidDescriptor { reason }.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_text() -> Result<FileContent> {
        Ok(FileContent::Text(String::new()))
    }

    fn descriptor_with(directories: Vec<&'static str>, files: Vec<&'static str>) -> TemplateDescriptor {
        TemplateDescriptor {
            kind: TemplateKind::Library,
            directories,
            dependency_groups: Vec::new(),
            generated_files: files
                .into_iter()
                .map(|path| GeneratedFile {
                    path,
                    build: empty_text,
                })
                .collect(),
            manifest_scripts: Vec::new(),
        }
    }

    fn invalid_reason(descriptor: &TemplateDescriptor) -> String {
        match descriptor.validate().unwrap_err().downcast::<ScaffoldError>().unwrap() {
            ScaffoldError::InvalidDescriptor { reason } => reason,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn shipped_templates_validate() {
        for kind in TemplateKind::all() {
            kind.descriptor().validate().unwrap();
        }
    }

    #[test]
    fn shipped_files_stay_inside_listed_directories() {
        for kind in TemplateKind::all() {
            let descriptor = kind.descriptor();
            for file in &descriptor.generated_files {
                let parent = Utf8Path::new(file.path).parent().unwrap();
                assert!(
                    parent.as_str().is_empty()
                        || descriptor.directories.iter().any(|dir| *dir == parent.as_str()),
                    "{} escapes the listed directories",
                    file.path
                );
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        for kind in TemplateKind::all() {
            let first = kind.descriptor().render().unwrap();
            let second = kind.descriptor().render().unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn rejects_parent_traversal() {
        let descriptor = descriptor_with(vec!["src"], vec!["../escape.ts"]);
        assert!(invalid_reason(&descriptor).contains("plain relative path"));
    }

    #[test]
    fn rejects_absolute_paths() {
        let descriptor = descriptor_with(vec!["/tmp"], vec![]);
        assert!(invalid_reason(&descriptor).contains("plain relative path"));
    }

    #[test]
    fn rejects_file_in_unlisted_directory() {
        let descriptor = descriptor_with(vec!["src"], vec!["lib/index.ts"]);
        assert!(invalid_reason(&descriptor).contains("outside the listed directories"));
    }

    #[test]
    fn rejects_nested_directory_before_parent() {
        let descriptor = descriptor_with(vec!["src/components", "src"], vec![]);
        assert!(invalid_reason(&descriptor).contains("before its parent"));
    }

    #[test]
    fn accepts_nested_directory_after_parent() {
        let descriptor = descriptor_with(vec!["src", "src/components"], vec!["src/components/a.ts"]);
        descriptor.validate().unwrap();
    }

    #[test]
    fn group_argv_prefixes_package_manager() {
        let group = DependencyGroup {
            name: "compiler",
            args: &["install", "--save-dev", "typescript"],
        };
        assert_eq!(group.argv("pnpm"), ["pnpm", "install", "--save-dev", "typescript"]);
    }

    #[test]
    fn json_content_is_two_space_indented_with_newline() {
        let content = FileContent::Json(serde_json::json!({ "a": [1] }));
        assert_eq!(content.render().unwrap(), "{\n  \"a\": [\n    1\n  ]\n}\n");
    }
}
