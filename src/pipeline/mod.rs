//! The scaffolding pipeline: create the project directory, bootstrap the
//! package manifest, install dependency groups, materialize the template and
//! patch the manifest scripts. Steps run strictly in that order and the first
//! failure aborts the run without cleaning up.

pub mod command;
mod context;
pub mod installer;
pub mod manifest;

use anyhow::Result;
use camino::Utf8Path;

pub use command::{CommandRunner, ProcessRunner, format_command};
pub use context::ProjectContext;

use crate::scaffold::{self, TemplateDescriptor};

/// Scaffold `parent/name` from `descriptor`.
pub fn run(
    parent: &Utf8Path,
    name: &str,
    descriptor: &TemplateDescriptor,
    runner: &dyn CommandRunner,
    package_manager: &str,
) -> Result<ProjectContext> {
    let span = tracing::info_span!("scaffold", template = %descriptor.kind, project = name);
    let _guard = span.enter();

    descriptor.validate()?;

    println!("Creating project `{}`", name);
    let ctx = ProjectContext::create(parent, name)?;

    println!("Initializing package manifest");
    installer::bootstrap_manifest(&ctx, runner, package_manager)?;

    println!("Installing dependencies");
    installer::install_groups(&ctx, runner, package_manager, &descriptor.dependency_groups)?;

    println!("Writing {} template files", descriptor.kind);
    scaffold::materialize(&ctx, descriptor)?;

    println!("Updating {} scripts", manifest::MANIFEST_FILE);
    manifest::patch_scripts(&ctx, descriptor.scripts_json())?;

    Ok(ctx)
}

/// Describe what [`run`] would do, one line per side effect, without doing it.
pub fn plan(parent: &Utf8Path, name: &str, descriptor: &TemplateDescriptor, package_manager: &str) -> Vec<String> {
    let root = parent.join(name);
    let mut lines = vec![format!("create directory {}", root)];
    lines.push(format!("run {}", format_command(&installer::init_argv(package_manager))));
    for group in &descriptor.dependency_groups {
        lines.push(format!("run {}", format_command(&group.argv(package_manager))));
    }
    for dir in &descriptor.directories {
        lines.push(format!("create directory {}", root.join(dir)));
    }
    for file in &descriptor.generated_files {
        lines.push(format!("write {}", root.join(file.path)));
    }
    for (name, command) in &descriptor.manifest_scripts {
        lines.push(format!("set script {} = {}", name, command));
    }
    lines
}
