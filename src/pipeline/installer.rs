use anyhow::{Context, Result};

use super::{CommandRunner, ProjectContext};
use crate::scaffold::DependencyGroup;

pub fn init_argv(package_manager: &str) -> Vec<String> {
    vec![package_manager.to_owned(), "init".to_owned(), "-y".to_owned()]
}

/// Create the initial `package.json` through the package manager.
pub fn bootstrap_manifest(
    ctx: &ProjectContext,
    runner: &dyn CommandRunner,
    package_manager: &str,
) -> Result<()> {
    tracing::info!(package_manager, "initializing package manifest");
    runner.run(ctx.root(), &init_argv(package_manager))
}

/// Install each group with its own invocation, in order. The first failure
/// stops the run; groups already installed stay installed.
pub fn install_groups(
    ctx: &ProjectContext,
    runner: &dyn CommandRunner,
    package_manager: &str,
    groups: &[DependencyGroup],
) -> Result<()> {
    let total = groups.len();
    for (idx, group) in groups.iter().enumerate() {
        println!("[{}/{}] installing {}", idx + 1, total, group.name);
        tracing::info!(group = group.name, "installing dependency group");
        runner
            .run(ctx.root(), &group.argv(package_manager))
            .with_context(|| format!("installing dependency group `{}`", group.name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScaffoldError;
    use crate::pipeline::command::fake::RecordingRunner;
    use crate::scaffold::TemplateKind;
    use camino::Utf8Path;

    fn context(tmp: &tempfile::TempDir) -> ProjectContext {
        ProjectContext::create(Utf8Path::from_path(tmp.path()).unwrap(), "demo").unwrap()
    }

    #[test]
    fn groups_run_in_declared_order_inside_project() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(&tmp);
        let runner = RecordingRunner::default();
        let groups = TemplateKind::BrowserBundle.descriptor().dependency_groups;

        install_groups(&ctx, &runner, "npm", &groups).unwrap();

        let expected: Vec<Vec<String>> = groups.iter().map(|group| group.argv("npm")).collect();
        assert_eq!(runner.argvs(), expected);
        assert!(runner.calls.borrow().iter().all(|(cwd, _)| cwd == ctx.root()));
    }

    #[test]
    fn first_failure_stops_installation() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(&tmp);
        let runner = RecordingRunner {
            fail_at: Some(1),
            ..RecordingRunner::default()
        };
        let groups = TemplateKind::Library.descriptor().dependency_groups;

        let err = install_groups(&ctx, &runner, "npm", &groups).unwrap_err();

        assert_eq!(runner.argvs().len(), 2);
        assert!(err.to_string().contains("installing dependency group `runner`"));
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::ExternalToolFailure { code: Some(1), .. })
        ));
    }

    #[test]
    fn bootstrap_uses_configured_package_manager() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(&tmp);
        let runner = RecordingRunner::default();

        bootstrap_manifest(&ctx, &runner, "pnpm").unwrap();
        assert_eq!(runner.argvs(), vec![vec!["pnpm", "init", "-y"]]);
    }
}
