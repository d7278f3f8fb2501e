use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::scaffold::TemplateKind;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tskit", version, about = "Scaffold TypeScript projects")]
pub struct Cli {
    /// Configuration file to use instead of the discovered one.
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,
    /// Print what would happen without touching the filesystem.
    #[arg(short = 'n', long = "dry-run", global = true)]
    pub dry_run: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project from a template.
    New(NewArgs),
    /// List the available templates and what each one generates.
    Templates,
    /// Print the files a template would generate.
    Preview(PreviewArgs),
    /// Configuration display and editing.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Project directory to create; prompted for when omitted.
    #[arg()]
    pub name: Option<String>,
    #[arg(short = 't', long = "template", value_enum)]
    pub template: Option<TemplateKind>,
    /// Package manager program used for `init` and `install`.
    #[arg(long = "package-manager")]
    pub package_manager: Option<String>,
    /// Append every package-manager invocation and its output to this file.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[arg(short = 't', long = "template", value_enum)]
    pub template: TemplateKind,
    /// Only print the file at this project-relative path.
    #[arg()]
    pub file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Path,
    Generate {
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
    /// Set the template `tskit new` uses when `--template` is omitted.
    SetTemplate {
        #[arg(value_enum)]
        template: TemplateKind,
    },
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn new_accepts_template_names() {
        let cli = Cli::try_parse_from(["tskit", "new", "webapp", "-t", "browser", "-n"]).unwrap();
        assert!(cli.dry_run);
        let Command::New(args) = cli.command else {
            panic!("expected new");
        };
        assert_eq!(args.name.as_deref(), Some("webapp"));
        assert_eq!(args.template, Some(TemplateKind::BrowserBundle));
    }

    #[test]
    fn preview_requires_template() {
        assert!(Cli::try_parse_from(["tskit", "preview"]).is_err());
    }
}
