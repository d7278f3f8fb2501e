use std::io;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

use crate::cli::{Cli, Command, ConfigCommand, NewArgs, PreviewArgs};
use crate::config::{self, ToolConfig};
use crate::pipeline::{self, ProcessRunner};
use crate::scaffold::{RenderedFile, TemplateKind};

const PROMPT: &str = "Enter the project name: ";
const LOCAL_CONFIG: &str = ".tskit.toml";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConfigPathSource {
    Explicit,
    Discovered,
    HomeDefault,
}

impl ConfigPathSource {
    fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::HomeDefault => "home-default",
        }
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfigPath {
    path: Utf8PathBuf,
    source: ConfigPathSource,
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from_cli(&cli)?;

    match cli.command {
        Command::Config { command } => handle_config(&ctx, command),
        Command::Templates => handle_templates(),
        Command::Preview(args) => handle_preview(args),
        Command::New(args) => {
            let state = AppState::new(ctx)?;
            handle_new(&state, args)
        }
    }
}

fn handle_new(state: &AppState, args: NewArgs) -> Result<()> {
    let template = select_template(args.template, &state.config)?;
    let name = match args.name {
        Some(name) => name,
        None => prompt(PROMPT)?,
    };
    let package_manager = args
        .package_manager
        .unwrap_or_else(|| state.config.package_manager().to_owned());
    let log_file = match args.log_file {
        Some(path) => Some(
            Utf8PathBuf::from_path_buf(path).map_err(|_| anyhow!("log file path must be valid UTF-8"))?,
        ),
        None => state.config.log_file(),
    };

    let descriptor = template.descriptor();
    if state.ctx.dry_run {
        println!(
            "[dry-run] would scaffold `{}` from the {} template:",
            name, template
        );
        for line in pipeline::plan(&state.ctx.cwd, &name, &descriptor, &package_manager) {
            println!("  {}", line);
        }
        return Ok(());
    }

    let runner = ProcessRunner::new(log_file);
    let project = pipeline::run(&state.ctx.cwd, &name, &descriptor, &runner, &package_manager)?;
    tracing::info!(project = project.name(), root = %project.root(), "scaffold finished");
    println!("Project setup complete!");
    Ok(())
}

fn select_template(requested: Option<TemplateKind>, config: &ToolConfig) -> Result<TemplateKind> {
    requested
        .or(config.default_template)
        .ok_or_else(|| anyhow!("no template selected; pass --template or set default_template"))
}

fn handle_templates() -> Result<()> {
    for kind in TemplateKind::all() {
        let descriptor = kind.descriptor();
        println!("{}", kind);
        println!("  directories: {}", descriptor.directories.join(", "));
        println!("  dependency groups:");
        for group in &descriptor.dependency_groups {
            println!("    - {}: {}", group.name, group.args.join(" "));
        }
        println!("  files:");
        for file in &descriptor.generated_files {
            println!("    - {}", file.path);
        }
        println!("  scripts:");
        for (name, command) in &descriptor.manifest_scripts {
            println!("    - {}: {}", name, command);
        }
    }
    Ok(())
}

fn handle_preview(args: PreviewArgs) -> Result<()> {
    let rendered = args.template.descriptor().render()?;
    let selected = select_preview(rendered, args.file.as_deref())?;
    for file in selected {
        println!("==> {} <==", file.path);
        print!("{}", file.contents);
        if !file.contents.is_empty() && !file.contents.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn select_preview(rendered: Vec<RenderedFile>, wanted: Option<&str>) -> Result<Vec<RenderedFile>> {
    let Some(wanted) = wanted else {
        return Ok(rendered);
    };
    let available = rendered
        .iter()
        .map(|file| file.path)
        .collect::<Vec<_>>()
        .join(", ");
    let file = rendered
        .into_iter()
        .find(|file| file.path == wanted)
        .with_context(|| format!("template does not generate `{wanted}` (available: {available})"))?;
    Ok(vec![file])
}

fn handle_config(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    let resolved = ctx.resolve_config_path()?;
    let config_path = resolved.path;
    match command {
        Some(ConfigCommand::Path) => {
            println!("Config path: {} ({})", config_path, resolved.source.as_str());
            Ok(())
        }
        None | Some(ConfigCommand::Show) => {
            if !config_path.exists() {
                println!("No config found at {}.", config_path);
                println!("Use `tskit config generate` to scaffold a default configuration.");
                return Ok(());
            }

            let config = config::load_from_path(&config_path)?;
            println!("Config path: {} ({})", config_path, resolved.source.as_str());
            print!("{}", config::format_summary(&config));
            Ok(())
        }
        Some(ConfigCommand::Generate { force }) => {
            if ctx.dry_run {
                println!("[dry-run] would write example config to {}", config_path);
                return Ok(());
            }
            config::write_example_config(&config_path, force)?;
            if force {
                println!("Overwrote config at {}", config_path);
            } else {
                println!("Wrote example config to {}", config_path);
            }
            Ok(())
        }
        Some(ConfigCommand::SetTemplate { template }) => {
            if ctx.dry_run {
                println!("[dry-run] would set default template `{}` in {}", template, config_path);
                return Ok(());
            }
            config::set_default_template(&config_path, template)?;
            println!(
                "Default template set to `{}` in {} ({})",
                template,
                config_path,
                resolved.source.as_str()
            );
            Ok(())
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::Write::flush(&mut io::stdout()).with_context(|| format!("writing prompt `{label}`"))?;
    let mut buf = String::new();
    io::stdin()
        .read_line(&mut buf)
        .with_context(|| format!("reading input for `{label}`"))?;
    Ok(buf.trim_end_matches(['\n', '\r']).to_owned())
}

#[derive(Clone, Debug)]
struct CliContext {
    cwd: Utf8PathBuf,
    file: Option<Utf8PathBuf>,
    dry_run: bool,
}

impl CliContext {
    fn resolve_config_path(&self) -> Result<ResolvedConfigPath> {
        if let Some(path) = &self.file {
            return Ok(ResolvedConfigPath {
                path: path.clone(),
                source: ConfigPathSource::Explicit,
            });
        }

        if let Some(path) = discover_local_config(&self.cwd) {
            return Ok(ResolvedConfigPath {
                path,
                source: ConfigPathSource::Discovered,
            });
        }

        let home = dirs::home_dir().ok_or_else(|| anyhow!("unable to determine home directory"))?;
        let mut path = home;
        path.push(".tskit");
        path.push("config.toml");
        let path = Utf8PathBuf::from_path_buf(path).map_err(|_| anyhow!("config path must be valid UTF-8"))?;
        Ok(ResolvedConfigPath {
            path,
            source: ConfigPathSource::HomeDefault,
        })
    }
}

fn discover_local_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(LOCAL_CONFIG))
        .find(|candidate| candidate.is_file())
}

impl CliContext {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("determining current directory")?;
        let cwd = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| anyhow!("current directory must be valid UTF-8"))?;
        let file = cli
            .file
            .clone()
            .map(Utf8PathBuf::from_path_buf)
            .transpose()
            .map_err(|_| anyhow!("config path must be valid UTF-8"))?;
        Ok(Self {
            cwd,
            file,
            dry_run: cli.dry_run,
        })
    }
}

struct AppState {
    ctx: CliContext,
    config: ToolConfig,
}

impl AppState {
    fn new(ctx: CliContext) -> Result<Self> {
        let resolved = ctx.resolve_config_path()?;
        let config = config::load_from_path(&resolved.path)?;
        tracing::debug!(path = %resolved.path, source = resolved.source.as_str(), "loaded config");
        Ok(Self { ctx, config })
    }
}
