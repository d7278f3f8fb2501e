use anyhow::{Context, Result};
use serde::Serialize;

use super::tsconfig::CompilerConfig;
use super::webpack::BundlerConfig;
use super::{DependencyGroup, FileContent, GeneratedFile, TemplateDescriptor, TemplateKind};
use crate::templates;

/// Contents of `.babelrc`.
#[derive(Debug, Serialize)]
struct TranspilerConfig {
    presets: Vec<&'static str>,
    plugins: Vec<&'static str>,
}

pub fn descriptor() -> TemplateDescriptor {
    TemplateDescriptor {
        kind: TemplateKind::BrowserBundle,
        directories: vec!["src", "dist"],
        dependency_groups: vec![
            DependencyGroup {
                name: "compiler",
                args: &["install", "--save-dev", "typescript"],
            },
            DependencyGroup {
                name: "bundler",
                args: &[
                    "install",
                    "--save-dev",
                    "webpack",
                    "webpack-cli",
                    "webpack-dev-server",
                ],
            },
            DependencyGroup {
                name: "html plugin",
                args: &["install", "--save-dev", "html-webpack-plugin"],
            },
            DependencyGroup {
                name: "style loaders",
                args: &["install", "--save-dev", "style-loader", "css-loader"],
            },
            DependencyGroup {
                name: "css extraction",
                args: &["install", "--save-dev", "mini-css-extract-plugin"],
            },
            DependencyGroup {
                name: "transpiler",
                args: &[
                    "install",
                    "--save-dev",
                    "@babel/core",
                    "@babel/preset-env",
                    "babel-loader",
                ],
            },
            DependencyGroup {
                name: "typescript transform",
                args: &["install", "--save-dev", "@babel/plugin-transform-typescript"],
            },
            DependencyGroup {
                name: "typescript preset",
                args: &["install", "--save-dev", "@babel/preset-typescript"],
            },
        ],
        generated_files: vec![
            GeneratedFile {
                path: "src/index.ts",
                build: starter_source,
            },
            GeneratedFile {
                path: "index.html",
                build: starter_html,
            },
            GeneratedFile {
                path: ".babelrc",
                build: transpiler_config,
            },
            GeneratedFile {
                path: "tsconfig.json",
                build: compiler_config,
            },
            GeneratedFile {
                path: "webpack.config.js",
                build: bundler_config,
            },
        ],
        manifest_scripts: vec![
            ("start", "webpack serve --mode development"),
            ("build", "webpack --mode production"),
        ],
    }
}

fn starter_source() -> Result<FileContent> {
    Ok(FileContent::Text(String::new()))
}

fn starter_html() -> Result<FileContent> {
    let bundle = BundlerConfig::browser_bundle().output_filename;
    templates::render("browser/index.html", &[("bundle", bundle.as_str())]).map(FileContent::Text)
}

fn transpiler_config() -> Result<FileContent> {
    let config = TranspilerConfig {
        presets: vec!["@babel/preset-env", "@babel/preset-typescript"],
        plugins: vec!["@babel/plugin-transform-typescript"],
    };
    let value = serde_json::to_value(config).context("encoding .babelrc")?;
    Ok(FileContent::Json(value))
}

fn compiler_config() -> Result<FileContent> {
    let value =
        serde_json::to_value(CompilerConfig::browser_bundle()).context("encoding tsconfig")?;
    Ok(FileContent::Json(value))
}

fn bundler_config() -> Result<FileContent> {
    Ok(FileContent::Text(BundlerConfig::browser_bundle().render_module()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(path: &str) -> String {
        descriptor()
            .render()
            .unwrap()
            .into_iter()
            .find(|file| file.path == path)
            .unwrap_or_else(|| panic!("{path} not generated"))
            .contents
    }

    #[test]
    fn html_references_bundle() {
        assert!(rendered("index.html").contains(r#"<script src="bundle.js"></script>"#));
    }

    #[test]
    fn starter_source_is_empty() {
        assert_eq!(rendered("src/index.ts"), "");
    }

    #[test]
    fn babelrc_lists_presets_then_plugins() {
        let babelrc: serde_json::Value = serde_json::from_str(&rendered(".babelrc")).unwrap();
        assert_eq!(
            babelrc,
            serde_json::json!({
                "presets": ["@babel/preset-env", "@babel/preset-typescript"],
                "plugins": ["@babel/plugin-transform-typescript"],
            })
        );
    }

    #[test]
    fn webpack_config_outputs_bundle_js() {
        let module = rendered("webpack.config.js");
        assert!(module.contains("filename: 'bundle.js'"));
        assert!(module.contains("new MiniCssExtractPlugin({"));
    }

    #[test]
    fn build_script_uses_production_mode() {
        let scripts = descriptor().scripts_json();
        assert_eq!(scripts["build"], "webpack --mode production");
        assert_eq!(scripts["start"], "webpack serve --mode development");
    }

    #[test]
    fn dev_server_serves_output_dir() {
        let config = BundlerConfig::browser_bundle();
        assert_eq!(config.dev_server.static_dir, config.output_dir);
        assert!(descriptor().directories.iter().any(|dir| *dir == config.output_dir));
    }
}
