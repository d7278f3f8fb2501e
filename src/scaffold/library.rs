use anyhow::{Context, Result};

use super::tsconfig::CompilerConfig;
use super::{DependencyGroup, FileContent, GeneratedFile, TemplateDescriptor, TemplateKind};
use crate::templates;

/// Printed by the starter source and asserted by the starter test.
pub const GREETING: &str = "Hello, TypeScript!";

pub fn descriptor() -> TemplateDescriptor {
    TemplateDescriptor {
        kind: TemplateKind::Library,
        directories: vec!["src", "test"],
        dependency_groups: vec![
            DependencyGroup {
                name: "compiler",
                args: &["install", "--save-dev", "typescript"],
            },
            DependencyGroup {
                name: "runner",
                args: &["install", "--save-dev", "ts-node"],
            },
            DependencyGroup {
                name: "test runner",
                args: &[
                    "install",
                    "--save-dev",
                    "jest",
                    "@types/jest",
                    "ts-jest",
                    "@jest/globals",
                ],
            },
        ],
        generated_files: vec![
            GeneratedFile {
                path: "tsconfig.json",
                build: compiler_config,
            },
            GeneratedFile {
                path: "jest.config.js",
                build: test_runner_config,
            },
            GeneratedFile {
                path: "src/index.ts",
                build: starter_source,
            },
            GeneratedFile {
                path: "test/sample.test.ts",
                build: starter_test,
            },
        ],
        manifest_scripts: vec![
            ("test", "jest"),
            ("build", "tsc"),
            ("start", "npm run test && ts-node src/index.ts"),
        ],
    }
}

fn compiler_config() -> Result<FileContent> {
    let value = serde_json::to_value(CompilerConfig::library()).context("encoding tsconfig")?;
    Ok(FileContent::Json(value))
}

fn test_runner_config() -> Result<FileContent> {
    templates::get_string("library/jest.config.js").map(FileContent::Text)
}

fn starter_source() -> Result<FileContent> {
    templates::render("library/index.ts", &[("greeting", GREETING)]).map(FileContent::Text)
}

fn starter_test() -> Result<FileContent> {
    templates::render("library/sample.test.ts", &[("greeting", GREETING)]).map(FileContent::Text)
}
