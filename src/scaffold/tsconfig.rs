//! Typed model of `tsconfig.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    pub compiler_options: CompilerOptions,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub target: String,
    pub module: String,
    pub strict: bool,
    pub out_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es_module_interop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_json_module: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_resolution: Option<String>,
}

pub const DEPENDENCY_DIR: &str = "node_modules";

impl CompilerConfig {
    pub fn library() -> Self {
        Self {
            compiler_options: CompilerOptions {
                target: "ES2018".to_owned(),
                module: "commonjs".to_owned(),
                strict: true,
                out_dir: "dist".to_owned(),
                es_module_interop: Some(true),
                resolve_json_module: None,
                module_resolution: None,
            },
            include: vec!["src".to_owned()],
            exclude: vec![DEPENDENCY_DIR.to_owned()],
        }
    }

    pub fn browser_bundle() -> Self {
        Self {
            compiler_options: CompilerOptions {
                target: "es5".to_owned(),
                module: "commonjs".to_owned(),
                strict: false,
                out_dir: "./dist".to_owned(),
                es_module_interop: None,
                resolve_json_module: Some(true),
                module_resolution: Some("node".to_owned()),
            },
            include: vec!["src/**/*.ts".to_owned(), "src/*.json".to_owned()],
            exclude: vec![DEPENDENCY_DIR.to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::FileContent;

    fn round_trip(config: &CompilerConfig) -> (serde_json::Value, CompilerConfig) {
        let text = FileContent::Json(serde_json::to_value(config).unwrap())
            .render()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let parsed: CompilerConfig = serde_json::from_str(&text).unwrap();
        (value, parsed)
    }

    #[test]
    fn library_round_trips_with_fixed_keys() {
        let config = CompilerConfig::library();
        let (value, parsed) = round_trip(&config);
        assert_eq!(parsed, config);

        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["compilerOptions", "include", "exclude"]);
        let options: Vec<_> = value["compilerOptions"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(options, ["target", "module", "strict", "outDir", "esModuleInterop"]);
        assert_eq!(value["compilerOptions"]["strict"], true);
        assert_eq!(value["compilerOptions"]["target"], "ES2018");
    }

    #[test]
    fn browser_bundle_round_trips_with_resolution_options() {
        let config = CompilerConfig::browser_bundle();
        let (value, parsed) = round_trip(&config);
        assert_eq!(parsed, config);

        let options = value["compilerOptions"].as_object().unwrap();
        assert_eq!(options["strict"], false);
        assert_eq!(options["target"], "es5");
        assert_eq!(options["resolveJsonModule"], true);
        assert_eq!(options["moduleResolution"], "node");
        assert!(!options.contains_key("esModuleInterop"));
        assert_eq!(value["include"], serde_json::json!(["src/**/*.ts", "src/*.json"]));
    }

    #[test]
    fn every_variant_excludes_dependency_dir() {
        for config in [CompilerConfig::library(), CompilerConfig::browser_bundle()] {
            assert!(config.exclude.iter().any(|dir| dir == DEPENDENCY_DIR));
        }
    }
}
