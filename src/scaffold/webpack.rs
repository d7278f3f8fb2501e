//! Typed model of `webpack.config.js` and a small renderer for the subset of
//! JavaScript object syntax the config needs.

use std::fmt::Write as _;

const INDENT: &str = "  ";

/// A JavaScript expression as it appears in a config module.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Str(String),
    Number(u64),
    Bool(bool),
    Regex { pattern: String, flags: String },
    /// Emitted verbatim, e.g. `path.resolve(__dirname, 'dist')`.
    Expr(String),
    Array(Vec<JsValue>),
    Object(Vec<(String, JsValue)>),
    New { constructor: String, options: Box<JsValue> },
}

impl JsValue {
    pub fn str(value: &str) -> Self {
        JsValue::Str(value.to_owned())
    }

    pub fn expr(value: impl Into<String>) -> Self {
        JsValue::Expr(value.into())
    }

    pub fn object(entries: Vec<(&str, JsValue)>) -> Self {
        JsValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        )
    }

    fn is_scalar(&self) -> bool {
        !matches!(
            self,
            JsValue::Array(_) | JsValue::Object(_) | JsValue::New { .. }
        )
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        match self {
            JsValue::Str(value) => write_str(out, value),
            JsValue::Number(value) => {
                let _ = write!(out, "{value}");
            }
            JsValue::Bool(value) => {
                let _ = write!(out, "{value}");
            }
            JsValue::Regex { pattern, flags } => {
                let _ = write!(out, "/{pattern}/{flags}");
            }
            JsValue::Expr(expr) => out.push_str(expr),
            JsValue::Array(items) if items.iter().all(JsValue::is_scalar) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    item.write(out, depth);
                }
                out.push(']');
            }
            JsValue::Array(items) => {
                out.push_str("[\n");
                for item in items {
                    push_indent(out, depth + 1);
                    item.write(out, depth + 1);
                    out.push_str(",\n");
                }
                push_indent(out, depth);
                out.push(']');
            }
            JsValue::Object(entries) if entries.is_empty() => out.push_str("{}"),
            JsValue::Object(entries) => {
                out.push_str("{\n");
                for (key, value) in entries {
                    push_indent(out, depth + 1);
                    let _ = write!(out, "{key}: ");
                    value.write(out, depth + 1);
                    out.push_str(",\n");
                }
                push_indent(out, depth);
                out.push('}');
            }
            JsValue::New {
                constructor,
                options,
            } => {
                let _ = write!(out, "new {constructor}(");
                options.write(out, depth);
                out.push(')');
            }
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_str(out: &mut String, value: &str) {
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('\'');
}

/// How a rule's matched modules are transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loader {
    Named(String),
    /// The loader exported by the CSS extraction plugin.
    CssExtract,
}

impl Loader {
    fn to_js(&self) -> JsValue {
        match self {
            Loader::Named(name) => JsValue::str(name),
            Loader::CssExtract => JsValue::expr(format!("{CSS_EXTRACT_IDENT}.loader")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub test: String,
    pub case_insensitive: bool,
    pub exclude: Option<String>,
    /// Applied right to left by webpack, listed here in webpack order.
    pub loaders: Vec<Loader>,
}

impl Rule {
    fn to_js(&self) -> JsValue {
        let mut entries = vec![(
            "test",
            JsValue::Regex {
                pattern: self.test.clone(),
                flags: if self.case_insensitive { "i" } else { "" }.to_owned(),
            },
        )];
        if let Some(exclude) = &self.exclude {
            entries.push((
                "exclude",
                JsValue::Regex {
                    pattern: exclude.clone(),
                    flags: String::new(),
                },
            ));
        }
        let usage = match self.loaders.as_slice() {
            [single] => single.to_js(),
            many => JsValue::Array(many.iter().map(Loader::to_js).collect()),
        };
        entries.push(("use", usage));
        JsValue::object(entries)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPlugin {
    pub template: String,
    pub inject: bool,
    pub minify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssExtractPlugin {
    pub filename: String,
    pub chunk_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServer {
    /// Static files directory, relative to the config file.
    pub static_dir: String,
    pub compress: bool,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerConfig {
    pub entry: String,
    pub output_filename: String,
    /// Output directory, relative to the config file.
    pub output_dir: String,
    pub rules: Vec<Rule>,
    pub extensions: Vec<String>,
    pub html: HtmlPlugin,
    pub css: CssExtractPlugin,
    pub dev_server: DevServer,
    pub stats: String,
}

const HTML_PLUGIN_IDENT: &str = "HtmlWebpackPlugin";
const CSS_EXTRACT_IDENT: &str = "MiniCssExtractPlugin";

impl BundlerConfig {
    pub fn browser_bundle() -> Self {
        Self {
            entry: "./src/index.ts".to_owned(),
            output_filename: "bundle.js".to_owned(),
            output_dir: "dist".to_owned(),
            rules: vec![
                Rule {
                    test: r"\.ts$".to_owned(),
                    case_insensitive: false,
                    exclude: Some("node_modules".to_owned()),
                    loaders: vec![Loader::Named("babel-loader".to_owned())],
                },
                Rule {
                    test: r"\.css$".to_owned(),
                    case_insensitive: true,
                    exclude: None,
                    loaders: vec![Loader::CssExtract, Loader::Named("css-loader".to_owned())],
                },
            ],
            extensions: vec![".ts".to_owned(), ".js".to_owned()],
            html: HtmlPlugin {
                template: "./index.html".to_owned(),
                inject: true,
                minify: false,
            },
            css: CssExtractPlugin {
                filename: "main.css".to_owned(),
                chunk_filename: "main.css".to_owned(),
            },
            dev_server: DevServer {
                static_dir: "dist".to_owned(),
                compress: true,
                port: 3000,
            },
            stats: "errors-only".to_owned(),
        }
    }

    pub fn to_js(&self) -> JsValue {
        JsValue::object(vec![
            ("entry", JsValue::str(&self.entry)),
            (
                "output",
                JsValue::object(vec![
                    ("filename", JsValue::str(&self.output_filename)),
                    ("path", resolve_dir(&self.output_dir)),
                ]),
            ),
            (
                "module",
                JsValue::object(vec![(
                    "rules",
                    JsValue::Array(self.rules.iter().map(Rule::to_js).collect()),
                )]),
            ),
            (
                "resolve",
                JsValue::object(vec![(
                    "extensions",
                    JsValue::Array(self.extensions.iter().map(|ext| JsValue::str(ext)).collect()),
                )]),
            ),
            (
                "plugins",
                JsValue::Array(vec![
                    JsValue::New {
                        constructor: HTML_PLUGIN_IDENT.to_owned(),
                        options: Box::new(JsValue::object(vec![
                            ("template", JsValue::str(&self.html.template)),
                            ("inject", JsValue::Bool(self.html.inject)),
                            ("minify", JsValue::Bool(self.html.minify)),
                        ])),
                    },
                    JsValue::New {
                        constructor: CSS_EXTRACT_IDENT.to_owned(),
                        options: Box::new(JsValue::object(vec![
                            ("filename", JsValue::str(&self.css.filename)),
                            ("chunkFilename", JsValue::str(&self.css.chunk_filename)),
                        ])),
                    },
                ]),
            ),
            (
                "devServer",
                JsValue::object(vec![
                    (
                        "static",
                        JsValue::object(vec![("directory", resolve_dir(&self.dev_server.static_dir))]),
                    ),
                    ("compress", JsValue::Bool(self.dev_server.compress)),
                    ("port", JsValue::Number(u64::from(self.dev_server.port))),
                ]),
            ),
            ("stats", JsValue::str(&self.stats)),
        ])
    }

    /// Render the complete CommonJS module.
    pub fn render_module(&self) -> String {
        let mut out = String::new();
        out.push_str("const path = require('path');\n");
        let _ = writeln!(out, "const {HTML_PLUGIN_IDENT} = require('html-webpack-plugin');");
        let _ = writeln!(out, "const {CSS_EXTRACT_IDENT} = require('mini-css-extract-plugin');");
        out.push('\n');
        out.push_str("module.exports = ");
        out.push_str(&self.to_js().render());
        out.push_str(";\n");
        out
    }
}

fn resolve_dir(dir: &str) -> JsValue {
    let mut expr = String::from("path.resolve(__dirname, ");
    write_str(&mut expr, dir);
    expr.push(')');
    JsValue::Expr(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_arrays_render_inline() {
        let value = JsValue::Array(vec![JsValue::str(".ts"), JsValue::str(".js")]);
        assert_eq!(value.render(), "['.ts', '.js']");
    }

    #[test]
    fn strings_escape_quotes() {
        assert_eq!(JsValue::str("it's").render(), r"'it\'s'");
    }

    #[test]
    fn nested_objects_indent_by_two_spaces() {
        let value = JsValue::object(vec![(
            "a",
            JsValue::object(vec![("b", JsValue::Number(1))]),
        )]);
        assert_eq!(value.render(), "{\n  a: {\n    b: 1,\n  },\n}");
    }

    #[test]
    fn module_declares_output_and_dev_server() {
        let module = BundlerConfig::browser_bundle().render_module();
        assert!(module.starts_with("const path = require('path');\n"));
        assert!(module.contains("    filename: 'bundle.js',\n"));
        assert!(module.contains("    path: path.resolve(__dirname, 'dist'),\n"));
        assert!(module.contains("        test: /\\.ts$/,\n        exclude: /node_modules/,\n        use: 'babel-loader',\n"));
        assert!(module.contains("        test: /\\.css$/i,\n        use: [MiniCssExtractPlugin.loader, 'css-loader'],\n"));
        assert!(module.contains("    extensions: ['.ts', '.js'],\n"));
        assert!(module.contains("    new HtmlWebpackPlugin({\n      template: './index.html',\n      inject: true,\n      minify: false,\n    }),\n"));
        assert!(module.contains("      chunkFilename: 'main.css',\n"));
        assert!(module.contains("    compress: true,\n    port: 3000,\n"));
        assert!(module.ends_with("  stats: 'errors-only',\n};\n"));
    }
}
