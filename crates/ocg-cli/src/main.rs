use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use ocg_core::config::{self, CONFIG_FILE_NAME, NamingStrategy, OcgConfig, SplitBy};
use ocg_core::ir::{IrArgumentSource, IrModelKind, IrOperation, IrResponse, IrSpec, IrType};
use ocg_core::parse;
use ocg_core::parse::spec::ApiDocument;
use ocg_core::transform::{self, TransformOptions};
use ocg_core::version::Capability;
use ocg_core::{CodeGenerator, GeneratedFile};
use ocg_python_client::PythonClientGenerator;

#[derive(Parser)]
#[command(
    name = "ocg",
    about = "Typed Python client generator for Swagger 2.0 and OpenAPI 3.x",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Python client package from a spec
    Generate(GenerateArgs),

    /// Validate a spec
    Validate {
        /// Path to the spec file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the resolved IR of a spec
    Inspect {
        /// Path to the spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new ocg configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// Path to the spec file (defaults to `input` from the config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (defaults to `output` from the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How operations are grouped into API classes
    #[arg(long)]
    split_by: Option<SplitArg>,

    /// How method names are derived
    #[arg(long)]
    naming: Option<NamingArg>,

    /// Name of the API class in the single-class layout
    #[arg(long)]
    service_name: Option<String>,

    /// Base URL baked into the generated client
    #[arg(long)]
    base_url: Option<String>,

    /// Leave docstrings out of the generated code
    #[arg(long)]
    no_docstrings: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SplitArg {
    Single,
    Tag,
    Route,
}

impl From<SplitArg> for SplitBy {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::Single => SplitBy::Single,
            SplitArg::Tag => SplitBy::Tag,
            SplitArg::Route => SplitBy::Route,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NamingArg {
    OperationId,
    Route,
}

impl From<NamingArg> for NamingStrategy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::OperationId => NamingStrategy::UseOperationId,
            NamingArg::Route => NamingStrategy::UseRouteBased,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "ocg", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OcgConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Layer command-line flags over the loaded config.
fn apply_overrides(cfg: &mut OcgConfig, args: &GenerateArgs) {
    if let Some(input) = &args.input {
        cfg.input = input.display().to_string();
    }
    if let Some(output) = &args.output {
        cfg.output = output.display().to_string();
    }
    if let Some(split_by) = args.split_by {
        cfg.client.split_by = split_by.into();
    }
    if let Some(naming) = args.naming {
        cfg.naming.strategy = naming.into();
    }
    if let Some(service_name) = &args.service_name {
        cfg.client.service_name = Some(service_name.clone());
    }
    if let Some(base_url) = &args.base_url {
        cfg.client.base_url = Some(base_url.clone());
    }
    if args.no_docstrings {
        cfg.client.no_docstrings = true;
    }
}

fn read_document(path: &Path) -> Result<ApiDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    Ok(parsed)
}

fn load_spec(path: &Path, cfg: &OcgConfig) -> Result<IrSpec> {
    let parsed = read_document(path)?;

    let options = TransformOptions {
        naming_strategy: cfg.naming.strategy,
        aliases: cfg.naming.aliases.clone(),
    };

    let ir = transform::transform_with_options(&parsed, &options)
        .with_context(|| format!("failed to process {}", path.display()))?;
    Ok(ir)
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
    }
    Ok(())
}

/// Generate the "do not edit" README.
fn readme_content() -> &'static str {
    r#"# Generated Code - Do Not Edit

This package is generated by `ocg`. Any manual changes will be overwritten
the next time `ocg generate` is run.

To regenerate, run:
```
ocg generate
```

To customize the generated output, edit your `.ocg.yaml` configuration file.
"#
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();
    apply_overrides(&mut cfg, &args);

    let input = PathBuf::from(&cfg.input);
    let ir = load_spec(&input, &cfg)?;

    eprintln!(
        "Generating {} ({} {}) → {}",
        ir.info.title, ir.version.family, ir.version.normalized, cfg.output
    );

    // Everything is rendered before the first file is written.
    let mut files = PythonClientGenerator
        .generate(&ir, &cfg.client)
        .map_err(|e| anyhow::anyhow!(e))?;
    files.push(GeneratedFile {
        path: "README.md".to_string(),
        content: readme_content().to_string(),
    });

    let output_dir = PathBuf::from(&cfg.output);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    write_files(&output_dir, &files)?;

    eprintln!(
        "Generated {} files in {} ({} models, {} operations)",
        files.len(),
        output_dir.display(),
        ir.models.len(),
        ir.operations.len()
    );
    eprintln!(
        "\nThe generated directory should not be edited manually; changes will be overwritten."
    );
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let parsed = read_document(&input)?;
    let version = parsed.spec_version()?;

    eprintln!(
        "Valid {} {} document: {}",
        version.key.as_str(),
        version.normalized(),
        parsed.info.title
    );
    eprintln!("  Family: {}", version.family);
    eprintln!("  API version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    // Also validate that it transforms to IR successfully
    let ir = transform::transform(&parsed)?;
    eprintln!("  Capabilities: {}", supported_capabilities(&ir).join(", "));
    eprintln!("  Models: {}", ir.models.len());
    eprintln!("  Operations: {}", ir.operations.len());
    eprintln!("  Webhooks: {}", ir.webhooks.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let ir = load_spec(&input, &cfg)?;

    let summary = build_inspect_summary(&ir);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn supported_capabilities(ir: &IrSpec) -> Vec<&'static str> {
    Capability::ALL
        .iter()
        .filter(|c| ir.version.capabilities.supports(**c))
        .map(Capability::as_str)
        .collect()
}

/// Compact, language-neutral rendering of a type descriptor.
fn describe_type(ty: &IrType) -> String {
    match ty {
        IrType::String => "string".to_string(),
        IrType::Integer => "integer".to_string(),
        IrType::Number => "number".to_string(),
        IrType::Boolean => "boolean".to_string(),
        IrType::Numeric => "numeric".to_string(),
        IrType::Map => "map".to_string(),
        IrType::Any => "any".to_string(),
        IrType::Array(inner) => format!("array<{}>", describe_type(inner)),
        IrType::Model(name) => name.clone(),
        IrType::Nullable(inner) => format!("{}?", describe_type(inner)),
    }
}

fn operation_summary(op: &IrOperation) -> serde_json::Value {
    let signature: Vec<String> = op
        .signature
        .iter()
        .map(|arg| {
            let source = match arg.source {
                IrArgumentSource::Parameter(location) => location.as_str(),
                IrArgumentSource::Body => "body",
            };
            let optional = if arg.required { "" } else { " = None" };
            format!(
                "{}: {} [{source}]{optional}",
                arg.variable,
                describe_type(&arg.arg_type)
            )
        })
        .collect();

    let response = match &op.response {
        IrResponse::Typed {
            status,
            response_type,
            content_type,
            ..
        } => serde_json::json!({
            "status": status,
            "type": describe_type(response_type),
            "content_type": content_type,
        }),
        IrResponse::Untyped => serde_json::json!("raw"),
    };

    serde_json::json!({
        "method_name": op.method_name,
        "method": op.method.as_str(),
        "path": op.path,
        "tags": op.tags,
        "deprecated": op.deprecated,
        "signature": signature,
        "response": response,
    })
}

fn build_inspect_summary(ir: &IrSpec) -> serde_json::Value {
    let models: Vec<serde_json::Value> = ir
        .models
        .iter()
        .map(|m| {
            let (kind, members): (&str, Vec<String>) = match &m.kind {
                IrModelKind::Object { fields } => (
                    "object",
                    fields
                        .iter()
                        .map(|f| format!("{}: {}", f.attribute, describe_type(&f.field_type)))
                        .collect(),
                ),
                IrModelKind::Enum { variants } => {
                    ("enum", variants.iter().map(|v| v.name.clone()).collect())
                }
            };
            serde_json::json!({
                "schema": m.schema_name,
                "class": m.node.class_name,
                "file": m.node.file_path(),
                "kind": kind,
                "members": members,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "spec_version": {
            "raw": ir.version.raw,
            "normalized": ir.version.normalized,
            "family": ir.version.family.as_str(),
            "capabilities": supported_capabilities(ir),
        },
        "base_url": ir.base_url,
        "models": models,
        "operations": ir.operations.iter().map(operation_summary).collect::<Vec<_>>(),
        "webhooks": ir.webhooks.iter().map(operation_summary).collect::<Vec<_>>(),
        "modules": ir.modules.iter().map(|m| &m.name.original).collect::<Vec<_>>(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
openapi: 3.1.0
info: { title: Inspect Me, version: "2" }
paths:
  /things/{id}:
    get:
      operationId: getThing
      parameters:
        - { name: id, in: path, required: true, schema: { type: integer } }
        - { name: q, in: query, schema: { type: [string, "null"] } }
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: { type: array, items: { $ref: '#/components/schemas/Thing' } }
components:
  schemas:
    Thing:
      type: object
      properties:
        label: { type: string }
"#;

    #[test]
    fn test_cli_definition() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_overrides_win_over_config() {
        let mut cfg = OcgConfig::default();
        let args = GenerateArgs {
            output: Some(PathBuf::from("out/client")),
            split_by: Some(SplitArg::Tag),
            naming: Some(NamingArg::Route),
            base_url: Some("http://localhost".into()),
            ..GenerateArgs::default()
        };
        apply_overrides(&mut cfg, &args);
        assert_eq!(cfg.output, "out/client");
        assert_eq!(cfg.input, OcgConfig::default().input);
        assert_eq!(cfg.client.split_by, SplitBy::Tag);
        assert_eq!(cfg.naming.strategy, NamingStrategy::UseRouteBased);
        assert_eq!(cfg.client.base_url.as_deref(), Some("http://localhost"));
        assert!(!cfg.client.no_docstrings);
    }

    #[test]
    fn test_describe_type() {
        let ty = IrType::array_of(IrType::Model("Thing".into()).nullable());
        assert_eq!(describe_type(&ty), "array<Thing?>");
    }

    #[test]
    fn test_inspect_summary() {
        let ir = transform::transform(&parse::from_yaml(SPEC).unwrap()).unwrap();
        let summary = build_inspect_summary(&ir);
        assert_eq!(summary["spec_version"]["family"], "openapi31");
        assert_eq!(summary["models"][0]["file"], "models/Thing.py");
        let op = &summary["operations"][0];
        assert_eq!(op["method_name"], "get_thing");
        assert_eq!(
            op["signature"],
            serde_json::json!(["id: integer [path]", "q: string? [query] = None"])
        );
        assert_eq!(op["response"]["type"], "array<Thing>");
    }

    #[test]
    fn test_generate_writes_package() {
        let dir = tempfile::tempdir().unwrap();
        let ir = transform::transform(&parse::from_yaml(SPEC).unwrap()).unwrap();
        let files = PythonClientGenerator
            .generate(&ir, &config::ClientConfig::default())
            .unwrap();
        write_files(dir.path(), &files).unwrap();
        assert!(dir.path().join("inspect_me_apis.py").exists());
        assert!(dir.path().join("models/Thing.py").exists());
        assert!(dir.path().join("base/base_client.py").exists());
    }
}
