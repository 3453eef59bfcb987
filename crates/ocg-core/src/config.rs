use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

/// Top-level project configuration loaded from `.ocg.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcgConfig {
    pub input: String,
    pub output: String,
    pub naming: NamingConfig,
    pub client: ClientConfig,
}

impl Default for OcgConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated".to_string(),
            naming: NamingConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

/// Naming strategy and aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub strategy: NamingStrategy,
    /// Map from raw operation name (operationId or route-derived) to a replacement.
    pub aliases: IndexMap<String, String>,
}

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

/// How operations are split into generated API classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitBy {
    /// One class for the whole API.
    #[default]
    Single,
    /// One class per operation tag.
    Tag,
    /// One class per first path segment.
    Route,
}

/// Client generation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Name of the generated API class (defaults to the spec title).
    pub service_name: Option<String>,
    /// Overrides the server-derived base URL.
    pub base_url: Option<String>,
    pub split_by: SplitBy,
    pub timeout_seconds: u32,
    pub no_docstrings: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            base_url: None,
            split_by: SplitBy::Single,
            timeout_seconds: 30,
            no_docstrings: false,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".ocg.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OcgConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OcgConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# ocg configuration
input: openapi.yaml
output: generated

naming:
  strategy: use_operation_id  # use_operation_id | use_route_based
  aliases: {}
    # listPetsV2: list_pets     # raw operation name -> method name

client:
  # service_name: PetStore      # defaults to the spec title
  # base_url: https://api.example.com
  split_by: single              # single | tag | route
  timeout_seconds: 30
  no_docstrings: false
"#
}
