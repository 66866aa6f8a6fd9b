use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::assign::{DuplicatePolicy, SessionOptions};
use crate::core::draft::DEFAULT_DRAFT_KEY;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Draft slot settings
    pub draft: DraftConfig,

    /// Tree loading settings
    pub tree: TreeConfig,

    /// Assignment settings
    pub assign: AssignConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig
{
    pub enabled: bool,
    pub dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig
{
    pub expand_all_on_load: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignConfig
{
    /// Refuse to assign items whose key is already in the tree
    pub reject_duplicates: bool,
}

impl Default for DraftConfig
{
    fn default() -> Self
    {
        Self {
            enabled: true,
            dir: PathBuf::from(".cattree/drafts"),
            key: DEFAULT_DRAFT_KEY.to_string(),
        }
    }
}

impl Default for TreeConfig
{
    fn default() -> Self
    {
        Self { expand_all_on_load: true }
    }
}

impl Default for AssignConfig
{
    fn default() -> Self
    {
        Self { reject_duplicates: true }
    }
}

impl From<&Config> for SessionOptions
{
    fn from(config: &Config) -> Self
    {
        Self {
            draft_key: config
                .draft
                .key
                .clone(),
            duplicate_policy: if config
                .assign
                .reject_duplicates
            {
                DuplicatePolicy::Reject
            }
            else
            {
                DuplicatePolicy::Allow
            },
            expand_all_on_load: config
                .tree
                .expand_all_on_load,
        }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["cattree.toml", "cattree.yaml", "cattree.json", ".cattree.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with CATTREE_ prefix, e.g. CATTREE_DRAFT__KEY
    builder = builder.add_source(
        config::Environment::with_prefix("CATTREE")
            .prefix_separator("_")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("cattree.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("DRY RUN: Would write {}", config_path.display());
            println!("{toml_string}");
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
