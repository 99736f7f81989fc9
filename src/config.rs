use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "DV_BATCH_CONFIG";
const CONFIG_FILE: &str = ".dv-batch.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub dataverse: DataverseConfig,
  #[serde(default)]
  pub manage_deposit: Option<ManageDepositConfig>,
  #[serde(default)]
  pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataverseConfig {
  /// Base URL of the Dataverse server, e.g. https://demo.archaeology.datastations.nl
  pub server_url: String,
  pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManageDepositConfig {
  /// Base URL of the manage-deposit service, e.g. http://localhost:20347
  pub service_baseurl: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
  pub smtp_host: String,
  #[serde(default = "default_smtp_port")]
  pub smtp_port: u16,
  pub from_address: String,
}

fn default_smtp_port() -> u16 {
  25
}

/// Loads the YAML config: explicit `--config` path first, then the
/// DV_BATCH_CONFIG environment variable, then `~/.dv-batch.yml`.
pub fn load(path_override: Option<&Path>) -> Result<Config> {
  let path = resolve_path(path_override)?;
  let text = std::fs::read_to_string(&path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  let config: Config =
    serde_yaml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;
  Ok(config)
}

fn resolve_path(path_override: Option<&Path>) -> Result<PathBuf> {
  if let Some(path) = path_override {
    return Ok(path.to_path_buf());
  }
  if let Ok(path) = env::var(CONFIG_ENV) {
    if !path.is_empty() {
      return Ok(PathBuf::from(path));
    }
  }
  let base = directories::BaseDirs::new().context("cannot determine the home directory")?;
  Ok(base.home_dir().join(CONFIG_FILE))
}
