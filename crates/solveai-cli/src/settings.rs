//! Runtime configuration: an optional TOML file layered under `SOLVEAI_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use solveai_gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub api_key:              String,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  #[serde(default = "default_base_url")]
  pub base_url:             String,
  #[serde(default = "default_text_model")]
  pub text_model:           String,
  #[serde(default = "default_image_model")]
  pub image_model:          String,
  #[serde(default = "default_timeout")]
  pub request_timeout_secs: u64,
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/solveai/reports.db") }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_text_model() -> String { DEFAULT_TEXT_MODEL.to_owned() }
fn default_image_model() -> String { DEFAULT_IMAGE_MODEL.to_owned() }
fn default_timeout() -> u64 { 120 }
fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8787 }

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("SOLVEAI"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;

    if settings.api_key.is_empty()
      && let Ok(key) = std::env::var("GEMINI_API_KEY")
    {
      settings.api_key = key;
    }
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }

  pub fn gemini(&self) -> anyhow::Result<GeminiConfig> {
    anyhow::ensure!(
      !self.api_key.is_empty(),
      "no API key configured (set SOLVEAI_API_KEY or api_key in the config file)"
    );
    Ok(GeminiConfig {
      api_key:      self.api_key.clone(),
      base_url:     self.base_url.clone(),
      text_model:   self.text_model.clone(),
      image_model:  self.image_model.clone(),
      timeout_secs: self.request_timeout_secs,
    })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "api_key = \"from-file\"\nport = 9000\nstore_path = \"/tmp/r.db\"").unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.api_key, "from-file");
    assert_eq!(settings.port, 9000);
    assert_eq!(settings.store_path, PathBuf::from("/tmp/r.db"));
    assert_eq!(settings.text_model, DEFAULT_TEXT_MODEL);
    assert_eq!(settings.gemini().unwrap().base_url, DEFAULT_BASE_URL);
  }

  #[test]
  fn missing_key_is_reported_when_the_solver_is_needed() {
    let mut settings = Settings::load(Path::new("/nonexistent/solveai.toml")).unwrap();
    settings.api_key.clear();
    assert!(settings.gemini().is_err());
  }

  #[test]
  fn tilde_paths_are_left_alone_without_a_prefix() {
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
    assert_eq!(expand_tilde(Path::new("rel/x.db")), PathBuf::from("rel/x.db"));
  }
}
