//! API credentials and endpoint resolution.
//!
//! The key is looked up in `TRELLIS_API_KEY` first, then in
//! `~/.trellis/config.yaml`. `TRELLIS_API_URL` (or the file's `api_url`)
//! points the client at a non-default endpoint, which is mainly useful
//! against a mock server.
//!
//! Functions come in two forms:
//! - `fn_at(home: &Path, ...)` — explicit home directory; used by tests
//! - `fn(...)` — derives home from the OS, delegates to the `_at` form

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const API_KEY_ENV: &str = "TRELLIS_API_KEY";
pub const API_URL_ENV: &str = "TRELLIS_API_URL";

/// Resolved connection settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    /// Endpoint override; `None` means the production default.
    pub api_url: Option<String>,
}

/// On-disk shape of `~/.trellis/config.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
}

/// `<home>/.trellis/config.yaml` — pure path computation, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".trellis").join("config.yaml")
}

/// Load settings from the real environment and `<home>/.trellis/config.yaml`.
pub fn load_at(home: &Path) -> Result<Settings> {
    resolve_at(
        home,
        std::env::var(API_KEY_ENV).ok(),
        std::env::var(API_URL_ENV).ok(),
    )
}

/// `load_at` with the home directory taken from the OS.
pub fn load() -> Result<Settings> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    load_at(&home)
}

/// Merge explicit environment values with the config file. Environment wins;
/// a blank environment value counts as unset.
fn resolve_at(home: &Path, env_key: Option<String>, env_url: Option<String>) -> Result<Settings> {
    let path = config_path_at(home);
    let file = read_config_file(&path)?;

    let api_key = match present(env_key).or_else(|| present(file.api_key.clone())) {
        Some(key) => key,
        None => bail!(
            "no API key configured; set {API_KEY_ENV} or add `api_key` to {}",
            path.display()
        ),
    };
    let api_url = present(env_url).or_else(|| present(file.api_url));

    Ok(Settings { api_key, api_url })
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
