//! Configuration loader
//!
//! Loads client options from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CIRRUS_API_KEY` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CIRRUS_API_KEY`: Application key (required)
//! - `CIRRUS_API_ROOT_URL`: API host without scheme
//! - `CIRRUS_API_VERSION`: API version path segment
//! - `CIRRUS_USE_SSL`: Whether to use https (true/false)
//! - `CIRRUS_REQUEST_TIMEOUT_SECS`: Request timeout in seconds
//! - `CIRRUS_MAX_ATTEMPTS`: Total HTTP attempts per request
//! - `CIRRUS_SESSION_SLOT`: Persisted session slot name
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cirrus.json` or `./cirrus.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use cirrus_domain::{CirrusError, ClientOptions, Result};

const CANDIDATE_NAMES: [&str; 4] = ["cirrus.json", "cirrus.toml", "config.json", "config.toml"];

/// Load options with automatic fallback strategy
///
/// First attempts to load from environment variables. If the API key is
/// missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CirrusError::Config` if:
/// - Options cannot be loaded from either source
/// - File format is invalid
/// - Values fail validation
pub fn load() -> Result<ClientOptions> {
    match load_from_env() {
        Ok(options) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(options)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load options from environment variables
///
/// Only `CIRRUS_API_KEY` is required; everything else falls back to the
/// [`ClientOptions`] defaults.
///
/// # Errors
/// Returns `CirrusError::Config` if the key is missing or a value is
/// invalid.
pub fn load_from_env() -> Result<ClientOptions> {
    let mut options = ClientOptions::new(env_var("CIRRUS_API_KEY")?);

    if let Some(root) = env_opt("CIRRUS_API_ROOT_URL") {
        options.api_root_url = root;
    }
    if let Some(version) = env_opt("CIRRUS_API_VERSION") {
        options.api_version = version;
    }
    options.use_ssl = env_bool("CIRRUS_USE_SSL", options.use_ssl);
    if let Some(timeout) = env_opt("CIRRUS_REQUEST_TIMEOUT_SECS") {
        options.request_timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| CirrusError::Config(format!("Invalid request timeout: {e}")))?;
    }
    if let Some(attempts) = env_opt("CIRRUS_MAX_ATTEMPTS") {
        options.max_attempts = attempts
            .parse::<usize>()
            .map_err(|e| CirrusError::Config(format!("Invalid max attempts: {e}")))?;
    }
    options.session_slot = env_opt("CIRRUS_SESSION_SLOT");

    options.validate()?;
    Ok(options)
}

/// Load options from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CirrusError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientOptions> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CirrusError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CirrusError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CirrusError::Config(format!("Failed to read config file: {e}")))?;

    let options = parse_config(&contents, &config_path)?;
    options.validate()?;
    Ok(options)
}

/// Parse options from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `CirrusError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientOptions> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CirrusError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CirrusError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CirrusError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, its two parents, and the executable's
/// directory for `cirrus.{json,toml}` and `config.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CANDIDATE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `CirrusError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| CirrusError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional environment variable; empty values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
