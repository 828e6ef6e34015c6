//! Configuration loader
//!
//! Loads the RPC client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. Falls back to a file only if `STOREDESK_API_URL` is unset; invalid
//!    environment values are reported, never replaced by file values
//! 3. Searches several locations for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STOREDESK_API_URL`: Base address of the stored-procedure API (required)
//! - `STOREDESK_API_KEY`: Bearer credential
//! - `STOREDESK_TIMEOUT_SHORT_SECS`, `STOREDESK_TIMEOUT_DEFAULT_SECS`,
//!   `STOREDESK_TIMEOUT_LONG_SECS`, `STOREDESK_TIMEOUT_UPLOAD_SECS`: Tier
//!   timeouts
//! - `STOREDESK_RETRY_ENABLED`: Whether failed reads are retried (true/false)
//! - `STOREDESK_RETRY_MAX`: Retries after the first attempt
//! - `STOREDESK_RETRY_BASE_DELAY_MS`: Base backoff delay
//! - `STOREDESK_APPLICATION_ID`, `STOREDESK_CLIENT_ID`, `STOREDESK_STORE_ID`,
//!   `STOREDESK_ORGANIZATION_ID`, `STOREDESK_USER_ID`, `STOREDESK_PERSON_ID`:
//!   Tenant context
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./storedesk.json` or `./storedesk.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use storedesk_domain::{Result, RetrySettings, RpcConfig, RpcError, TenantContext, TimeoutTiers};
use url::Url;

const BASE_URL_VAR: &str = "STOREDESK_API_URL";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["storedesk.json", "storedesk.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `STOREDESK_API_URL` is set; a config file
/// is only consulted when it is not.
///
/// # Errors
/// Returns `RpcError::Config` if:
/// - `STOREDESK_API_URL` is set but any environment value is invalid
/// - It is unset and no valid config file is found (the message names both
///   causes)
pub fn load() -> Result<RpcConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) if std::env::var_os(BASE_URL_VAR).is_some() => {
            tracing::warn!(error = %e, "Invalid configuration in environment variables");
            Err(e)
        }
        Err(env_err) => {
            tracing::debug!(error = ?env_err, "Base URL not in environment, trying file");
            load_from_file(None).map_err(|file_err| {
                RpcError::config(format!("{}; {}", file_err.message(), env_err.message()))
            })
        }
    }
}

/// Load configuration from environment variables
///
/// Only `STOREDESK_API_URL` is required; every other value falls back to
/// its default.
///
/// # Errors
/// Returns `RpcError::Config` if the base URL is missing or any variable
/// has an invalid value.
pub fn load_from_env() -> Result<RpcConfig> {
    let base_url = env_var(BASE_URL_VAR)?;
    let api_key = std::env::var("STOREDESK_API_KEY").ok().filter(|key| !key.trim().is_empty());

    let defaults = TimeoutTiers::default();
    let timeouts = TimeoutTiers {
        short_secs: env_parse("STOREDESK_TIMEOUT_SHORT_SECS")?.unwrap_or(defaults.short_secs),
        default_secs: env_parse("STOREDESK_TIMEOUT_DEFAULT_SECS")?
            .unwrap_or(defaults.default_secs),
        long_running_secs: env_parse("STOREDESK_TIMEOUT_LONG_SECS")?
            .unwrap_or(defaults.long_running_secs),
        upload_secs: env_parse("STOREDESK_TIMEOUT_UPLOAD_SECS")?.unwrap_or(defaults.upload_secs),
    };

    let defaults = RetrySettings::default();
    let max_retries = if env_bool("STOREDESK_RETRY_ENABLED", true) {
        env_parse("STOREDESK_RETRY_MAX")?.unwrap_or(defaults.max_retries)
    } else {
        0
    };
    let retry = RetrySettings {
        max_retries,
        base_delay_ms: env_parse("STOREDESK_RETRY_BASE_DELAY_MS")?
            .unwrap_or(defaults.base_delay_ms),
    };

    let tenant = TenantContext {
        application_id: env_parse("STOREDESK_APPLICATION_ID")?,
        client_id: env_parse("STOREDESK_CLIENT_ID")?,
        store_id: env_parse("STOREDESK_STORE_ID")?,
        organization_id: env_parse("STOREDESK_ORGANIZATION_ID")?,
        user_id: env_parse("STOREDESK_USER_ID")?,
        person_id: env_parse("STOREDESK_PERSON_ID")?,
    };

    let config = RpcConfig { base_url, api_key, timeouts, retry, tenant };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RpcError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Loaded values are invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<RpcConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RpcError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            RpcError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RpcError::config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<RpcConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RpcError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RpcError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(RpcError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search the working directory, then the executable's directory, for a
/// config file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Check values that serde cannot: URL syntax and non-zero timeouts.
fn validate(config: &RpcConfig) -> Result<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| RpcError::config(format!("Invalid base URL '{}': {e}", config.base_url)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RpcError::config(format!(
            "Unsupported base URL scheme '{}', expected http or https",
            url.scheme()
        )));
    }

    let t = &config.timeouts;
    if [t.short_secs, t.default_secs, t.long_running_secs, t.upload_secs].contains(&0) {
        return Err(RpcError::config("Timeouts must be at least one second"));
    }

    Ok(())
}

/// Get required environment variable
///
/// # Errors
/// Returns `RpcError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| RpcError::config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| RpcError::config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
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

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 15] = [
        "STOREDESK_API_URL",
        "STOREDESK_API_KEY",
        "STOREDESK_TIMEOUT_SHORT_SECS",
        "STOREDESK_TIMEOUT_DEFAULT_SECS",
        "STOREDESK_TIMEOUT_LONG_SECS",
        "STOREDESK_TIMEOUT_UPLOAD_SECS",
        "STOREDESK_RETRY_ENABLED",
        "STOREDESK_RETRY_MAX",
        "STOREDESK_RETRY_BASE_DELAY_MS",
        "STOREDESK_APPLICATION_ID",
        "STOREDESK_CLIENT_ID",
        "STOREDESK_STORE_ID",
        "STOREDESK_ORGANIZATION_ID",
        "STOREDESK_USER_ID",
        "STOREDESK_PERSON_ID",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("TEST_STOREDESK_BOOL_YES", "yes");
        std::env::set_var("TEST_STOREDESK_BOOL_UPPER", "TRUE");
        std::env::set_var("TEST_STOREDESK_BOOL_OFF", "off");

        assert!(env_bool("TEST_STOREDESK_BOOL_YES", false));
        assert!(env_bool("TEST_STOREDESK_BOOL_UPPER", false));
        assert!(!env_bool("TEST_STOREDESK_BOOL_OFF", true));

        std::env::remove_var("TEST_STOREDESK_BOOL_MISSING");
        assert!(env_bool("TEST_STOREDESK_BOOL_MISSING", true));

        std::env::remove_var("TEST_STOREDESK_BOOL_YES");
        std::env::remove_var("TEST_STOREDESK_BOOL_UPPER");
        std::env::remove_var("TEST_STOREDESK_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STOREDESK_API_URL", "https://rpc.example.com/api");
        std::env::set_var("STOREDESK_API_KEY", "test-key");
        std::env::set_var("STOREDESK_TIMEOUT_SHORT_SECS", "5");
        std::env::set_var("STOREDESK_TIMEOUT_LONG_SECS", "240");
        std::env::set_var("STOREDESK_RETRY_MAX", "2");
        std::env::set_var("STOREDESK_RETRY_BASE_DELAY_MS", "250");
        std::env::set_var("STOREDESK_STORE_ID", "12");
        std::env::set_var("STOREDESK_USER_ID", "7");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.base_url, "https://rpc.example.com/api");
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.timeouts.short_secs, 5);
        assert_eq!(config.timeouts.default_secs, 30);
        assert_eq!(config.timeouts.long_running_secs, 240);
        assert_eq!(config.retry, RetrySettings { max_retries: 2, base_delay_ms: 250 });
        assert_eq!(config.tenant.store_id, Some(12));
        assert_eq!(config.tenant.user_id, Some(7));
        assert_eq!(config.tenant.client_id, None);
    }

    #[test]
    fn test_retry_can_be_disabled() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STOREDESK_API_URL", "https://rpc.example.com/api");
        std::env::set_var("STOREDESK_RETRY_ENABLED", "false");
        std::env::set_var("STOREDESK_RETRY_MAX", "5");

        let result = load_from_env();
        clear_env();

        assert_eq!(result.expect("config from env").retry.max_retries, 0);
    }

    #[test]
    fn test_load_from_env_missing_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, RpcError::Config { .. }), "Should be a Config error");
        assert!(err.message().contains("STOREDESK_API_URL"));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STOREDESK_API_URL", "https://rpc.example.com/api");
        std::env::set_var("STOREDESK_STORE_ID", "not-a-number");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, RpcError::Config { .. }), "Should be a Config error");
        assert!(err.message().contains("STOREDESK_STORE_ID"));
    }

    #[test]
    fn test_load_from_env_rejects_bad_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STOREDESK_API_URL", "ftp://rpc.example.com");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(RpcError::Config { .. })));
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_config(
            r#"{
                "base_url": "https://rpc.example.com/api",
                "api_key": "file-key",
                "timeouts": { "short_secs": 3 },
                "tenant": { "store_id": 4, "organization_id": 9 }
            }"#,
            "json",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from JSON file");
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.timeouts.short_secs, 3);
        assert_eq!(config.timeouts.upload_secs, 300);
        assert_eq!(config.tenant.organization_id, Some(9));
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_config(
            r#"
base_url = "http://localhost:3000/api"

[retry]
max_retries = 1
base_delay_ms = 500

[tenant]
client_id = 2
"#,
            "toml",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from TOML file");
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.tenant.client_id, Some(2));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_load_from_file_rejects_zero_timeout() {
        let path = write_config(
            r#"{ "base_url": "https://rpc.example.com", "timeouts": { "default_secs": 0 } }"#,
            "json",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(RpcError::Config { .. })));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/storedesk.json")));
        assert!(matches!(result, Err(RpcError::Config { .. })));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", &PathBuf::from("storedesk.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    /// Runs `body` with the process cwd set to a fresh directory holding
    /// `storedesk.json` (when `file` is given), restoring the cwd after.
    fn in_config_dir<R>(file: Option<&str>, body: impl FnOnce() -> R) -> R {
        struct RestoreCwd(PathBuf);
        impl Drop for RestoreCwd {
            fn drop(&mut self) {
                let _ = std::env::set_current_dir(&self.0);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        if let Some(contents) = file {
            std::fs::write(dir.path().join("storedesk.json"), contents).unwrap();
        }
        let _restore = RestoreCwd(std::env::current_dir().unwrap());
        std::env::set_current_dir(dir.path()).unwrap();
        body()
    }

    #[test]
    fn test_load_reports_invalid_env_instead_of_file() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("STOREDESK_API_URL", "https://env.example.com");
        std::env::set_var("STOREDESK_STORE_ID", "abc");

        let result =
            in_config_dir(Some(r#"{ "base_url": "https://file.example.com" }"#), load);
        clear_env();

        match result {
            Err(RpcError::Config { message }) => {
                assert!(message.contains("STOREDESK_STORE_ID"), "{message}");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_uses_file_when_base_url_unset() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("STOREDESK_STORE_ID", "abc");

        let result =
            in_config_dir(Some(r#"{ "base_url": "https://file.example.com" }"#), load);
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.base_url, "https://file.example.com");
    }

    #[test]
    fn test_load_without_env_or_file_names_both_causes() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = in_config_dir(None, load);

        match result {
            Err(RpcError::Config { message }) => {
                assert!(message.contains("No config file found"), "{message}");
                assert!(message.contains("STOREDESK_API_URL"), "{message}");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_requires_base_url() {
        let result = parse_config("{}", &PathBuf::from("storedesk.json"));
        assert!(matches!(result, Err(RpcError::Config { .. })));
    }
}
