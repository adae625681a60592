//! Configuration loader
//!
//! Loads the relying party configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required ones are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `IDP_ENDPOINT`: Issuer URL of the identity provider
//! - `IDP_CLIENT_ID`: Registered client id
//! - `IDP_CLIENT_SECRET`: Client secret
//! - `IDP_REDIRECT_URI`: Registered redirect URI (the login callback)
//!
//! Optional:
//! - `RP_SCOPES`: Space or comma separated scopes (`openid` is always added)
//! - `RP_TOKEN_AUTH_METHOD`: `client_secret_basic` or `client_secret_post`
//! - `RP_HTTP_TIMEOUT_SECS`: Timeout for provider requests
//! - `RP_ACCEPT_INVALID_CERTS`: Skip TLS verification towards the provider
//! - `RP_BIND_ADDR`: Listen address of the HTTP boundary
//! - `RP_SESSION_IDLE_SECS`: Idle time after which sessions are purged
//! - `RP_SECURE_COOKIES`: Mark the session cookie `Secure`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./oidc-rp.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};

use oidc_rp_domain::{RelyingPartyConfig, RelyingPartyError, Result, TokenEndpointAuth};
use secrecy::SecretString;
use url::Url;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `RelyingPartyError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<RelyingPartyConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `RelyingPartyError::Config` if required variables are missing
/// or any value is invalid.
pub fn load_from_env() -> Result<RelyingPartyConfig> {
    let issuer_url = env_url("IDP_ENDPOINT")?;
    let client_id = env_var("IDP_CLIENT_ID")?;
    let client_secret = SecretString::new(env_var("IDP_CLIENT_SECRET")?);
    let redirect_uri = env_url("IDP_REDIRECT_URI")?;

    let mut config = RelyingPartyConfig::new(issuer_url, client_id, client_secret, redirect_uri);

    if let Ok(scopes) = std::env::var("RP_SCOPES") {
        config.scopes = scopes
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Ok(method) = std::env::var("RP_TOKEN_AUTH_METHOD") {
        config.token_endpoint_auth = method.parse::<TokenEndpointAuth>()?;
    }
    if let Some(timeout) = env_u64("RP_HTTP_TIMEOUT_SECS")? {
        config.http_timeout_seconds = timeout;
    }
    if let Ok(addr) = std::env::var("RP_BIND_ADDR") {
        config.bind_address = addr;
    }
    if let Some(idle) = env_u64("RP_SESSION_IDLE_SECS")? {
        config.session_idle_timeout_seconds = idle;
    }
    config.accept_invalid_certs = env_bool("RP_ACCEPT_INVALID_CERTS", false);
    config.secure_cookies = env_bool("RP_SECURE_COOKIES", false);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RelyingPartyError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or required fields are missing
/// - The loaded configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<RelyingPartyConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RelyingPartyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RelyingPartyError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RelyingPartyError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<RelyingPartyConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RelyingPartyError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RelyingPartyError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RelyingPartyError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("oidc-rp.json"),
        dir.join("oidc-rp.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `RelyingPartyError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RelyingPartyError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_url(key: &str) -> Result<Url> {
    let raw = env_var(key)?;
    Url::parse(&raw).map_err(|e| RelyingPartyError::Config(format!("Invalid URL in {key}: {e}")))
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|e| RelyingPartyError::Config(format!("Invalid number in {key}: {e}"))),
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

    use secrecy::ExposeSecret;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        "IDP_ENDPOINT",
        "IDP_CLIENT_ID",
        "IDP_CLIENT_SECRET",
        "IDP_REDIRECT_URI",
        "RP_SCOPES",
        "RP_TOKEN_AUTH_METHOD",
        "RP_HTTP_TIMEOUT_SECS",
        "RP_ACCEPT_INVALID_CERTS",
        "RP_BIND_ADDR",
        "RP_SESSION_IDLE_SECS",
        "RP_SECURE_COOKIES",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn set_required_env() {
        std::env::set_var("IDP_ENDPOINT", "https://idp.example.com/realms/demo");
        std::env::set_var("IDP_CLIENT_ID", "demo-client");
        std::env::set_var("IDP_CLIENT_SECRET", "demo-secret");
        std::env::set_var("IDP_REDIRECT_URI", "http://localhost:4567/login_callback");
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("TEST_RP_BOOL", value);
            assert!(env_bool("TEST_RP_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("TEST_RP_BOOL", value);
            assert!(!env_bool("TEST_RP_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("TEST_RP_BOOL");
        assert!(env_bool("TEST_RP_BOOL", true));
        assert!(!env_bool("TEST_RP_BOOL", false));
    }

    #[test]
    fn test_load_from_env_required_only() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required_env();

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.issuer_url.as_str(), "https://idp.example.com/realms/demo");
        assert_eq!(config.client_id, "demo-client");
        assert_eq!(config.client_secret.expose_secret(), "demo-secret");
        assert_eq!(config.token_endpoint_auth, TokenEndpointAuth::ClientSecretBasic);
        assert_eq!(config.bind_address, "127.0.0.1:4567");
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required_env();
        std::env::set_var("RP_SCOPES", "email, groups");
        std::env::set_var("RP_TOKEN_AUTH_METHOD", "client_secret_post");
        std::env::set_var("RP_HTTP_TIMEOUT_SECS", "3");
        std::env::set_var("RP_ACCEPT_INVALID_CERTS", "yes");
        std::env::set_var("RP_BIND_ADDR", "0.0.0.0:8080");
        std::env::set_var("RP_SESSION_IDLE_SECS", "120");
        std::env::set_var("RP_SECURE_COOKIES", "true");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.scopes, vec!["email".to_string(), "groups".to_string()]);
        assert_eq!(config.scope_string(), "openid email groups");
        assert_eq!(config.token_endpoint_auth, TokenEndpointAuth::ClientSecretPost);
        assert_eq!(config.http_timeout_seconds, 3);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.session_idle_timeout_seconds, 120);
        assert!(config.secure_cookies);
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("IDP_ENDPOINT", "https://idp.example.com");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(
            matches!(&err, RelyingPartyError::Config(msg) if msg.contains("IDP_CLIENT_ID")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (key, value) in [
            ("IDP_ENDPOINT", "not a url"),
            ("RP_HTTP_TIMEOUT_SECS", "soon"),
            ("RP_HTTP_TIMEOUT_SECS", "0"),
            ("RP_TOKEN_AUTH_METHOD", "private_key_jwt"),
        ] {
            clear_env();
            set_required_env();
            std::env::set_var(key, value);

            let result = load_from_env();
            assert!(
                matches!(result, Err(RelyingPartyError::Config(_))),
                "{key}={value} should be rejected"
            );
        }
        clear_env();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "issuer_url": "https://idp.example.com",
                "client_id": "file-client",
                "client_secret": "file-secret",
                "redirect_uri": "https://rp.example.com/login_callback",
                "token_endpoint_auth": "client_secret_post",
                "secure_cookies": true
            }"#,
            "json",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from JSON file");
        assert_eq!(config.client_id, "file-client");
        assert_eq!(config.token_endpoint_auth, TokenEndpointAuth::ClientSecretPost);
        assert!(config.secure_cookies);
        assert_eq!(config.http_timeout_seconds, 10);
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
issuer_url = "https://idp.example.com"
client_id = "file-client"
client_secret = "file-secret"
redirect_uri = "http://localhost:4567/login_callback"
scopes = ["email"]
session_idle_timeout_seconds = 900
"#,
            "toml",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from TOML file");
        assert_eq!(config.scopes, vec!["email".to_string()]);
        assert_eq!(config.session_idle_timeout_seconds, 900);
    }

    #[test]
    fn test_load_from_file_runs_validation() {
        let path = temp_config(
            r#"{
                "issuer_url": "https://idp.example.com",
                "client_id": "",
                "client_secret": "file-secret",
                "redirect_uri": "http://localhost:4567/login_callback"
            }"#,
            "json",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(RelyingPartyError::Config(msg)) if msg.contains("client_id")));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(RelyingPartyError::Config(_))));
    }

    #[test]
    fn test_parse_config_rejects_missing_secret() {
        let json = r#"{
            "issuer_url": "https://idp.example.com",
            "client_id": "c",
            "redirect_uri": "http://localhost:4567/login_callback"
        }"#;

        let result = parse_config(json, &PathBuf::from("config.json"));
        assert!(
            matches!(result, Err(RelyingPartyError::Config(msg)) if msg.contains("client_secret"))
        );
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("issuer_url: x", &PathBuf::from("config.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
